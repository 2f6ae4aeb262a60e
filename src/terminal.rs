use crate::commands::{self, BlockKind, Command, CommandAction, CommandError, REDIRECT_DELAY_MS};
use crate::pages::{PageCache, PageEntry, PageFetcher};
use crate::renderer::TerminalView;
use crate::scheduler::Scheduler;
use crate::skibidi::{RandomSource, SkibidiEngine};
use crate::state::{HistoryDirection, InputState};
use crate::utils;
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsValue;

pub type SharedState = Rc<RefCell<InputState>>;

/// One browsing session: the prompt line, the transcript and everything
/// started from it.
pub struct Terminal {
    state: SharedState,
    view: Rc<dyn TerminalView>,
    pages: Rc<PageCache>,
    fetcher: Rc<dyn PageFetcher>,
    scheduler: Rc<dyn Scheduler>,
    skibidi: SkibidiEngine,
    /// Bumped by every clear; fetches started under an older value are dropped.
    epoch: Rc<Cell<u64>>,
}

impl Terminal {
    pub fn new(
        view: Rc<dyn TerminalView>,
        fetcher: Rc<dyn PageFetcher>,
        scheduler: Rc<dyn Scheduler>,
        random: RandomSource,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(InputState::new())),
            view,
            pages: Rc::new(PageCache::new()),
            fetcher,
            skibidi: SkibidiEngine::new(Rc::clone(&scheduler), random),
            scheduler,
            epoch: Rc::new(Cell::new(0)),
        }
    }

    pub fn initialize(&self) {
        self.refresh_input();
        self.focus();
    }

    pub fn focus(&self) {
        self.view.focus_input();
    }

    pub fn append_character(&self, ch: char) {
        self.state.borrow_mut().append_char(ch);
        self.refresh_input();
    }

    pub fn overwrite_input(&self, value: &str) {
        self.state.borrow_mut().overwrite(value);
        self.refresh_input();
    }

    pub fn delete_last_character(&self) {
        self.state.borrow_mut().backspace();
        self.refresh_input();
    }

    pub fn navigate_history(&self, direction: HistoryDirection) {
        self.state.borrow_mut().navigate(direction);
        self.refresh_input();
    }

    pub fn autocomplete(&self) {
        let changed = self.state.borrow_mut().complete();
        if changed {
            self.refresh_input();
        }
    }

    pub fn submit_command(&self) -> Result<(), JsValue> {
        let line = self.state.borrow_mut().submit();
        self.refresh_input();
        self.run_command(&line)
    }

    /// Echoes `line` as a prompt block and dispatches it. Only content
    /// commands leave work pending on return.
    pub fn run_command(&self, line: &str) -> Result<(), JsValue> {
        if line.is_empty() {
            return Ok(());
        }
        self.view.append_prompt(line)?;
        self.view.scroll_to_bottom();
        if line.trim().is_empty() {
            return Ok(());
        }

        match commands::execute(line) {
            Ok(CommandAction::Clear) => self.clear_screen()?,
            Ok(CommandAction::OutputHtml { html, kind }) => self.view.append_block(&html, kind)?,
            Ok(CommandAction::FetchSection { command, path }) => self.load_section(command, path),
            Ok(CommandAction::Redirect { notice, url }) => {
                self.view.append_block(&notice, BlockKind::Redirect)?;
                let view = Rc::clone(&self.view);
                self.scheduler
                    .after(REDIRECT_DELAY_MS, Box::new(move || view.open_external(url)));
            }
            Ok(CommandAction::StartSkibidi) => self.start_skibidi()?,
            Err(err) => self.view.append_block(&err.to_html(), BlockKind::Error)?,
        }
        Ok(())
    }

    pub fn clear_screen(&self) -> Result<(), JsValue> {
        self.stop_skibidi()?;
        self.epoch.set(self.epoch.get().wrapping_add(1));
        self.view.clear_output()
    }

    pub fn start_skibidi(&self) -> Result<(), JsValue> {
        if self.skibidi.is_active() {
            return Ok(());
        }
        self.view.set_skibidi_active(true)?;
        let canvas = match self.view.mount_skibidi() {
            Ok(canvas) => canvas,
            Err(err) => {
                self.view.set_skibidi_active(false)?;
                return Err(err);
            }
        };
        self.skibidi.start(canvas);
        Ok(())
    }

    pub fn stop_skibidi(&self) -> Result<(), JsValue> {
        if self.skibidi.stop() {
            self.view.set_skibidi_active(false)?;
        }
        Ok(())
    }

    fn load_section(&self, command: Command, path: String) {
        let started_at = self.epoch.get();
        let epoch = Rc::clone(&self.epoch);
        let pages = Rc::clone(&self.pages);
        let fetcher = Rc::clone(&self.fetcher);
        let view = Rc::clone(&self.view);

        self.scheduler.spawn(
            async move {
                let entry = pages.fetch_page(fetcher.as_ref(), &path).await;
                if epoch.get() != started_at {
                    utils::log(&format!("Dropping {path}: the screen was cleared"));
                    return;
                }
                let (html, kind) = match section_outcome(command, &path, &entry) {
                    Ok(html) => (html, BlockKind::Section),
                    Err(err) => (err.to_html(), BlockKind::Error),
                };
                if let Err(err) = view.append_block(&html, kind) {
                    utils::log(&utils::format_js_error(
                        &format!("Failed to render {path}"),
                        err,
                    ));
                }
            }
            .boxed_local(),
        );
    }

    fn refresh_input(&self) {
        let state = self.state.borrow();
        self.view.update_input(state.input());
    }
}

fn section_outcome(
    command: Command,
    path: &str,
    entry: &PageEntry,
) -> Result<String, CommandError> {
    match entry {
        PageEntry::Loaded(page) => {
            page.blocks
                .get(command.name())
                .cloned()
                .ok_or_else(|| CommandError::MissingSection {
                    command: command.name().to_string(),
                })
        }
        PageEntry::Failed { message } => Err(CommandError::Fetch {
            path: path.to_string(),
            message: message.clone(),
        }),
    }
}
