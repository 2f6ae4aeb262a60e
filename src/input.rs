use crate::renderer::MOBILE_INPUT_ID;
use crate::state::HistoryDirection;
use crate::terminal::Terminal;
use crate::utils;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlInputElement, InputEvent, KeyboardEvent, MouseEvent};

const FOCUS_TARGET_IDS: [&str; 2] = ["terminal", "active-input-line"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    fn any(self) -> bool {
        self.ctrl || self.meta || self.alt
    }
}

/// What a keydown means for the prompt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Backspace,
    Submit,
    Complete,
    History(HistoryDirection),
    Insert(char),
    Ignore,
}

impl KeyAction {
    fn prevents_default(self) -> bool {
        !matches!(self, KeyAction::Ignore)
    }
}

pub fn classify_key(key: &str, modifiers: Modifiers) -> KeyAction {
    match key {
        "Backspace" => KeyAction::Backspace,
        "Enter" => KeyAction::Submit,
        "Tab" => KeyAction::Complete,
        "ArrowUp" => KeyAction::History(HistoryDirection::Older),
        "ArrowDown" => KeyAction::History(HistoryDirection::Newer),
        _ if modifiers.any() || !is_printable_character_key(key) => KeyAction::Ignore,
        _ => key.chars().next().map_or(KeyAction::Ignore, KeyAction::Insert),
    }
}

pub fn install_listeners(terminal: Rc<Terminal>) -> Result<(), JsValue> {
    let document = utils::document()?;

    let keydown_terminal = Rc::clone(&terminal);
    let keydown_closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        handle_keydown(&keydown_terminal, event);
    }) as Box<dyn FnMut(_)>);
    document
        .add_event_listener_with_callback("keydown", keydown_closure.as_ref().unchecked_ref())?;
    keydown_closure.forget();

    install_mobile_input(&document, &terminal)?;

    for id in FOCUS_TARGET_IDS {
        let Some(target) = document.get_element_by_id(id) else {
            continue;
        };
        let focus_terminal = Rc::clone(&terminal);
        let click_closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
            focus_terminal.focus();
        }) as Box<dyn FnMut(_)>);
        target.add_event_listener_with_callback("click", click_closure.as_ref().unchecked_ref())?;
        click_closure.forget();
    }

    Ok(())
}

/// Soft keyboards report most keys as "Unidentified"; the hidden field's own
/// value is the source of truth there.
fn install_mobile_input(document: &Document, terminal: &Rc<Terminal>) -> Result<(), JsValue> {
    let Some(element) = document.get_element_by_id(MOBILE_INPUT_ID) else {
        return Ok(());
    };
    let mobile_input = element.dyn_into::<HtmlInputElement>()?;

    let input_terminal = Rc::clone(terminal);
    let field = mobile_input.clone();
    let input_closure = Closure::wrap(Box::new(move |_event: InputEvent| {
        input_terminal.overwrite_input(&field.value());
    }) as Box<dyn FnMut(_)>);
    mobile_input
        .add_event_listener_with_callback("input", input_closure.as_ref().unchecked_ref())?;
    input_closure.forget();
    Ok(())
}

fn handle_keydown(terminal: &Terminal, event: KeyboardEvent) {
    if event.is_composing() {
        return;
    }
    let modifiers = Modifiers {
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
        alt: event.alt_key(),
    };
    let action = classify_key(&event.key(), modifiers);
    if action.prevents_default() {
        event.prevent_default();
    }

    match action {
        KeyAction::Backspace => terminal.delete_last_character(),
        KeyAction::Submit => {
            if let Err(err) = terminal.submit_command() {
                utils::log(&utils::format_js_error("Error running command", err));
            }
        }
        KeyAction::Complete => terminal.autocomplete(),
        KeyAction::History(direction) => terminal.navigate_history(direction),
        KeyAction::Insert(ch) => terminal.append_character(ch),
        KeyAction::Ignore => {}
    }
}

fn is_printable_character_key(key: &str) -> bool {
    if matches!(key, "Dead" | "Process") {
        return false;
    }

    let mut chars = key.chars();
    matches!((chars.next(), chars.next()), (Some(_), None))
}
