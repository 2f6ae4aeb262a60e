mod ascii;
mod commands;
mod fragments;
mod gallery;
mod input;
mod pages;
mod renderer;
mod scheduler;
mod skibidi;
mod state;
mod terminal;
#[cfg(test)]
mod testing;
mod utils;

use crate::pages::HttpPageFetcher;
use crate::renderer::Renderer;
use crate::scheduler::BrowserScheduler;
use crate::terminal::Terminal;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    if let Err(err) = ascii::install() {
        utils::log(&utils::format_js_error("ASCII banner sizing disabled", err));
    }

    let document = utils::document()?;
    if document.get_element_by_id(renderer::OUTPUT_ID).is_some() {
        mount_terminal()?;
    }
    if document.get_element_by_id(gallery::GRID_ID).is_some() {
        gallery::mount();
    }

    Ok(())
}

fn mount_terminal() -> Result<(), JsValue> {
    let renderer = Rc::new(Renderer::new()?);
    let terminal = Rc::new(Terminal::new(
        renderer,
        Rc::new(HttpPageFetcher),
        Rc::new(BrowserScheduler),
        Box::new(js_sys::Math::random),
    ));

    terminal.initialize();
    input::install_listeners(terminal)
}
