use crate::utils;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement};

const ASCII_ART_ID: &str = "ascii-art";

/// Inline sizing for the banner; `None` leaves the stylesheet in charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsciiStyle {
    pub size: Option<&'static str>,
    pub white_space: &'static str,
}

pub fn style_for_width(width: f64) -> AsciiStyle {
    let (size, white_space) = if width < 360.0 {
        (Some("6px"), "pre-wrap")
    } else if width < 500.0 {
        (Some("8px"), "pre-wrap")
    } else if width < 700.0 {
        (Some("10px"), "pre")
    } else {
        (None, "pre")
    };
    AsciiStyle { size, white_space }
}

/// Sizes the banner now and again on every resize.
pub fn install() -> Result<(), JsValue> {
    let window = utils::window().ok_or_else(|| JsValue::from_str("Window unavailable"))?;
    apply();

    let resize = Closure::wrap(Box::new(move |_event: Event| {
        apply();
    }) as Box<dyn FnMut(_)>);
    window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
    resize.forget();
    Ok(())
}

fn apply() {
    let Some(window) = utils::window() else {
        return;
    };
    let Some(banner) = window
        .document()
        .and_then(|document| document.get_element_by_id(ASCII_ART_ID))
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(f64::MAX);

    if let Err(err) = apply_style(&banner, style_for_width(width)) {
        utils::log(&utils::format_js_error("Failed to size ASCII banner", err));
    }
}

fn apply_style(banner: &HtmlElement, style: AsciiStyle) -> Result<(), JsValue> {
    let css = banner.style();
    match style.size {
        Some(size) => {
            css.set_property("font-size", size)?;
            css.set_property("line-height", size)?;
        }
        None => {
            css.remove_property("font-size")?;
            css.remove_property("line-height")?;
        }
    }
    css.set_property("white-space", style.white_space)
}
