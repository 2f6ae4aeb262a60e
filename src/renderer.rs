use crate::commands::{self, BlockKind};
use crate::skibidi::{ConfettiParticle, SkibidiCanvas, SkibidiLine};
use crate::utils;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlDivElement, HtmlElement, HtmlInputElement, HtmlSpanElement, Node,
    ScrollBehavior, ScrollToOptions,
};

pub const OUTPUT_ID: &str = "terminal-output";
pub const HEADER_ID: &str = "terminal-header";
pub const TYPED_ID: &str = "typed";
pub const MOBILE_INPUT_ID: &str = "mobile-input";

pub const LINE_REVEAL_STEP_MS: u32 = 40;
const SKIBIDI_ACTIVE_CLASS: &str = "skibidi-active";
const SKIBIDI_HINT: &str = "type 'clear' to stop (good luck)";

pub fn reveal_delay_ms(index: usize) -> u32 {
    (index as u32).saturating_mul(LINE_REVEAL_STEP_MS)
}

/// Everything the interpreter needs from the page.
pub trait TerminalView {
    fn update_input(&self, buffer: &str);
    fn focus_input(&self);
    fn append_prompt(&self, command: &str) -> Result<(), JsValue>;
    fn append_block(&self, html: &str, kind: BlockKind) -> Result<(), JsValue>;
    /// Removes every transcript entry except the header.
    fn clear_output(&self) -> Result<(), JsValue>;
    fn scroll_to_bottom(&self);
    fn open_external(&self, url: &str);
    fn set_skibidi_active(&self, active: bool) -> Result<(), JsValue>;
    fn mount_skibidi(&self) -> Result<Rc<dyn SkibidiCanvas>, JsValue>;
}

pub struct Renderer {
    document: Document,
    output: HtmlElement,
    typed: HtmlElement,
    mobile_input: Option<HtmlInputElement>,
}

impl Renderer {
    pub fn new() -> Result<Self, JsValue> {
        let document = utils::document()?;
        let output = get_html_element(&document, OUTPUT_ID)?;
        let typed = get_html_element(&document, TYPED_ID)?;
        let mobile_input = match document.get_element_by_id(MOBILE_INPUT_ID) {
            Some(element) => Some(element.dyn_into::<HtmlInputElement>()?),
            None => None,
        };

        Ok(Self {
            document,
            output,
            typed,
            mobile_input,
        })
    }

    fn apply_reveal_delays(&self, container: &Element) -> Result<(), JsValue> {
        let lines = container.query_selector_all(".line")?;
        for index in 0..lines.length() {
            let Some(node) = lines.item(index) else {
                continue;
            };
            if let Ok(line) = node.dyn_into::<HtmlElement>() {
                line.style().set_property(
                    "animation-delay",
                    &format!("{}ms", reveal_delay_ms(index as usize)),
                )?;
            }
        }

        let images = container.query_selector_all("img")?;
        for index in 0..images.length() {
            let Some(node) = images.item(index) else {
                continue;
            };
            if let Ok(image) = node.dyn_into::<Element>() {
                image.class_list().add_1("fade-in-media")?;
            }
        }
        Ok(())
    }
}

impl TerminalView for Renderer {
    fn update_input(&self, buffer: &str) {
        self.typed.set_text_content(Some(buffer));
        if let Some(input) = &self.mobile_input {
            if input.value() != buffer {
                input.set_value(buffer);
            }
            let end = buffer.encode_utf16().count() as u32;
            let _ = input.set_selection_range(end, end);
        }
    }

    fn focus_input(&self) {
        if let Some(input) = &self.mobile_input {
            let _ = input.focus();
            let end = input.value().encode_utf16().count() as u32;
            let _ = input.set_selection_range(end, end);
        }
    }

    fn append_prompt(&self, command: &str) -> Result<(), JsValue> {
        let prompt = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlDivElement>()?;
        prompt.set_class_name("cmd");
        prompt.set_inner_html(&commands::render_prompt(command));
        self.output.append_child(&prompt)?;
        Ok(())
    }

    fn append_block(&self, html: &str, kind: BlockKind) -> Result<(), JsValue> {
        let container = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlDivElement>()?;
        container.set_class_name(kind.class_name());
        container.set_inner_html(html);
        self.apply_reveal_delays(&container)?;
        self.output.append_child(&container)?;
        self.scroll_to_bottom();
        Ok(())
    }

    fn clear_output(&self) -> Result<(), JsValue> {
        let children = self.output.child_nodes();
        let mut doomed = Vec::new();
        for index in 0..children.length() {
            let Some(node) = children.item(index) else {
                continue;
            };
            let id = node
                .dyn_ref::<Element>()
                .map(|element| element.id())
                .unwrap_or_default();
            if removed_by_clear(node.node_type(), &id) {
                doomed.push(node);
            }
        }
        for node in doomed {
            self.output.remove_child(&node)?;
        }
        Ok(())
    }

    fn scroll_to_bottom(&self) {
        let Some(window) = utils::window() else {
            return;
        };
        let height = self
            .document
            .body()
            .map(|body| body.scroll_height())
            .unwrap_or(0);
        let options = ScrollToOptions::new();
        options.set_top(f64::from(height));
        options.set_behavior(ScrollBehavior::Smooth);
        window.scroll_to_with_scroll_to_options(&options);
    }

    fn open_external(&self, url: &str) {
        utils::open_link(url);
    }

    fn set_skibidi_active(&self, active: bool) -> Result<(), JsValue> {
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("Missing <body> element"))?;
        if active {
            body.class_list().add_1(SKIBIDI_ACTIVE_CLASS)
        } else {
            body.class_list().remove_1(SKIBIDI_ACTIVE_CLASS)
        }
    }

    fn mount_skibidi(&self) -> Result<Rc<dyn SkibidiCanvas>, JsValue> {
        let container = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlDivElement>()?;
        container.set_class_name(BlockKind::Skibidi.class_name());

        let stream = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlDivElement>()?;
        stream.set_class_name("skibidi-stream");

        let hint = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlDivElement>()?;
        hint.set_class_name("sk-hint");
        hint.set_text_content(Some(SKIBIDI_HINT));

        container.append_child(&stream)?;
        container.append_child(&hint)?;
        self.output.append_child(&container)?;
        self.scroll_to_bottom();

        Ok(Rc::new(DomSkibidiCanvas {
            document: self.document.clone(),
            container: container.unchecked_into(),
            stream: stream.unchecked_into(),
        }))
    }
}

struct DomSkibidiCanvas {
    document: Document,
    container: HtmlElement,
    stream: HtmlElement,
}

impl SkibidiCanvas for DomSkibidiCanvas {
    fn push_line(&self, line: &SkibidiLine) -> Result<(), JsValue> {
        let element = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlDivElement>()?;
        element.set_class_name("sk-line");
        let style = element.style();
        style.set_property("--sk-rand-rot", &format!("{:.3}deg", line.rotation_deg))?;
        style.set_property("--sk-rand-hue", &line.hue.to_string())?;
        element.set_text_content(Some(&line.text));
        self.stream.append_child(&element)?;
        Ok(())
    }

    fn evict_oldest_line(&self) -> Result<(), JsValue> {
        if let Some(first) = self.stream.first_child() {
            self.stream.remove_child(&first)?;
        }
        Ok(())
    }

    fn spawn_confetti(&self, particle: &ConfettiParticle) -> Result<Box<dyn FnOnce()>, JsValue> {
        let piece = self
            .document
            .create_element("span")?
            .dyn_into::<HtmlSpanElement>()?;
        piece.set_class_name("sk-confetti");
        let style = piece.style();
        let size = format!("{:.1}px", particle.size_px);
        style.set_property("width", &size)?;
        style.set_property("height", &size)?;
        style.set_property("left", &format!("{:.2}%", particle.left_pct))?;
        style.set_property("--sk-fall-time", &format!("{:.2}s", particle.fall_secs))?;
        style.set_property("--sk-x-drift", &format!("{:.1}px", particle.drift_px))?;
        style.set_property("background", &format!("hsl({} 85% 60%)", particle.hue))?;
        self.container.append_child(&piece)?;
        Ok(Box::new(move || piece.remove()))
    }
}

/// Only the header element outlives a clear; stray text nodes are left alone.
fn removed_by_clear(node_type: u16, id: &str) -> bool {
    node_type == Node::ELEMENT_NODE && id != HEADER_ID
}

fn get_html_element(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element #{id}")))
        .and_then(|el| {
            el.dyn_into::<HtmlElement>()
                .map_err(|_| JsValue::from_str(&format!("Element #{id} is not HtmlElement")))
        })
}
