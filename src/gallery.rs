use crate::utils;
use serde::Deserialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlButtonElement, HtmlElement, HtmlImageElement,
    KeyboardEvent, MouseEvent, TouchEvent,
};

pub const GRID_ID: &str = "gallery-grid";
pub const MANIFEST_PATH: &str = "/photography/photos.json";
pub const SWIPE_THRESHOLD_PX: f64 = 42.0;
const NO_SCROLL_CLASS: &str = "no-scroll";
const SWAP_CLASS: &str = "swap";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Photo {
    pub src: String,
    pub title: String,
    #[serde(default)]
    pub desc: String,
}

pub fn default_photos() -> Vec<Photo> {
    vec![
        Photo {
            src: "/media/images/cat-nicojpeg-tech.jpeg".to_string(),
            title: "Cat • studio light test".to_string(),
            desc: "Playful portrait while testing lighting & texture.".to_string(),
        },
        Photo {
            src: "/media/images/tousend-me.jpeg".to_string(),
            title: "Self • thousand me".to_string(),
            desc: "Experimental multiple exposure inspired composite.".to_string(),
        },
    ]
}

/// Which photo the overlay shows, if it is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lightbox {
    len: usize,
    index: usize,
    open: bool,
}

impl Lightbox {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            index: 0,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn open(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.index = index;
        self.open = true;
        true
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    /// Indices worth preloading: the photo after and the photo before.
    pub fn neighbours(&self) -> [usize; 2] {
        if self.len == 0 {
            return [0, 0];
        }
        [(self.index + 1) % self.len, (self.index + self.len - 1) % self.len]
    }
}

pub fn caption(index: usize, len: usize, title: &str) -> String {
    format!("{}/{} — {}", index + 1, len, title)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Next,
    Prev,
}

pub fn swipe_direction(dx: f64) -> Option<Swipe> {
    if dx.abs() <= SWIPE_THRESHOLD_PX {
        None
    } else if dx < 0.0 {
        Some(Swipe::Next)
    } else {
        Some(Swipe::Prev)
    }
}

struct LightboxElements {
    root: HtmlElement,
    image: HtmlImageElement,
    caption: HtmlElement,
}

pub struct Gallery {
    document: Document,
    photos: Vec<Photo>,
    lightbox: RefCell<Lightbox>,
    elements: LightboxElements,
    touch_start_x: Cell<f64>,
}

/// Loads the manifest and wires up the grid and the lightbox.
pub fn mount() {
    spawn_local(async {
        let photos = load_photos().await;
        if let Err(err) = Gallery::new(photos).and_then(|gallery| gallery.install()) {
            utils::log(&utils::format_js_error("Failed to mount gallery", err));
        }
    });
}

async fn load_photos() -> Vec<Photo> {
    match utils::fetch_json::<Vec<Photo>>(MANIFEST_PATH).await {
        Ok(photos) if !photos.is_empty() => photos,
        Ok(_) => default_photos(),
        Err(err) => {
            utils::log(&utils::format_js_error(
                "Photo manifest unavailable, using built-in photos",
                err,
            ));
            default_photos()
        }
    }
}

impl Gallery {
    fn new(photos: Vec<Photo>) -> Result<Rc<Self>, JsValue> {
        let document = utils::document()?;
        let elements = LightboxElements {
            root: element_by_id(&document, "lightbox")?,
            image: element_by_id(&document, "lb-img")?,
            caption: element_by_id(&document, "lb-cap")?,
        };
        Ok(Rc::new(Self {
            document,
            lightbox: RefCell::new(Lightbox::new(photos.len())),
            photos,
            elements,
            touch_start_x: Cell::new(0.0),
        }))
    }

    fn install(self: Rc<Self>) -> Result<(), JsValue> {
        let grid: HtmlElement = element_by_id(&self.document, GRID_ID)?;
        for (index, photo) in self.photos.iter().enumerate() {
            let card = self.create_card(index, photo)?;
            grid.append_child(&card)?;
        }

        let keys = Rc::clone(&self);
        listen(&self.document, "keydown", move |event: KeyboardEvent| {
            keys.handle_key(&event.key());
        })?;

        for (id, step) in [("lb-prev", Some(Swipe::Prev)), ("lb-next", Some(Swipe::Next))] {
            let button: HtmlElement = element_by_id(&self.document, id)?;
            let gallery = Rc::clone(&self);
            listen(&button, "click", move |_event: MouseEvent| {
                gallery.step(step);
            })?;
        }

        let close_button: HtmlElement = element_by_id(&self.document, "lb-close")?;
        let gallery = Rc::clone(&self);
        listen(&close_button, "click", move |_event: MouseEvent| {
            gallery.close();
        })?;

        let gallery = Rc::clone(&self);
        listen(&self.elements.root, "click", move |event: MouseEvent| {
            let backdrop: &EventTarget = gallery.elements.root.as_ref();
            if event.target().as_ref() == Some(backdrop) {
                gallery.close();
            }
        })?;

        let gallery = Rc::clone(&self);
        listen(&self.elements.root, "touchstart", move |event: TouchEvent| {
            if let Some(touch) = event.changed_touches().get(0) {
                gallery.touch_start_x.set(f64::from(touch.client_x()));
            }
        })?;

        let gallery = Rc::clone(&self);
        listen(&self.elements.root, "touchend", move |event: TouchEvent| {
            if let Some(touch) = event.changed_touches().get(0) {
                let dx = f64::from(touch.client_x()) - gallery.touch_start_x.get();
                gallery.step(swipe_direction(dx));
            }
        })?;

        Ok(())
    }

    fn create_card(
        self: &Rc<Self>,
        index: usize,
        photo: &Photo,
    ) -> Result<HtmlButtonElement, JsValue> {
        let card = self
            .document
            .create_element("button")?
            .dyn_into::<HtmlButtonElement>()?;
        card.set_type("button");
        card.set_class_name("gallery-card");
        card.set_attribute("data-index", &index.to_string())?;
        card.set_inner_html(&format!(
            "<div class=\"img-wrap shimmer\"><img loading=\"lazy\" src=\"{src}\" alt=\"{title}\" /></div><div class=\"card-meta\"><h2>{title}</h2></div>",
            src = utils::escape_html(&photo.src),
            title = utils::escape_html(&photo.title),
        ));

        let gallery = Rc::clone(self);
        listen(&card, "click", move |_event: MouseEvent| {
            gallery.open(index);
        })?;

        let wrap = card.query_selector(".img-wrap")?;
        if let (Some(image), Some(wrap)) = (card.query_selector("img")?, wrap) {
            let loaded_card = card.clone();
            let loaded_wrap = wrap.clone();
            listen(&image, "load", move |_event: Event| {
                let _ = loaded_wrap.class_list().remove_1("shimmer");
                let _ = loaded_card.class_list().add_1("loaded");
            })?;
            listen(&image, "error", move |_event: Event| {
                let _ = wrap.class_list().add_1("error");
            })?;
        }
        Ok(card)
    }

    fn handle_key(&self, key: &str) {
        if !self.lightbox.borrow().is_open() {
            return;
        }
        match key {
            "Escape" => self.close(),
            "ArrowRight" => self.step(Some(Swipe::Next)),
            "ArrowLeft" => self.step(Some(Swipe::Prev)),
            _ => {}
        }
    }

    fn open(&self, index: usize) {
        if !self.lightbox.borrow_mut().open(index) {
            return;
        }
        if let Err(err) = self.show_current(false) {
            utils::log(&utils::format_js_error("Failed to open lightbox", err));
        }
        self.elements.root.set_hidden(false);
        self.set_body_locked(true);
    }

    fn close(&self) {
        self.lightbox.borrow_mut().close();
        self.elements.root.set_hidden(true);
        self.set_body_locked(false);
    }

    fn step(&self, direction: Option<Swipe>) {
        {
            let mut lightbox = self.lightbox.borrow_mut();
            match direction {
                Some(Swipe::Next) => lightbox.next(),
                Some(Swipe::Prev) => lightbox.prev(),
                None => return,
            }
        }
        if let Err(err) = self.show_current(true) {
            utils::log(&utils::format_js_error("Failed to switch photo", err));
        }
    }

    fn show_current(&self, animate: bool) -> Result<(), JsValue> {
        let (index, neighbours) = {
            let lightbox = self.lightbox.borrow();
            (lightbox.index(), lightbox.neighbours())
        };
        let Some(photo) = self.photos.get(index) else {
            return Ok(());
        };

        let image = &self.elements.image;
        if animate {
            image.class_list().add_1(SWAP_CLASS)?;
            let swapped = image.clone();
            let unswap = Closure::once_into_js(move || {
                let _ = swapped.class_list().remove_1(SWAP_CLASS);
            });
            if let Some(window) = utils::window() {
                window.request_animation_frame(unswap.unchecked_ref())?;
            }
        }
        image.set_src(&photo.src);
        image.set_alt(&photo.title);
        image.set_title(&photo.desc);
        self.elements
            .caption
            .set_text_content(Some(&caption(index, self.photos.len(), &photo.title)));

        for neighbour in neighbours {
            if let Some(photo) = self.photos.get(neighbour) {
                let preload = HtmlImageElement::new()?;
                preload.set_src(&photo.src);
            }
        }
        Ok(())
    }

    fn set_body_locked(&self, locked: bool) {
        let Some(body) = self.document.body() else {
            return;
        };
        let result = if locked {
            body.class_list().add_1(NO_SCROLL_CLASS)
        } else {
            body.class_list().remove_1(NO_SCROLL_CLASS)
        };
        if let Err(err) = result {
            utils::log(&utils::format_js_error("Failed to toggle page scroll", err));
        }
    }
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing #{id} element")))?
        .dyn_into::<T>()
        .map_err(|_: Element| JsValue::from_str(&format!("Element #{id} has the wrong type")))
}

fn listen<E, F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
