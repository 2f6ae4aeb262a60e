use serde::de::DeserializeOwned;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Request, RequestInit, RequestMode, Response};

pub fn document() -> Result<Document, JsValue> {
    window()
        .and_then(|win| win.document())
        .ok_or_else(|| JsValue::from_str("Document unavailable"))
}

#[cfg(target_arch = "wasm32")]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log(message: &str) {
    eprintln!("{message}");
}

async fn fetch_response(path: &str) -> Result<Response, JsValue> {
    let window = window().ok_or_else(|| JsValue::from_str("Window unavailable"))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::SameOrigin);

    let request = Request::new_with_str_and_init(path, &opts)?;
    let response_value = JsFuture::from(window.fetch_with_request(&request)).await?;
    let response: Response = response_value.dyn_into()?;

    if !response.ok() {
        let status = response.status();
        return Err(JsValue::from_str(&format!(
            "Failed to fetch {path} (status {status})"
        )));
    }
    Ok(response)
}

pub async fn fetch_text(path: &str) -> Result<String, JsValue> {
    let response = fetch_response(path).await?;
    let text = JsFuture::from(response.text()?).await?;
    text.as_string()
        .ok_or_else(|| JsValue::from_str(&format!("Response body for {path} is not text")))
}

pub async fn fetch_json<T>(path: &str) -> Result<T, JsValue>
where
    T: DeserializeOwned,
{
    let response = fetch_response(path).await?;
    let json = JsFuture::from(response.json()?).await?;
    from_value(json).map_err(|e| JsValue::from_str(&format!("JSON error for {path}: {e}")))
}

pub fn open_link(url: &str) {
    if let Some(win) = window() {
        if let Err(err) = win.open_with_url_and_target_and_features(url, "_blank", "noopener") {
            log(&format_js_error(&format!("Failed to open {url}"), err));
        }
    }
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Human-readable text of a JS exception: `Error.message` for error
/// objects, the string itself for thrown strings.
pub fn js_error_message(err: JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

pub fn format_js_error(context: &str, err: JsValue) -> String {
    format!("{context}: {}", js_error_message(err))
}

pub fn window() -> Option<web_sys::Window> {
    web_sys::window()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_encodes_special_characters() {
        let original = "<tag attr=\"value & more\">";
        let escaped = escape_html(original);
        assert_eq!(escaped, "&lt;tag attr=&quot;value &amp; more&quot;&gt;");
        assert!(
            !escaped.contains('<') && !escaped.contains('>'),
            "Escaped string should not contain raw angle brackets: {escaped}"
        );
    }

    #[test]
    fn escape_html_encodes_single_quotes() {
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn escape_html_keeps_plain_text() {
        assert_eq!(escape_html("about"), "about");
    }

    #[cfg(target_arch = "wasm32")]
    mod browser {
        use super::super::*;
        use wasm_bindgen_test::wasm_bindgen_test;

        #[wasm_bindgen_test]
        fn error_objects_report_their_message() {
            let err = js_sys::TypeError::new("Failed to fetch");
            assert_eq!(js_error_message(err.into()), "Failed to fetch");
        }

        #[wasm_bindgen_test]
        fn thrown_strings_are_kept_verbatim() {
            let err = JsValue::from_str("Failed to fetch /about/ (status 404)");
            assert_eq!(
                js_error_message(err),
                "Failed to fetch /about/ (status 404)"
            );
            assert_eq!(
                format_js_error("Failed to render", JsValue::from_str("boom")),
                "Failed to render: boom"
            );
        }
    }
}
