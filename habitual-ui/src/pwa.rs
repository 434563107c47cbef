//! Browser Glue
//!
//! Thin wrappers over the browser APIs the app touches directly: worker
//! registration, the install prompt, confetti, `confirm()`, stylesheet
//! swapping and connectivity events.

use habitual::habits::{Celebration, CelebrationError, Confirm};
use habitual::{AccentColor, Theme};
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// `<link>` whose href selects the theme stylesheet
pub const THEME_LINK_ID: &str = "theme-stylesheet";

/// Register the background worker script, if the browser supports workers
pub fn register_service_worker(script: &'static str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let navigator = window.navigator();
    if !Reflect::has(&navigator, &"serviceWorker".into()).unwrap_or(false) {
        web_sys::console::log_1(&"Service workers unsupported".into());
        return;
    }

    let registration = navigator.service_worker().register(script);
    wasm_bindgen_futures::spawn_local(async move {
        match JsFuture::from(registration).await {
            Ok(_) => {
                web_sys::console::log_1(&format!("ServiceWorker registered: {}", script).into())
            }
            Err(e) => web_sys::console::warn_1(
                &format!("ServiceWorker registration failed: {:?}", e).into(),
            ),
        }
    });
}

/// Listen for a window event for the lifetime of the page
pub fn on_window_event(name: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
    if let Err(e) =
        window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
    {
        web_sys::console::error_1(&format!("Failed to listen for {}: {:?}", name, e).into());
    }
    closure.forget();
}

/// Current connectivity as reported by the browser
pub fn is_online() -> bool {
    web_sys::window()
        .map(|w| w.navigator().on_line())
        .unwrap_or(true)
}

/// Show a deferred `beforeinstallprompt` event and wait for the user
///
/// Returns the choice outcome (`accepted` or `dismissed`).
pub async fn show_install_prompt(event: &JsValue) -> Result<String, JsValue> {
    let prompt: Function = Reflect::get(event, &"prompt".into())?.dyn_into()?;
    prompt.call0(event)?;

    let choice: Promise = Reflect::get(event, &"userChoice".into())?.dyn_into()?;
    let choice = JsFuture::from(choice).await?;
    let outcome = Reflect::get(&choice, &"outcome".into())?;

    Ok(outcome.as_string().unwrap_or_default())
}

/// Swap the theme stylesheet
pub fn apply_theme(theme: Theme) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(link) = document.get_element_by_id(THEME_LINK_ID) {
        let _ = link.set_attribute("href", &theme.stylesheet_href());
    }
}

/// Set the `--accent` custom property and the browser theme color
pub fn apply_accent(accent: &AccentColor) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };

    if let Some(root) = document
        .document_element()
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
    {
        let _ = root.style().set_property("--accent", accent.as_str());
    }

    if let Ok(Some(meta)) = document.query_selector("meta[name=\"theme-color\"]") {
        let _ = meta.set_attribute("content", accent.as_str());
    }
}

/// Offer `contents` as a JSON file download
pub fn download_json(file_name: &str, contents: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(
        &js_sys::Array::of1(&JsValue::from_str(contents)),
        &options,
    )?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    web_sys::Url::revoke_object_url(&url)
}

/// Read an uploaded file as text, handing the contents to `on_load`
pub fn read_text_file(
    file: &web_sys::File,
    on_load: impl FnOnce(String) + 'static,
) -> Result<(), JsValue> {
    let reader = web_sys::FileReader::new()?;

    let onload = {
        let reader = reader.clone();
        let mut on_load = Some(on_load);
        Closure::wrap(Box::new(move |_: web_sys::Event| {
            let text = reader.result().ok().and_then(|r| r.as_string());
            if let (Some(text), Some(on_load)) = (text, on_load.take()) {
                on_load(text);
            }
        }) as Box<dyn FnMut(_)>)
    };

    reader.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();

    reader.read_as_text(file)
}

/// `window.confirm()`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserConfirm;

impl Confirm for BrowserConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(prompt).ok())
            .unwrap_or(false)
    }
}

/// canvas-confetti burst, loaded from the CDN as a global `confetti`
#[derive(Debug, Clone, Copy, Default)]
pub struct Confetti;

impl Celebration for Confetti {
    fn celebrate(&self) -> Result<(), CelebrationError> {
        let confetti = Reflect::get(&js_sys::global(), &"confetti".into())
            .ok()
            .and_then(|f| f.dyn_into::<Function>().ok())
            .ok_or_else(|| CelebrationError("confetti library not loaded".to_string()))?;

        let options = js_sys::JSON::parse(
            r#"{"particleCount": 180, "spread": 70, "origin": {"y": 0.6}}"#,
        )
        .map_err(|e| CelebrationError(format!("{:?}", e)))?;

        confetti
            .call1(&JsValue::NULL, &options)
            .map(|_| ())
            .map_err(|e| CelebrationError(format!("{:?}", e)))
    }
}
