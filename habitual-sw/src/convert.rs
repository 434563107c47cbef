//! Conversions between the Fetch API objects and the cache model

use habitual::cache::RequestMode;
use habitual::{Request, Response};
use js_sys::{Array, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{RequestInit, ResponseInit};

/// Statuses whose responses must not carry a body
fn is_null_body_status(status: u16) -> bool {
    matches!(status, 101 | 204 | 205 | 304)
}

pub fn to_request(request: &web_sys::Request) -> Request {
    let mode = match request.mode() {
        web_sys::RequestMode::Navigate => RequestMode::Navigate,
        web_sys::RequestMode::SameOrigin => RequestMode::SameOrigin,
        web_sys::RequestMode::NoCors => RequestMode::NoCors,
        _ => RequestMode::Cors,
    };

    Request {
        url: request.url(),
        method: request.method().to_ascii_uppercase(),
        mode,
    }
}

/// Build an outgoing request; navigations are re-issued as same-origin
pub fn to_web_request(request: &Request) -> Result<web_sys::Request, JsValue> {
    let init = RequestInit::new();
    init.set_method(&request.method);
    init.set_mode(match request.mode {
        RequestMode::Cors => web_sys::RequestMode::Cors,
        RequestMode::NoCors => web_sys::RequestMode::NoCors,
        RequestMode::SameOrigin | RequestMode::Navigate => web_sys::RequestMode::SameOrigin,
    });

    web_sys::Request::new_with_str_and_init(&request.url, &init)
}

/// Read a Fetch API response in full
pub async fn from_web_response(response: &web_sys::Response) -> Result<Response, JsValue> {
    let mut headers = Vec::new();
    if let Some(entries) = js_sys::try_iter(&response.headers())? {
        for entry in entries {
            let pair: Array = entry?.dyn_into()?;
            if let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                headers.push((name, value));
            }
        }
    }

    let buffer = JsFuture::from(response.array_buffer()?).await?;
    let body = Uint8Array::new(&buffer).to_vec();

    Ok(Response {
        status: response.status(),
        status_text: response.status_text(),
        headers,
        body,
    })
}

/// Materialize a stored response for `respondWith` or `Cache.put`
///
/// Opaque responses (status 0) cannot be rebuilt and are rejected.
pub fn to_web_response(response: &Response) -> Result<web_sys::Response, JsValue> {
    let headers = web_sys::Headers::new()?;
    for (name, value) in &response.headers {
        headers.append(name, value)?;
    }

    let init = ResponseInit::new();
    init.set_status(response.status);
    init.set_status_text(&response.status_text);
    init.set_headers(&headers);

    if is_null_body_status(response.status) {
        return web_sys::Response::new_with_opt_buffer_source_and_init(None, &init);
    }

    let body = Uint8Array::from(response.body.as_slice());
    web_sys::Response::new_with_opt_buffer_source_and_init(Some(&body), &init)
}
