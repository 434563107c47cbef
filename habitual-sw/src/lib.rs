//! # Habitual Worker
//!
//! The offline app-shell worker: the library's [`CacheController`] bound
//! to the browser Cache Storage and Fetch APIs.
//!
//! `sw.js` registers the worker event listeners and forwards each event to
//! one of the exported functions:
//!
//! - `install()`: cache every app-shell asset, all or nothing
//! - `activate()`: delete stale generations and claim open pages
//! - `handle_fetch(request)`: answer an intercepted request
//! - `status()`: lifecycle state and stored generations, for debugging
//!
//! One controller lives for as long as the worker does, so the lifecycle
//! state carries across events.

mod convert;
mod host;
mod network;
mod storage;

use habitual::cache::{AssetManifest, CacheController, CacheError};
use habitual::{Origin, Response};
use js_sys::Promise;
use std::cell::OnceCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::ServiceWorkerGlobalScope;

pub use host::ScopeHost;
pub use network::FetchNetwork;
pub use storage::BrowserCacheStorage;

type Controller = CacheController<BrowserCacheStorage, FetchNetwork, ScopeHost>;

thread_local! {
    static CONTROLLER: OnceCell<Rc<Controller>> = const { OnceCell::new() };
}

fn scope() -> Result<ServiceWorkerGlobalScope, JsValue> {
    js_sys::global().dyn_into()
}

fn controller() -> Result<Rc<Controller>, JsValue> {
    CONTROLLER.with(|cell| {
        if let Some(controller) = cell.get() {
            return Ok(Rc::clone(controller));
        }

        console_error_panic_hook::set_once();
        let scope = scope()?;
        let origin = Origin::parse(&scope.location().origin()).map_err(to_js_error)?;
        let controller = Rc::new(CacheController::new(
            BrowserCacheStorage::new(scope.caches()?),
            FetchNetwork::new(scope.clone()),
            ScopeHost::new(scope),
            AssetManifest::default(),
            origin,
        ));

        let _ = cell.set(Rc::clone(&controller));
        Ok(controller)
    })
}

fn to_js_error(err: CacheError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Populate the current cache generation
#[wasm_bindgen]
pub fn install() -> Promise {
    future_to_promise(async move {
        let controller = controller()?;
        let report = controller.install().await.map_err(to_js_error)?;

        web_sys::console::log_1(
            &format!(
                "Cached {} assets into {}",
                report.assets, report.generation
            )
            .into(),
        );
        Ok(JsValue::from(report.assets as u32))
    })
}

/// Evict stale generations and take control of open pages
#[wasm_bindgen]
pub fn activate() -> Promise {
    future_to_promise(async move {
        let controller = controller()?;
        let report = controller.activate().await.map_err(to_js_error)?;

        if !report.removed.is_empty() {
            web_sys::console::log_1(
                &format!("Deleted stale caches: {}", report.removed.join(", ")).into(),
            );
        }
        Ok(JsValue::UNDEFINED)
    })
}

/// Answer an intercepted request; always resolves to a `Response`
#[wasm_bindgen]
pub fn handle_fetch(request: web_sys::Request) -> Promise {
    future_to_promise(async move {
        let controller = controller()?;
        let intercepted = convert::to_request(&request);

        // Request bodies are not modelled, so anything but GET goes out untouched
        if !intercepted.is_cacheable() {
            return passthrough(&request).await;
        }

        let outcome = controller.handle_fetch(&intercepted).await;
        match convert::to_web_response(&outcome.response) {
            Ok(response) => Ok(response.into()),
            Err(e) => {
                web_sys::console::warn_1(&e);
                offline()
            }
        }
    })
}

/// Lifecycle state and stored generations as a plain object
#[wasm_bindgen]
pub fn status() -> Promise {
    future_to_promise(async move {
        let controller = controller()?;
        let status = controller.status().await.map_err(to_js_error)?;
        let json = serde_json::to_string(&status).map_err(|e| JsValue::from_str(&e.to_string()))?;
        js_sys::JSON::parse(&json)
    })
}

async fn passthrough(request: &web_sys::Request) -> Result<JsValue, JsValue> {
    match JsFuture::from(scope()?.fetch_with_request(request)).await {
        Ok(response) => Ok(response),
        Err(_) => offline(),
    }
}

fn offline() -> Result<JsValue, JsValue> {
    convert::to_web_response(&Response::service_unavailable()).map(JsValue::from)
}
