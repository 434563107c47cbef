//! App Root Component
//!
//! Main application component with routing, global state and the page-wide
//! browser listeners.

use leptos::*;
use leptos_router::*;
use wasm_bindgen::JsValue;

use crate::components::{Nav, StatusBar, Toast};
use crate::pages::{Settings, Today};
use crate::pwa;
use crate::state::provide_global_state;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    // Provide global state to all components
    let state = provide_global_state();

    // Theme and accent follow the rendered frame
    let frame = state.frame;
    create_effect(move |_| {
        frame.with(|f| {
            if let Some(f) = f {
                pwa::apply_theme(f.theme);
                pwa::apply_accent(&f.accent);
            }
        })
    });

    // Connectivity
    let online = state.online;
    pwa::on_window_event("online", move |_| online.set(true));
    pwa::on_window_event("offline", move |_| online.set(false));

    // Keep the install prompt for the Install button
    let install_prompt = state.install_prompt;
    pwa::on_window_event("beforeinstallprompt", move |event| {
        event.prevent_default();
        install_prompt.set(Some(JsValue::from(event)));
    });

    state.load_quote();
    state.start_quote_refresh();

    view! {
        <Router>
            <div class="app">
                // Navigation header
                <Nav />

                // Main content area
                <main class="container">
                    <Routes>
                        <Route path="/" view=Today />
                        <Route path="/settings" view=Settings />
                        <Route path="/*any" view=NotFound />
                    </Routes>
                </main>

                // Footer with connection status
                <StatusBar />

                // Toast notifications
                <Toast />
            </div>
        </Router>
    }
}

/// 404 Not Found page
#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="card empty">
            <h1>"Page Not Found"</h1>
            <p>"The page you're looking for doesn't exist."</p>
            <A href="/" class="btn btn-accent">"Back to today"</A>
        </div>
    }
}
