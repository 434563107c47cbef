//! Habitual
//!
//! Offline-first habit tracker front end built with Leptos (WASM).
//!
//! # Features
//!
//! - Daily check-offs with streaks and a seven-day chart
//! - Quote of the day, cached per day
//! - Light/dark theme and accent color
//! - JSON export/import
//! - Installable, works offline through the background worker
//!
//! # Architecture
//!
//! This is a client-side rendered (CSR) Leptos application that compiles to
//! WebAssembly. All state lives in `window.localStorage`; the domain logic
//! comes from the `habitual` library.

use leptos::*;

mod app;
mod components;
mod pages;
mod pwa;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    pwa::register_service_worker("/sw.js");

    // Mount the app to the document body
    mount_to_body(|| view! { <app::App /> });
}
