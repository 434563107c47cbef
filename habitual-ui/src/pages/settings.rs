//! Settings Page
//!
//! Theme, accent color and data management (export, import, clear).

use habitual::Theme;
use leptos::*;
use wasm_bindgen::JsCast;

use crate::pwa;
use crate::state::GlobalState;

/// Settings page component
#[component]
pub fn Settings() -> impl IntoView {
    view! {
        <div class="page settings">
            <h1>"Settings"</h1>
            <AppearanceSettings />
            <DataManagement />
        </div>
    }
}

/// Theme selector and accent picker
#[component]
fn AppearanceSettings() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let frame = state.frame;

    let current_theme = move || frame.with(|f| f.as_ref().map(|f| f.theme).unwrap_or_default());
    let current_accent = move || {
        frame.with(|f| {
            f.as_ref()
                .map(|f| f.accent.to_string())
                .unwrap_or_default()
        })
    };

    let state_for_theme = state.clone();
    let on_theme = move |ev: ev::Event| match event_target_value(&ev).parse::<Theme>() {
        Ok(theme) => state_for_theme.set_theme(theme),
        Err(e) => state_for_theme.show_error(&e.to_string()),
    };

    let on_accent = move |ev: ev::Event| state.set_accent(&event_target_value(&ev));

    view! {
        <section class="card">
            <h2>"Appearance"</h2>

            <label class="setting">
                <span>"Theme"</span>
                <select on:change=on_theme>
                    {Theme::all()
                        .iter()
                        .map(|theme| {
                            let theme = *theme;
                            view! {
                                <option
                                    value=theme.as_str()
                                    selected=move || current_theme() == theme
                                >
                                    {theme.as_str()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </label>

            <label class="setting">
                <span>"Accent color"</span>
                <input type="color" prop:value=current_accent on:input=on_accent />
            </label>
        </section>
    }
}

/// Export, import and clear
#[component]
fn DataManagement() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let state_for_export = state.clone();
    let export_data = move |_| state_for_export.export();

    let state_for_clear = state.clone();
    let clear_data = move |_| state_for_clear.clear_all();

    let state_for_import = state;
    let handle_file_upload = move |ev: ev::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };

        let state_clone = state_for_import.clone();
        if let Err(e) = pwa::read_text_file(&file, move |text| state_clone.import(&text)) {
            state_for_import.show_error(&format!("Failed to read file: {:?}", e));
        }

        // Allow picking the same file again
        input.set_value("");
    };

    view! {
        <section class="card">
            <h2>"Data"</h2>

            <div class="setting">
                <div>
                    <h3>"Export"</h3>
                    <p class="hint">"Download every habit and its history as JSON"</p>
                </div>
                <button class="btn" on:click=export_data>"Export"</button>
            </div>

            <div class="setting">
                <div>
                    <h3>"Import"</h3>
                    <p class="hint">"Replace all habits with a previous export"</p>
                </div>
                <input type="file" accept="application/json,.json" on:change=handle_file_upload />
            </div>

            <div class="setting">
                <div>
                    <h3>"Clear"</h3>
                    <p class="hint">"Delete all habits and history"</p>
                </div>
                <button class="btn btn-danger" on:click=clear_data>"Clear all"</button>
            </div>
        </section>
    }
}
