//! Navigation Component
//!
//! Header bar with brand, page links and the install button.

use leptos::*;
use leptos_router::*;

use crate::state::GlobalState;

/// Navigation header component
#[component]
pub fn Nav() -> impl IntoView {
    view! {
        <header class="topbar">
            // Logo and brand
            <A href="/" class="brand">
                <span class="brand-mark">"✅"</span>
                <span class="brand-name">"Habitual"</span>
            </A>

            // Navigation links
            <nav class="nav-links">
                <NavLink href="/" label="Today" />
                <NavLink href="/settings" label="Settings" />
                <InstallButton />
            </nav>
        </header>
    }
}

/// Individual navigation link
#[component]
fn NavLink(href: &'static str, label: &'static str) -> impl IntoView {
    view! {
        <A href=href class="nav-link" active_class="active" exact=true>
            {label}
        </A>
    }
}

/// Shown once the browser offers to install the app
#[component]
fn InstallButton() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let available = state.install_prompt;

    let on_click = move |_| state.prompt_install();

    view! {
        <button
            class="btn btn-accent"
            hidden=move || available.with(Option::is_none)
            on:click=on_click
        >
            "Install"
        </button>
    }
}
