//! Footer with connectivity and install status

use leptos::*;

use crate::state::GlobalState;

#[component]
pub fn StatusBar() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let online = state.online;
    let install_status = state.install_status;

    view! {
        <footer class="status-bar">
            <span class="status" class:offline=move || !online.get()>
                {move || if online.get() { "Online" } else { "Offline" }}
            </span>
            {move || install_status.get().map(|status| view! {
                <span class="install-status">{status}</span>
            })}
        </footer>
    }
}
