//! Habit list
//!
//! Rebuilt in full from the current frame on every render.

use habitual::view::HabitRow;
use leptos::*;

use crate::state::GlobalState;

/// Every habit with its streak, total and actions
#[component]
pub fn HabitList() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let frame = state.frame;

    view! {
        <section class="habit-list">
            {move || {
                frame.with(|frame| match frame {
                    Some(frame) if frame.rows.is_empty() => {
                        let message = frame.empty_message.unwrap_or_default();
                        view! { <div class="card empty">{message}</div> }.into_view()
                    }
                    Some(frame) => frame
                        .rows
                        .iter()
                        .cloned()
                        .map(|row| view! { <HabitItem row=row /> })
                        .collect_view(),
                    None => view! {}.into_view(),
                })
            }}
        </section>
    }
}

#[component]
fn HabitItem(row: HabitRow) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");

    let class = if row.done { "habit card done" } else { "habit card" };
    let meta = format!("Streak: {} • Total: {}", row.streak, row.total);
    let label = row.action_label();

    let toggle = {
        let state = state.clone();
        let id = row.id.clone();
        move |_| state.toggle_habit(&id)
    };
    let delete = {
        let id = row.id.clone();
        move |_| state.delete_habit(&id)
    };

    view! {
        <div class=class>
            <div class="habit-left">
                <div class="habit-title">{row.name}</div>
                <div class="habit-meta">{meta}</div>
            </div>
            <div class="habit-actions">
                <button class="btn" on:click=toggle>{label}</button>
                <button class="btn btn-danger" on:click=delete>"Delete"</button>
            </div>
        </div>
    }
}
