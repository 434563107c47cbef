//! New habit input

use leptos::*;

use crate::state::GlobalState;

/// Text box plus Add button; Enter also submits
#[component]
pub fn HabitForm() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let (name, set_name) = create_signal(String::new());

    let submit = move || {
        state.add_habit(&name.get_untracked());
        set_name.set(String::new());
    };

    let on_key = {
        let submit = submit.clone();
        move |ev: ev::KeyboardEvent| {
            if ev.key() == "Enter" {
                submit();
            }
        }
    };

    view! {
        <div class="card habit-form">
            <input
                type="text"
                placeholder="New habit, e.g. Drink water"
                maxlength="80"
                prop:value=name
                on:input=move |ev| set_name.set(event_target_value(&ev))
                on:keyup=on_key
            />
            <button class="btn btn-accent" on:click=move |_| submit()>
                "Add"
            </button>
        </div>
    }
}
