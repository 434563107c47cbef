//! Quote of the day card

use habitual::quote::QuoteOrigin;
use leptos::*;

use crate::state::GlobalState;

#[component]
pub fn QuoteCard() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let quote = state.quote;

    view! {
        <section class="card quote-card">
            {move || match quote.get() {
                Some(shown) => {
                    let fallback = shown.origin == QuoteOrigin::Fallback;
                    view! {
                        <blockquote class="quote" class:offline=fallback>
                            {format!("\"{}\"", shown.quote.text)}
                        </blockquote>
                        <div class="quote-author">{shown.quote.author}</div>
                    }
                    .into_view()
                }
                None => view! { <div class="quote loading">"Loading quote..."</div> }.into_view(),
            }}
        </section>
    }
}
