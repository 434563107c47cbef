//! Today Page
//!
//! Quote of the day, the habit list and the weekly chart.

use leptos::*;

use crate::components::{HabitForm, HabitList, QuoteCard, WeeklyChart};

#[component]
pub fn Today() -> impl IntoView {
    view! {
        <div class="page today">
            <QuoteCard />
            <HabitForm />
            <HabitList />
            <WeeklyChart />
        </div>
    }
}
