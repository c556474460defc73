//! Status Selector Component
//!
//! Draft / Scheduled / Published buttons.

use leptos::prelude::*;

use crate::models::ItemStatus;

#[component]
pub fn StatusSelector(
    #[prop(into)] current: Signal<ItemStatus>,
    on_change: impl Fn(ItemStatus) + Copy + 'static,
) -> impl IntoView {
    view! {
        <div class="status-selector">
            {ItemStatus::ALL.iter().map(|&status| {
                let is_selected = move || current.get() == status;
                view! {
                    <button
                        type="button"
                        class=move || if is_selected() { "status-btn active" } else { "status-btn" }
                        on:click=move |_| on_change(status)
                    >
                        {status.label()}
                    </button>
                }
            }).collect_view()}
        </div>
    }
}
