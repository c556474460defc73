//! Platform Tab Bar Component
//!
//! Switches between the YouTube, Instagram and TikTok planners and holds the
//! grid toggles.

use leptos::prelude::*;

use crate::models::Platform;
use crate::prefs;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn PlatformTabBar() -> impl IntoView {
    let store = use_app_store();

    let toggle_lock = move |_| {
        let locked = !store.grid_locked().get_untracked();
        store.grid_locked().set(locked);
        prefs::save_grid_lock(locked);
    };

    view! {
        <div class="platform-tab-bar">
            {Platform::ALL.iter().map(|&platform| {
                let is_active = move || store.platform().get() == platform;
                view! {
                    <button
                        class=move || if is_active() { "platform-tab active" } else { "platform-tab" }
                        on:click=move |_| store.platform().set(platform)
                    >
                        {platform.label()}
                    </button>
                }
            }).collect_view()}

            <div class="grid-toggles">
                <label class="toggle">
                    <input
                        type="checkbox"
                        prop:checked=move || store.swap_cards().get()
                        on:change=move |ev| store.swap_cards().set(event_target_checked(&ev))
                    />
                    "Swap cards"
                </label>
                <button
                    class=move || if store.grid_locked().get() { "lock-btn locked" } else { "lock-btn" }
                    title="Lock grid order"
                    on:click=toggle_lock
                >
                    {move || if store.grid_locked().get() { "🔒" } else { "🔓" }}
                </button>
            </div>
        </div>
    }
}
