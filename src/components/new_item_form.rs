//! New Item Form Component
//!
//! Adds an item to the end of the current collection. The card shows up at
//! once and is swapped for the saved one when the server answers.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::StatusSelector;
use crate::context::use_app_context;
use crate::models::{ItemDraft, ItemStatus};
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn NewItemForm() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let (new_title, set_new_title) = signal(String::new());
    let (thumbnail, set_thumbnail) = signal(String::new());
    let (status, set_status) = signal(ItemStatus::Draft);

    let create_item = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let title = new_title.get().trim().to_string();
        if title.is_empty() { return; }
        let planner = ctx.planner(store.platform().get_untracked());
        let Some(collection_id) = planner.current() else { return; };

        let thumb = thumbnail.get().trim().to_string();
        let draft = ItemDraft {
            title,
            thumbnail: (!thumb.is_empty()).then_some(thumb),
            status: status.get(),
            ..Default::default()
        };
        set_new_title.set(String::new());
        set_thumbnail.set(String::new());

        spawn_local(async move {
            if let Some(id) = planner.sync().create_item(&collection_id, draft).await {
                log::debug!("[SYNC] created {} in {}", id, collection_id);
            }
        });
    };

    view! {
        <form class="new-item-form" on:submit=create_item>
            <div class="new-item-row">
                <input
                    type="text"
                    placeholder="Add new post..."
                    prop:value=move || new_title.get()
                    on:input=move |ev| set_new_title.set(event_target_value(&ev))
                />
                <input
                    type="url"
                    class="thumbnail-input"
                    placeholder="Thumbnail URL"
                    prop:value=move || thumbnail.get()
                    on:input=move |ev| set_thumbnail.set(event_target_value(&ev))
                />
                <button type="submit">"Add"</button>
            </div>
            <StatusSelector current=status on_change=move |s| set_status.set(s) />
        </form>
    }
}
