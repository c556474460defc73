//! Item Editor Column
//!
//! Side panel for the selected card. Title and description go through the
//! debounced field buffer; status changes are sent right away.

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;

use crate::commands::RestApi;
use crate::components::StatusSelector;
use crate::context::use_app_context;
use crate::debounce::DebouncedFields;
use crate::models::{ItemPatch, ItemStatus};
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn ItemEditor() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let fields: StoredValue<Option<DebouncedFields<RestApi>>, LocalStorage> = StoredValue::new_local(None);
    let (title, set_title) = signal(String::new());
    let (description, set_description) = signal(String::new());
    let (status, set_status) = signal(ItemStatus::Draft);

    let flush = move || fields.with_value(|f| {
        if let Some(f) = f {
            f.flush();
        }
    });

    // Rebind when the edited item changes; pending edits of the previous
    // item are sent first.
    Effect::new(move |_| {
        let editing = ctx.editing_item.get();
        flush();
        let planner = ctx.planner(store.platform().get_untracked());
        let next = editing.and_then(|id| {
            let collection_id = planner.items().locate(&id)?;
            let item = planner.items().get(&collection_id, &id)?;
            set_title.set(item.title);
            set_description.set(item.description);
            set_status.set(item.status);
            Some(DebouncedFields::new(id, planner.sync().clone()))
        });
        fields.set_value(next);
    });

    on_cleanup(flush);

    let edit = move |patch: ItemPatch| fields.with_value(|f| {
        if let Some(f) = f {
            f.edit(patch);
        }
    });

    let change_status = move |next: ItemStatus| {
        set_status.set(next);
        let Some(id) = ctx.editing_item.get_untracked() else { return; };
        let planner = ctx.planner(store.platform().get_untracked());
        spawn_local(async move {
            planner
                .sync()
                .update_item(&id, ItemPatch { status: Some(next), ..Default::default() })
                .await;
        });
    };

    let close = move |_| {
        flush();
        ctx.editing_item.set(None);
    };

    view! {
        <Show when=move || ctx.editing_item.get().is_some()>
            <div class="item-editor-column">
                <div class="item-editor-header">
                    <span class="item-editor-title">"Edit post"</span>
                    <button class="close-btn" on:click=close>"×"</button>
                </div>

                <div class="item-editor-body">
                    <label>"Title"</label>
                    <input
                        type="text"
                        prop:value=move || title.get()
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            set_title.set(value.clone());
                            edit(ItemPatch::title(value));
                        }
                        on:blur=move |_| flush()
                    />

                    <label>"Description"</label>
                    <textarea
                        class="item-description"
                        prop:value=move || description.get()
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            set_description.set(value.clone());
                            edit(ItemPatch::description(value));
                        }
                        on:blur=move |_| flush()
                        placeholder="Caption, notes, hashtags..."
                    ></textarea>

                    <label>"Status"</label>
                    <StatusSelector current=status on_change=change_status />
                </div>
            </div>
        </Show>
    }
}
