//! Collection Sidebar Component
//!
//! Collections grouped into folders. Collections drag onto a folder header to
//! move there, or onto another collection to take its place.

use leptos::prelude::*;
use leptos::task::spawn_local;

use leptos_dragdrop::*;

use crate::components::DeleteConfirmButton;
use crate::context::use_app_context;
use crate::directory::{FolderGroup, FolderKey, SidebarTarget};
use crate::error::DirectoryError;
use crate::store::{store_block, use_app_store, AppStateStoreFields};

#[component]
pub fn CollectionSidebar() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let dnd = ctx.sidebar_dnd;

    let planner = move || ctx.planner(store.platform().get());
    let folders = move || {
        store.collections_version().get();
        planner().directory().folders()
    };
    let current = move || {
        store.collections_version().get();
        planner().current()
    };

    bind_global_mouseup(dnd, move |outcome: DropOutcome<SidebarTarget>| {
        let DropOutcome::Dropped { active, over, .. } = outcome else { return; };
        let planner = ctx.planner(store.platform().get_untracked());
        spawn_local(async move {
            planner.directory().handle_drop(&active, &over).await;
        });
    });

    // New collection / folder form
    let (new_name, set_new_name) = signal(String::new());
    let adding_in = RwSignal::new(FolderKey::Root);

    let add_collection = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get();
        let folder = adding_in.get_untracked();
        let planner = ctx.planner(store.platform().get_untracked());
        spawn_local(async move {
            if planner.directory().create_collection(&name, folder).await.is_some() {
                set_new_name.set(String::new());
            }
        });
    };

    let add_folder = move |_| {
        let name = new_name.get();
        let planner = ctx.planner(store.platform().get_untracked());
        spawn_local(async move {
            if let Some(created) = planner.directory().create_folder(&name).await {
                set_new_name.set(String::new());
                planner.select_collection(&created.id).await;
            }
        });
    };

    view! {
        <aside class="collection-sidebar">
            <div class="sidebar-header">
                <h3>"Collections"</h3>
            </div>

            <form class="collection-add-form" on:submit=add_collection>
                <input
                    type="text"
                    placeholder=move || match adding_in.get() {
                        FolderKey::Root => "New collection...".to_string(),
                        FolderKey::Named(folder) => format!("New collection in {}...", folder),
                    }
                    prop:value=move || new_name.get()
                    on:input=move |ev| set_new_name.set(event_target_value(&ev))
                />
                <button type="submit">"+"</button>
                <button type="button" title="New folder" on:click=add_folder>"📁+"</button>
            </form>

            <div class="folder-list">
                <For
                    each=folders
                    key=|group| {
                        let members: Vec<(String, String, i32)> = group
                            .collections
                            .iter()
                            .map(|c| (c.id.clone(), c.name.clone(), c.position))
                            .collect();
                        (group.key.clone(), members)
                    }
                    children=move |group| view! {
                        <FolderSection group=group dnd=dnd current=Signal::derive(current) adding_in=adding_in />
                    }
                />
            </div>
        </aside>
    }
}

#[component]
fn FolderSection(
    group: FolderGroup,
    dnd: DndSignals<SidebarTarget>,
    current: Signal<Option<String>>,
    adding_in: RwSignal<FolderKey>,
) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let key = group.key.clone();
    let header_target = SidebarTarget::Folder(key.clone());
    let is_drop_target = {
        let target = header_target.clone();
        move || dnd.is_over(&target)
    };
    let (renaming, set_renaming) = signal(false);
    let (rename_to, set_rename_to) = signal(key.label().to_string());

    let on_rename = {
        let old = key.label().to_string();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            let old = old.clone();
            let new = rename_to.get();
            set_renaming.set(false);
            let planner = ctx.planner(store.platform().get_untracked());
            spawn_local(async move {
                let report = planner.directory().rename_folder(&old, &new).await;
                log::debug!("[DIR] rename {} -> {}: {:?}", old, new, report);
            });
        }
    };

    let is_named = matches!(key, FolderKey::Named(_));
    let title = match &key {
        FolderKey::Root => "Uncategorized".to_string(),
        FolderKey::Named(name) => name.clone(),
    };
    let add_key = key.clone();

    view! {
        <div class="folder-section">
            <div
                class=move || if is_drop_target() { "folder-header drop-target" } else { "folder-header" }
                on:mouseenter=make_on_target_mouseenter(dnd, header_target.clone())
                on:mouseleave=make_on_mouseleave(dnd)
            >
                {move || if renaming.get() {
                    view! {
                        <form class="folder-rename-form" on:submit=on_rename.clone()>
                            <input
                                type="text"
                                prop:value=move || rename_to.get()
                                on:input=move |ev| set_rename_to.set(event_target_value(&ev))
                            />
                            <button type="submit">"✓"</button>
                            <button type="button" on:click=move |_| set_renaming.set(false)>"✗"</button>
                        </form>
                    }.into_any()
                } else {
                    view! {
                        <span class="folder-icon">"📁"</span>
                        <span
                            class="folder-name"
                            on:dblclick=move |_| if is_named { set_renaming.set(true) }
                        >
                            {title.clone()}
                        </span>
                    }.into_any()
                }}
                <button
                    class="folder-add-btn"
                    title="Add collection here"
                    on:click={
                        let add_key = add_key.clone();
                        move |_| adding_in.set(add_key.clone())
                    }
                >
                    "+"
                </button>
            </div>

            <ul class="collection-list">
                {group.collections.into_iter().map(|collection| {
                    let id = collection.id.clone();
                    let target = SidebarTarget::Collection(id.clone());
                    let is_selected = {
                        let id = id.clone();
                        move || current.get().as_deref() == Some(id.as_str())
                    };
                    let is_dragging = {
                        let target = target.clone();
                        move || dnd.is_active(&target)
                    };
                    let is_over = {
                        let target = target.clone();
                        move || dnd.is_over(&target)
                    };
                    let item_class = move || {
                        let mut c = String::from("collection-item");
                        if is_selected() { c.push_str(" active"); }
                        if is_dragging() { c.push_str(" dragging"); }
                        if is_over() { c.push_str(" drop-target"); }
                        c
                    };

                    let select_id = id.clone();
                    let on_click = move |_| {
                        if dnd.drag_just_ended_read.get_untracked() {
                            return;
                        }
                        let id = select_id.clone();
                        let planner = ctx.planner(store.platform().get_untracked());
                        spawn_local(async move {
                            planner.select_collection(&id).await;
                        });
                    };

                    let delete_id = id.clone();
                    let on_delete = move |_| {
                        let id = delete_id.clone();
                        let planner = ctx.planner(store.platform().get_untracked());
                        spawn_local(async move {
                            match planner.delete_collection(&id).await {
                                Ok(_) => {}
                                Err(DirectoryError::LastCollection) => {
                                    store_block(&store, DirectoryError::LastCollection.to_string());
                                }
                                Err(e) => log::warn!("[DIR] delete {}: {}", id, e),
                            }
                        });
                    };

                    let color = collection.color.clone().unwrap_or_default();

                    view! {
                        <li
                            class=item_class
                            on:mousedown=make_on_mousedown(dnd, target.clone(), DragMode::List)
                            on:mouseenter=make_on_target_mouseenter(dnd, target.clone())
                            on:mouseleave=make_on_mouseleave(dnd)
                            on:click=on_click
                        >
                            <span class="collection-swatch" style=format!("background:{}", color)></span>
                            <span class="collection-name">{collection.name.clone()}</span>
                            {collection.link.as_ref().map(|_| view! { <span class="collection-linked" title="Linked">"🔗"</span> })}
                            <DeleteConfirmButton button_class="collection-delete-btn" prompt="Delete collection?" on_confirm=on_delete />
                        </li>
                    }
                }).collect_view()}
            </ul>
        </div>
    }
}
