//! Planner Grid Component
//!
//! Cards of the current collection laid out in platform columns, with a
//! handle per row and per column. Card drops move (or swap, when enabled);
//! handle drops swap whole rows or columns. Keyboard: focus a card or
//! handle, Space grabs, arrows pick the target, Space drops, Escape cancels.

use leptos::prelude::*;
use leptos::task::spawn_local;

use leptos_dragdrop::*;

use crate::components::DeleteConfirmButton;
use crate::context::{use_app_context, AppContext};
use crate::models::{Item, ItemStatus};
use crate::planner::GridHandle;
use crate::store::{use_app_store, AppStateStoreFields, AppStore};

fn card_mode(store: &AppStore) -> DragMode {
    if store.swap_cards().get_untracked() { DragMode::Grid } else { DragMode::List }
}

fn mode_for(handle: &GridHandle, store: &AppStore) -> DragMode {
    match handle {
        GridHandle::Item(_) => card_mode(store),
        GridHandle::Row(_) => DragMode::Rows,
        GridHandle::Column(_) => DragMode::Columns,
    }
}

/// Apply a drop to the store now, persist the new order in the background.
fn handle_drop(ctx: AppContext, store: AppStore, outcome: DropOutcome<GridHandle>) {
    let planner = ctx.planner(store.platform().get_untracked());
    let Some(collection_id) = planner.current() else { return; };
    if let Some(order) = planner.apply_drop(&collection_id, &outcome) {
        spawn_local(async move {
            planner.persist(&collection_id, &order).await;
        });
    }
}

/// Forget keyboard focus once it leaves the cell that claimed it.
fn release_focus(ctx: AppContext, handle: &GridHandle) {
    if ctx.focused.with_untracked(|f| f.as_ref() == Some(handle)) {
        ctx.focused.set(None);
    }
}

#[component]
pub fn PlannerGrid() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let dnd = ctx.grid_dnd;

    Effect::new(move |_| dnd.set_locked(store.grid_locked().get()));

    bind_global_mouseup(dnd, move |outcome| handle_drop(ctx, store, outcome));
    bind_global_keydown(
        dnd,
        move || {
            let planner = ctx.planner(store.platform().get_untracked());
            let collection_id = planner.current()?;
            let focused = ctx.focused.get_untracked();
            let mode = dnd
                .session
                .with_untracked(|s| s.mode())
                .or_else(|| focused.as_ref().map(|h| mode_for(h, &store)))?;
            Some(KeyboardContext {
                focused,
                mode,
                order: planner.handles(&collection_id, mode),
                columns: planner.columns(),
            })
        },
        move |outcome| handle_drop(ctx, store, outcome),
    );

    let columns = move || ctx.planner(store.platform().get()).columns();
    let rows = move || {
        store.items_version().get();
        store.collections_version().get();
        // cards bind their drag mode when rendered
        store.swap_cards().get();
        let planner = ctx.planner(store.platform().get());
        let items = planner
            .current()
            .map(|cid| planner.items().items(&cid))
            .unwrap_or_default();
        let columns = planner.columns();
        items.chunks(columns).map(<[Item]>::to_vec).collect::<Vec<_>>()
    };

    let grid_style = move || format!("grid-template-columns: 2rem repeat({}, 1fr)", columns());

    view! {
        <div class="planner-grid" style=grid_style>
            <div class="grid-corner"></div>
            {move || (0..columns()).map(|col| view! {
                <GridHandleCell handle=GridHandle::Column(col) label="⋮⋮" />
            }).collect_view()}

            {move || rows().into_iter().enumerate().map(|(row, cards)| view! {
                <GridHandleCell handle=GridHandle::Row(row) label="⋮⋮" />
                {cards.into_iter().map(|item| view! { <GridCard item=item /> }).collect_view()}
            }).collect_view()}
        </div>

        <Show when=move || rows().is_empty()>
            <p class="grid-empty">"No items yet"</p>
        </Show>
    }
}

#[component]
fn GridHandleCell(handle: GridHandle, label: &'static str) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let dnd = ctx.grid_dnd;

    let mode = mode_for(&handle, &store);
    let class = {
        let handle = handle.clone();
        let base = match handle {
            GridHandle::Row(_) => "grid-handle row-handle",
            _ => "grid-handle column-handle",
        };
        move || {
            let mut c = String::from(base);
            if dnd.is_active(&handle) { c.push_str(" dragging"); }
            if dnd.is_over(&handle) { c.push_str(" drop-target"); }
            c
        }
    };
    let focus_handle = handle.clone();
    let blur_handle = handle.clone();

    view! {
        <div
            class=class
            tabindex="0"
            on:mousedown=make_on_mousedown(dnd, handle.clone(), mode)
            on:mouseenter=make_on_target_mouseenter(dnd, handle.clone())
            on:mouseleave=make_on_mouseleave(dnd)
            on:focus=move |_| ctx.focused.set(Some(focus_handle.clone()))
            on:focusout=move |_| release_focus(ctx, &blur_handle)
        >
            {label}
        </div>
    }
}

#[component]
fn GridCard(item: Item) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let dnd = ctx.grid_dnd;

    let handle = GridHandle::Item(item.id.clone());
    let class = {
        let handle = handle.clone();
        let id = item.id.clone();
        move || {
            let mut c = String::from("grid-card");
            if dnd.is_active(&handle) { c.push_str(" dragging"); }
            if dnd.is_over(&handle) { c.push_str(" drop-target"); }
            if ctx.editing_item.get().as_ref() == Some(&id) { c.push_str(" selected"); }
            if id.is_local() { c.push_str(" saving"); }
            c
        }
    };

    let open_id = item.id.clone();
    let on_click = move |_| {
        if dnd.drag_just_ended_read.get_untracked() {
            return;
        }
        ctx.editing_item.set(Some(open_id.clone()));
    };

    let delete_id = item.id.clone();
    let on_delete = move |_| {
        let id = delete_id.clone();
        if ctx.editing_item.get_untracked().as_ref() == Some(&id) {
            ctx.editing_item.set(None);
        }
        let planner = ctx.planner(store.platform().get_untracked());
        spawn_local(async move {
            planner.sync().delete_item(&id).await;
        });
    };

    let focus_handle = handle.clone();
    let blur_handle = handle.clone();
    let status_class = match item.status {
        ItemStatus::Draft => "card-status draft",
        ItemStatus::Scheduled => "card-status scheduled",
        ItemStatus::Published => "card-status published",
    };
    let scheduled = item.scheduled_at.map(|at| at.format("%b %d %H:%M").to_string());

    view! {
        <div
            class=class
            tabindex="0"
            on:mousedown=make_on_mousedown(dnd, handle.clone(), card_mode(&store))
            on:mouseenter=make_on_target_mouseenter(dnd, handle.clone())
            on:mouseleave=make_on_mouseleave(dnd)
            on:focus=move |_| ctx.focused.set(Some(focus_handle.clone()))
            on:focusout=move |_| release_focus(ctx, &blur_handle)
            on:click=on_click
        >
            {match item.thumbnail.clone() {
                Some(src) => view! { <img class="card-thumb" src=src draggable="false" /> }.into_any(),
                None => view! { <div class="card-thumb empty"></div> }.into_any(),
            }}
            <div class="card-footer">
                <span class="card-title">{item.title.clone()}</span>
                <span class=status_class>{item.status.as_str()}</span>
                {scheduled.map(|s| view! { <span class="card-scheduled">{s}</span> })}
                <DeleteConfirmButton button_class="card-delete-btn" on_confirm=on_delete />
            </div>
        </div>
    }
}
