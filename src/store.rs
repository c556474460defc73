//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The ordered item
//! lists live in [`crate::ordered::OrderedStore`]; this store only carries UI
//! state plus version counters that the store subscribers bump so views
//! re-read.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::config::MAX_NOTICES;
use crate::models::Platform;
use crate::notice::Notice;

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Platform whose planner is shown
    pub platform: Platform,
    /// Dismissible notices, newest last
    pub notices: Vec<Notice>,
    /// Grid lock preference (drags refused while set)
    pub grid_locked: bool,
    /// Card drops swap instead of move
    pub swap_cards: bool,
    /// Incremented whenever the ordered item store notifies
    pub items_version: u32,
    /// Incremented whenever the directory notifies
    pub collections_version: u32,
    /// Blocking message for structural violations, cleared by the user
    pub blocking_message: Option<String>,
}

impl AppState {
    pub fn new(platform: Platform, grid_locked: bool) -> Self {
        Self {
            platform,
            grid_locked,
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Append a notice, keeping only the most recent ones
pub fn store_push_notice(store: &AppStore, notice: Notice) {
    push_bounded(&mut store.notices().write(), notice);
}

/// Remove a notice by ID
pub fn store_dismiss_notice(store: &AppStore, notice_id: u64) {
    store.notices().write().retain(|n| n.id != notice_id);
}

pub fn store_bump_items(store: &AppStore) {
    *store.items_version().write() += 1;
}

pub fn store_bump_collections(store: &AppStore) {
    *store.collections_version().write() += 1;
}

pub fn store_block(store: &AppStore, message: String) {
    *store.blocking_message().write() = Some(message);
}

fn push_bounded(notices: &mut Vec<Notice>, notice: Notice) {
    notices.push(notice);
    if notices.len() > MAX_NOTICES {
        let overflow = notices.len() - MAX_NOTICES;
        notices.drain(..overflow);
    }
}
