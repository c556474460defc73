//! Browser-local UI preferences
//!
//! Only the grid lock is kept; it is never synced to the API.

use crate::config::GRID_LOCK_STORAGE_KEY;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Stored flag values are `"true"`/`"false"`; anything else reads as unset.
pub fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("true") | Some("1"))
}

pub fn load_grid_lock() -> bool {
    let raw = local_storage().and_then(|s| s.get_item(GRID_LOCK_STORAGE_KEY).ok().flatten());
    parse_flag(raw.as_deref())
}

pub fn save_grid_lock(locked: bool) {
    let Some(storage) = local_storage() else {
        log::warn!("[STORE] localStorage unavailable, grid lock not saved");
        return;
    };
    if let Err(e) = storage.set_item(GRID_LOCK_STORAGE_KEY, if locked { "true" } else { "false" }) {
        log::warn!("[STORE] saving grid lock failed: {:?}", e);
    }
}
