//! Application configuration
//!
//! Named constants for timings and limits, plus the API endpoint settings.

use serde::Deserialize;

use crate::models::Platform;

// ===== Sync =====

/// Idle time before buffered title/description edits are sent, in milliseconds
pub const FIELD_SYNC_DEBOUNCE_MS: u32 = 800;

/// Default REST prefix; the platform segment is appended to it
pub const DEFAULT_API_BASE: &str = "/api";

// ===== Grid =====

/// Columns for the Instagram and TikTok grids
pub const DEFAULT_GRID_COLUMNS: usize = 3;

/// YouTube thumbnails are 16:9 and laid out wider
pub const YOUTUBE_GRID_COLUMNS: usize = 2;

// ===== UI =====

/// Notices kept in the banner stack; older ones are dropped
pub const MAX_NOTICES: usize = 5;

/// Browser localStorage key for the grid-lock preference
pub const GRID_LOCK_STORAGE_KEY: &str = "planner.gridLocked";

/// Name given to the collection that materializes a new folder
pub const PLACEHOLDER_COLLECTION_NAME: &str = "Untitled";

/// Console log verbosity
pub const LOG_LEVEL: log::LevelFilter = if cfg!(debug_assertions) {
    log::LevelFilter::Debug
} else {
    log::LevelFilter::Info
};

/// Where and for which platform the REST API is reached
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    pub base_url: String,
    pub platform: Platform,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            platform: Platform::default(),
        }
    }
}

impl ApiConfig {
    /// `{base_url}/{platform}` without a trailing slash
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.platform.path_segment())
    }
}
