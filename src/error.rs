//! Error types
//!
//! Remote failures are `ApiError`; they are caught where the call is made
//! and turned into notices. `DirectoryError` carries the few failures that
//! must block the user.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("At least one collection must exist")]
    LastCollection,

    #[error("Collection not found: {0}")]
    UnknownCollection(String),
}
