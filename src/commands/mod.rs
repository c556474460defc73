//! Remote API Bindings
//!
//! The planner REST API, behind a trait so the sync layer can be driven by
//! the real HTTP client in the browser and by an in-memory mock in tests.

mod rest;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{Collection, CollectionDraft, CollectionPatch, Item, ItemPatch, NewItem};

pub use rest::RestApi;

/// The collection/item REST collaborator
///
/// Futures are `?Send`: everything runs on the browser's event loop.
#[async_trait(?Send)]
pub trait PlannerApi {
    /// `GET /collections`
    async fn list_collections(&self) -> ApiResult<Vec<Collection>>;

    /// `POST /collections`
    async fn create_collection(&self, draft: &CollectionDraft) -> ApiResult<Collection>;

    /// `PATCH /collections/:id`
    async fn update_collection(&self, id: &str, patch: &CollectionPatch) -> ApiResult<Collection>;

    /// `DELETE /collections/:id`
    async fn delete_collection(&self, id: &str) -> ApiResult<()>;

    /// `GET /collections/:id/items`, in display order
    async fn list_items(&self, collection_id: &str) -> ApiResult<Vec<Item>>;

    /// `POST /items`
    async fn create_item(&self, item: &NewItem<'_>) -> ApiResult<Item>;

    /// `PATCH /items/:id`
    async fn update_item(&self, id: &str, patch: &ItemPatch) -> ApiResult<Item>;

    /// `DELETE /items/:id`
    async fn delete_item(&self, id: &str) -> ApiResult<()>;

    /// `POST /collections/:id/reorder`; idempotent
    async fn reorder_items(&self, collection_id: &str, item_ids: &[String]) -> ApiResult<()>;
}
