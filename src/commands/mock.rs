//! In-memory [`PlannerApi`] for tests
//!
//! Records every call, can fail chosen operations, and can hold responses
//! back so tests control the order in which in-flight calls resolve.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::PlannerApi;
use crate::error::{ApiError, ApiResult};
use crate::models::{Collection, CollectionDraft, CollectionPatch, Item, ItemId, ItemPatch, NewItem};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListCollections,
    CreateCollection(CollectionDraft),
    UpdateCollection(String, CollectionPatch),
    DeleteCollection(String),
    ListItems(String),
    CreateItem { collection_id: String, title: String, position: i32 },
    UpdateItem(String, ItemPatch),
    DeleteItem(String),
    Reorder(String, Vec<String>),
}

#[derive(Default)]
pub struct MockApi {
    calls: RefCell<Vec<Call>>,
    collections: RefCell<Vec<Collection>>,
    items: RefCell<HashMap<String, Item>>,
    next_id: Cell<u32>,
    failing: RefCell<HashSet<&'static str>>,
    failing_ids: RefCell<HashSet<(&'static str, String)>>,
    held_ops: RefCell<HashSet<&'static str>>,
    held: RefCell<Vec<Option<oneshot::Sender<()>>>>,
    create_id: RefCell<Option<ItemId>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collections(collections: Vec<Collection>) -> Self {
        let api = Self::new();
        *api.collections.borrow_mut() = collections;
        api
    }

    pub fn seed_items(&self, items: Vec<Item>) {
        let mut stored = self.items.borrow_mut();
        for item in items {
            stored.insert(item.id.to_string(), item);
        }
    }

    /// Answer every create with `id` instead of a fresh server id
    pub fn answer_creates_with(&self, id: ItemId) {
        *self.create_id.borrow_mut() = Some(id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn reorder_calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Reorder(cid, ids) => Some((cid.clone(), ids.clone())),
                _ => None,
            })
            .collect()
    }

    /// Every call to `op` fails
    pub fn fail(&self, op: &'static str) {
        self.failing.borrow_mut().insert(op);
    }

    /// Calls to `op` for this id fail
    pub fn fail_for(&self, op: &'static str, id: &str) {
        self.failing_ids.borrow_mut().insert((op, id.to_string()));
    }

    pub fn recover(&self) {
        self.failing.borrow_mut().clear();
        self.failing_ids.borrow_mut().clear();
    }

    /// Calls to `op` wait until released with [`MockApi::release`]
    pub fn hold(&self, op: &'static str) {
        self.held_ops.borrow_mut().insert(op);
    }

    /// Number of calls that reached the gate so far
    pub fn held_count(&self) -> usize {
        self.held.borrow().len()
    }

    /// Let the `index`-th held call continue
    pub fn release(&self, index: usize) {
        if let Some(tx) = self.held.borrow_mut().get_mut(index).and_then(Option::take) {
            let _ = tx.send(());
        }
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        format!("{}-{}", prefix, n)
    }

    async fn gate(&self, op: &'static str, id: &str) -> ApiResult<()> {
        if self.held_ops.borrow().contains(op) {
            let (tx, rx) = oneshot::channel();
            self.held.borrow_mut().push(Some(tx));
            let _ = rx.await;
        }
        let failing = self.failing.borrow().contains(op)
            || self.failing_ids.borrow().contains(&(op, id.to_string()));
        if failing {
            return Err(ApiError::Status { status: 500, body: format!("{} failed for {}", op, id) });
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl PlannerApi for MockApi {
    async fn list_collections(&self) -> ApiResult<Vec<Collection>> {
        self.record(Call::ListCollections);
        self.gate("list_collections", "").await?;
        Ok(self.collections.borrow().clone())
    }

    async fn create_collection(&self, draft: &CollectionDraft) -> ApiResult<Collection> {
        self.record(Call::CreateCollection(draft.clone()));
        self.gate("create_collection", &draft.name).await?;
        let collection = Collection {
            id: self.next_id("col"),
            name: draft.name.clone(),
            folder: draft.folder.clone(),
            color: draft.color.clone(),
            position: self.collections.borrow().len() as i32,
            tags: draft.tags.clone(),
            link: None,
        };
        self.collections.borrow_mut().push(collection.clone());
        Ok(collection)
    }

    async fn update_collection(&self, id: &str, patch: &CollectionPatch) -> ApiResult<Collection> {
        self.record(Call::UpdateCollection(id.to_string(), patch.clone()));
        self.gate("update_collection", id).await?;
        let mut collections = self.collections.borrow_mut();
        let collection = collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::Status { status: 404, body: id.to_string() })?;
        patch.apply_to(collection);
        Ok(collection.clone())
    }

    async fn delete_collection(&self, id: &str) -> ApiResult<()> {
        self.record(Call::DeleteCollection(id.to_string()));
        self.gate("delete_collection", id).await?;
        self.collections.borrow_mut().retain(|c| c.id != id);
        Ok(())
    }

    async fn list_items(&self, collection_id: &str) -> ApiResult<Vec<Item>> {
        self.record(Call::ListItems(collection_id.to_string()));
        self.gate("list_items", collection_id).await?;
        let mut items: Vec<Item> = self
            .items
            .borrow()
            .values()
            .filter(|i| i.collection_id == collection_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.position);
        Ok(items)
    }

    async fn create_item(&self, item: &NewItem<'_>) -> ApiResult<Item> {
        self.record(Call::CreateItem {
            collection_id: item.collection_id.to_string(),
            title: item.title.to_string(),
            position: item.position,
        });
        self.gate("create_item", item.title).await?;
        let id = match self.create_id.borrow().clone() {
            Some(id) => id,
            None => ItemId::remote(self.next_id("srv")),
        };
        let created = Item {
            id,
            collection_id: item.collection_id.to_string(),
            position: item.position,
            thumbnail: item.thumbnail.map(str::to_string),
            title: item.title.to_string(),
            description: item.description.to_string(),
            status: item.status,
            scheduled_at: item.scheduled_at,
        };
        self.items.borrow_mut().insert(created.id.to_string(), created.clone());
        Ok(created)
    }

    async fn update_item(&self, id: &str, patch: &ItemPatch) -> ApiResult<Item> {
        self.record(Call::UpdateItem(id.to_string(), patch.clone()));
        self.gate("update_item", id).await?;
        let mut items = self.items.borrow_mut();
        let item = items
            .get_mut(id)
            .ok_or_else(|| ApiError::Status { status: 404, body: id.to_string() })?;
        patch.apply_to(item);
        Ok(item.clone())
    }

    async fn delete_item(&self, id: &str) -> ApiResult<()> {
        self.record(Call::DeleteItem(id.to_string()));
        self.gate("delete_item", id).await?;
        self.items.borrow_mut().remove(id);
        Ok(())
    }

    async fn reorder_items(&self, collection_id: &str, item_ids: &[String]) -> ApiResult<()> {
        self.record(Call::Reorder(collection_id.to_string(), item_ids.to_vec()));
        self.gate("reorder_items", collection_id).await?;
        let mut items = self.items.borrow_mut();
        for (position, id) in item_ids.iter().enumerate() {
            if let Some(item) = items.get_mut(id) {
                item.position = position as i32;
            }
        }
        Ok(())
    }
}
