//! Planner wiring: one store, one sync client and one directory per platform
//!
//! A drop is applied to the store synchronously and the resulting order is
//! returned; the caller then hands it to [`Planner::persist`], which is the
//! only place a reorder reaches the network.

use std::cell::Cell;
use std::rc::Rc;

use leptos_dragdrop::{DragMode, DropOutcome};

use crate::commands::PlannerApi;
use crate::directory::Directory;
use crate::error::DirectoryError;
use crate::models::{Item, ItemId, Platform};
use crate::notice::Notifier;
use crate::ordered::OrderedStore;
use crate::sync::{SyncClient, SyncOutcome};

/// Draggable things in the card grid
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GridHandle {
    Item(ItemId),
    Row(usize),
    Column(usize),
}

impl GridHandle {
    /// Whether this handle can take part in a drag of `mode`.
    pub fn fits(&self, mode: DragMode) -> bool {
        matches!(
            (self, mode),
            (GridHandle::Item(_), DragMode::List | DragMode::Grid)
                | (GridHandle::Row(_), DragMode::Rows)
                | (GridHandle::Column(_), DragMode::Columns)
        )
    }
}

pub struct Planner<A: PlannerApi> {
    platform: Platform,
    columns: Rc<Cell<usize>>,
    items: OrderedStore<Item>,
    sync: SyncClient<A>,
    directory: Directory<A>,
}

impl<A: PlannerApi> Clone for Planner<A> {
    fn clone(&self) -> Self {
        Self {
            platform: self.platform,
            columns: self.columns.clone(),
            items: self.items.clone(),
            sync: self.sync.clone(),
            directory: self.directory.clone(),
        }
    }
}

impl<A: PlannerApi + 'static> Planner<A> {
    pub fn new(api: Rc<A>, platform: Platform, notifier: Notifier) -> Self {
        let items = OrderedStore::new();
        Self {
            platform,
            columns: Rc::new(Cell::new(platform.default_columns())),
            sync: SyncClient::new(api.clone(), items.clone(), notifier.clone()),
            directory: Directory::new(api, notifier),
            items,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn columns(&self) -> usize {
        self.columns.get()
    }

    pub fn set_columns(&self, columns: usize) {
        self.columns.set(columns.max(1));
    }

    pub fn items(&self) -> &OrderedStore<Item> {
        &self.items
    }

    pub fn sync(&self) -> &SyncClient<A> {
        &self.sync
    }

    pub fn directory(&self) -> &Directory<A> {
        &self.directory
    }

    pub fn current(&self) -> Option<String> {
        self.directory.current()
    }

    /// Row count of a collection's grid
    pub fn rows(&self, collection_id: &str) -> usize {
        self.items.len(collection_id).div_ceil(self.columns())
    }

    pub fn index_of(&self, collection_id: &str, handle: &GridHandle) -> Option<usize> {
        match handle {
            GridHandle::Item(id) => self.items.index_of(collection_id, id),
            GridHandle::Row(row) => (*row < self.rows(collection_id)).then_some(*row),
            GridHandle::Column(col) => (*col < self.columns()).then_some(*col),
        }
    }

    /// Handles in display order for keyboard navigation in `mode`.
    pub fn handles(&self, collection_id: &str, mode: DragMode) -> Vec<GridHandle> {
        match mode {
            DragMode::List | DragMode::Grid => {
                self.items.ids(collection_id).into_iter().map(GridHandle::Item).collect()
            }
            DragMode::Rows => (0..self.rows(collection_id)).map(GridHandle::Row).collect(),
            DragMode::Columns => (0..self.columns()).map(GridHandle::Column).collect(),
        }
    }

    /// Apply a finished gesture to the store. Returns the new full order when
    /// the store changed; `None` means nothing should be persisted.
    pub fn apply_drop(
        &self,
        collection_id: &str,
        outcome: &DropOutcome<GridHandle>,
    ) -> Option<Vec<ItemId>> {
        let DropOutcome::Dropped { active, over, mode } = outcome else {
            return None;
        };
        if !active.fits(*mode) || !over.fits(*mode) {
            log::debug!("[DND] {:?} dropped on {:?} does not fit {:?}", active, over, mode);
            return None;
        }
        let op = outcome.resolve(|handle| self.index_of(collection_id, handle))?;
        if !self.items.apply(collection_id, op, self.columns()) {
            return None;
        }
        log::debug!("[DND] applied {:?} in {}", op, collection_id);
        Some(self.items.ids(collection_id))
    }

    pub async fn persist(&self, collection_id: &str, order: &[ItemId]) -> SyncOutcome {
        self.sync.persist_reorder(collection_id, order).await
    }

    /// Load collections, then the current collection's items.
    pub async fn load(&self) -> bool {
        if !self.directory.load().await {
            return false;
        }
        match self.current() {
            Some(cid) => self.sync.load_items(&cid).await,
            None => true,
        }
    }

    /// Switch the current collection and fetch its items.
    pub async fn select_collection(&self, collection_id: &str) -> bool {
        if !self.directory.select(collection_id) {
            return false;
        }
        self.sync.load_items(collection_id).await
    }

    /// Delete a collection and drop its cached items. When it was the current
    /// one, the replacement's items are fetched.
    pub async fn delete_collection(&self, collection_id: &str) -> Result<SyncOutcome, DirectoryError> {
        let was_current = self.current().as_deref() == Some(collection_id);
        let outcome = self.directory.delete_collection(collection_id).await?;
        self.items.remove_collection(collection_id);
        if was_current {
            if let Some(next) = self.current() {
                self.sync.load_items(&next).await;
            }
        }
        Ok(outcome)
    }
}
