//! Collection/Folder Directory
//!
//! Folders are not stored anywhere: a folder is the set of collections
//! sharing a `folder` label, with `None` grouped under the root bucket.
//! Renaming or creating a folder therefore means writing collections.

use std::cell::RefCell;
use std::rc::Rc;

use crate::commands::PlannerApi;
use crate::config::PLACEHOLDER_COLLECTION_NAME;
use crate::error::DirectoryError;
use crate::models::{Collection, CollectionDraft, CollectionPatch};
use crate::notice::Notifier;
use crate::ordered::{move_index, renumber};
use crate::sync::SyncOutcome;

/// Sentinel key used for collections without a folder
pub const ROOT_FOLDER: &str = "root";

/// Grouping key of a folder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FolderKey {
    Root,
    Named(String),
}

impl FolderKey {
    /// Blank labels count as root.
    pub fn from_folder(folder: Option<&str>) -> Self {
        match folder.map(str::trim) {
            Some(name) if !name.is_empty() => FolderKey::Named(name.to_string()),
            _ => FolderKey::Root,
        }
    }

    pub fn of(collection: &Collection) -> Self {
        Self::from_folder(collection.folder.as_deref())
    }

    /// Value written into `Collection::folder`
    pub fn as_folder(&self) -> Option<String> {
        match self {
            FolderKey::Root => None,
            FolderKey::Named(name) => Some(name.clone()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FolderKey::Root => ROOT_FOLDER,
            FolderKey::Named(name) => name,
        }
    }
}

/// A derived folder with its members in position order
#[derive(Debug, Clone, PartialEq)]
pub struct FolderGroup {
    pub key: FolderKey,
    pub collections: Vec<Collection>,
}

/// Group collections by folder.
///
/// Root comes first when present, named folders follow in order of first
/// appearance. Members are stable-sorted by `position`.
pub fn list_folders(collections: &[Collection]) -> Vec<FolderGroup> {
    let mut groups: Vec<FolderGroup> = Vec::new();
    for collection in collections {
        let key = FolderKey::of(collection);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.collections.push(collection.clone()),
            None => groups.push(FolderGroup { key, collections: vec![collection.clone()] }),
        }
    }
    for group in &mut groups {
        group.collections.sort_by_key(|c| c.position);
    }
    if let Some(root) = groups.iter().position(|g| g.key == FolderKey::Root) {
        let root = groups.remove(root);
        groups.insert(0, root);
    }
    groups
}

/// Tally of a per-collection fan-out such as a folder rename
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub updated: usize,
    pub failed: usize,
}

/// Drop targets in the folder sidebar
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SidebarTarget {
    Collection(String),
    Folder(FolderKey),
}

type Listener = Rc<dyn Fn()>;

struct DirectoryInner<A: PlannerApi> {
    api: Rc<A>,
    notifier: Notifier,
    collections: RefCell<Vec<Collection>>,
    current: RefCell<Option<String>>,
    listeners: RefCell<Vec<Listener>>,
}

/// Collections, the current selection, and folder operations over them
pub struct Directory<A: PlannerApi> {
    inner: Rc<DirectoryInner<A>>,
}

impl<A: PlannerApi> Clone for Directory<A> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<A: PlannerApi + 'static> Directory<A> {
    pub fn new(api: Rc<A>, notifier: Notifier) -> Self {
        Self {
            inner: Rc::new(DirectoryInner {
                api,
                notifier,
                collections: RefCell::new(Vec::new()),
                current: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn subscribe(&self, f: impl Fn() + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(f));
    }

    fn changed(&self) {
        let listeners: Vec<Listener> = self.inner.listeners.borrow().clone();
        for f in listeners {
            f();
        }
    }

    fn edit(&self, f: impl FnOnce(&mut Vec<Collection>)) {
        f(&mut self.inner.collections.borrow_mut());
        self.changed();
    }

    fn patch_local(&self, id: &str, patch: &CollectionPatch) {
        self.edit(|all| {
            if let Some(c) = all.iter_mut().find(|c| c.id == id) {
                patch.apply_to(c);
            }
        });
    }

    // ---- reads ----

    pub fn collections(&self) -> Vec<Collection> {
        self.inner.collections.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<Collection> {
        self.inner.collections.borrow().iter().find(|c| c.id == id).cloned()
    }

    pub fn folders(&self) -> Vec<FolderGroup> {
        list_folders(&self.inner.collections.borrow())
    }

    pub fn current(&self) -> Option<String> {
        self.inner.current.borrow().clone()
    }

    /// Make `id` the current collection. Unknown ids are ignored.
    pub fn select(&self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        *self.inner.current.borrow_mut() = Some(id.to_string());
        self.changed();
        true
    }

    /// First collection in sidebar order
    fn first_in_order(&self) -> Option<String> {
        self.folders()
            .into_iter()
            .flat_map(|g| g.collections)
            .map(|c| c.id)
            .next()
    }

    fn ensure_current(&self) {
        let valid = self.current().is_some_and(|id| self.get(&id).is_some());
        if !valid {
            *self.inner.current.borrow_mut() = self.first_in_order();
        }
    }

    // ---- remote-backed operations ----

    /// `GET /collections`, replacing the local list.
    pub async fn load(&self) -> bool {
        match self.inner.api.list_collections().await {
            Ok(collections) => {
                log::debug!("[DIR] loaded {} collections", collections.len());
                *self.inner.collections.borrow_mut() = collections;
                self.ensure_current();
                self.changed();
                true
            }
            Err(e) => {
                log::error!("[DIR] load collections failed: {}", e);
                self.inner.notifier.error(format!("Could not load collections: {}", e));
                false
            }
        }
    }

    /// Create a collection through the API; it is only added locally once
    /// the server has issued its id. Blank names are ignored.
    pub async fn create_collection(&self, name: &str, folder: FolderKey) -> Option<Collection> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let draft = CollectionDraft {
            name: name.to_string(),
            folder: folder.as_folder(),
            ..Default::default()
        };
        match self.inner.api.create_collection(&draft).await {
            Ok(created) => {
                log::info!("[DIR] created collection {} in {}", created.id, folder.label());
                self.edit(|all| all.push(created.clone()));
                if self.current().is_none() {
                    self.select(&created.id);
                }
                Some(created)
            }
            Err(e) => {
                log::warn!("[DIR] create collection {:?} failed: {}", name, e);
                self.inner.notifier.warn(format!("Couldn't create collection: {}", e));
                None
            }
        }
    }

    /// A folder exists only through its members, so a new folder is a new
    /// placeholder collection labelled with it. Existing folders are a no-op.
    pub async fn create_folder(&self, name: &str) -> Option<Collection> {
        let key = FolderKey::from_folder(Some(name));
        if key == FolderKey::Root || self.folders().iter().any(|g| g.key == key) {
            return None;
        }
        self.create_collection(PLACEHOLDER_COLLECTION_NAME, key).await
    }

    /// Relabel every member of `old`. Each collection is updated separately;
    /// failures are counted, earlier successes stay.
    pub async fn rename_folder(&self, old: &str, new: &str) -> BatchReport {
        let old_key = FolderKey::from_folder(Some(old));
        let new_key = FolderKey::from_folder(Some(new));
        if old_key == FolderKey::Root || new_key == FolderKey::Root || old_key == new_key {
            return BatchReport::default();
        }
        let members: Vec<String> = self
            .inner
            .collections
            .borrow()
            .iter()
            .filter(|c| FolderKey::of(c) == old_key)
            .map(|c| c.id.clone())
            .collect();

        let patch = CollectionPatch { folder: Some(new_key.as_folder()), ..Default::default() };
        let mut report = BatchReport::default();
        for id in members {
            self.patch_local(&id, &patch);
            match self.inner.api.update_collection(&id, &patch).await {
                Ok(_) => report.updated += 1,
                Err(e) => {
                    log::warn!("[DIR] rename {} -> {} failed for {}: {}", old, new, id, e);
                    report.failed += 1;
                }
            }
        }
        if report.failed > 0 {
            self.inner.notifier.warn(format!(
                "Renamed {} of {} collections in \"{}\"",
                report.updated,
                report.updated + report.failed,
                old
            ));
        }
        report
    }

    /// Move one collection to the end of `target`. No-op if already there.
    pub async fn move_collection_to_folder(&self, id: &str, target: FolderKey) -> SyncOutcome {
        let Some(collection) = self.get(id) else {
            return SyncOutcome::Skipped;
        };
        if FolderKey::of(&collection) == target {
            return SyncOutcome::Skipped;
        }
        let position = self
            .inner
            .collections
            .borrow()
            .iter()
            .filter(|c| FolderKey::of(c) == target)
            .map(|c| c.position + 1)
            .max()
            .unwrap_or(0);
        let patch = CollectionPatch {
            folder: Some(target.as_folder()),
            position: Some(position),
            ..Default::default()
        };
        self.patch_local(id, &patch);
        self.push_patch(id, &patch).await
    }

    /// Sidebar list-reorder: place `id` at `over`'s slot within the same
    /// folder, or move it into `over`'s folder if they differ.
    pub async fn reorder_collection(&self, id: &str, over: &str) -> BatchReport {
        let (Some(active), Some(target)) = (self.get(id), self.get(over)) else {
            return BatchReport::default();
        };
        let folder = FolderKey::of(&target);
        if FolderKey::of(&active) != folder {
            let outcome = self.move_collection_to_folder(id, folder).await;
            return match outcome {
                SyncOutcome::Applied => BatchReport { updated: 1, failed: 0 },
                SyncOutcome::Failed => BatchReport { updated: 0, failed: 1 },
                _ => BatchReport::default(),
            };
        }

        let mut members = list_folders(&self.inner.collections.borrow())
            .into_iter()
            .find(|g| g.key == folder)
            .map(|g| g.collections)
            .unwrap_or_default();
        let from = members.iter().position(|c| c.id == id);
        let to = members.iter().position(|c| c.id == over);
        let (Some(from), Some(to)) = (from, to) else {
            return BatchReport::default();
        };
        let before: Vec<(String, i32)> = members.iter().map(|c| (c.id.clone(), c.position)).collect();
        if !move_index(&mut members, from, to) {
            return BatchReport::default();
        }
        renumber(&mut members);

        let changed: Vec<(String, i32)> = members
            .iter()
            .filter(|c| !before.contains(&(c.id.clone(), c.position)))
            .map(|c| (c.id.clone(), c.position))
            .collect();
        self.edit(|all| {
            for (cid, position) in &changed {
                if let Some(c) = all.iter_mut().find(|c| &c.id == cid) {
                    c.position = *position;
                }
            }
        });

        let mut report = BatchReport::default();
        for (cid, position) in changed {
            let patch = CollectionPatch { position: Some(position), ..Default::default() };
            match self.push_patch(&cid, &patch).await {
                SyncOutcome::Applied => report.updated += 1,
                _ => report.failed += 1,
            }
        }
        report
    }

    /// Apply a sidebar drop.
    pub async fn handle_drop(&self, active: &SidebarTarget, over: &SidebarTarget) {
        match (active, over) {
            (SidebarTarget::Collection(id), SidebarTarget::Folder(folder)) => {
                self.move_collection_to_folder(id, folder.clone()).await;
            }
            (SidebarTarget::Collection(id), SidebarTarget::Collection(over)) => {
                self.reorder_collection(id, over).await;
            }
            // folders are only renamed, never dragged into each other
            (SidebarTarget::Folder(_), _) => {}
        }
    }

    /// Delete a collection. The last one can never be deleted; that is
    /// reported before any network call.
    pub async fn delete_collection(&self, id: &str) -> Result<SyncOutcome, DirectoryError> {
        if self.get(id).is_none() {
            return Err(DirectoryError::UnknownCollection(id.to_string()));
        }
        if self.inner.collections.borrow().len() <= 1 {
            log::info!("[DIR] refused to delete last collection {}", id);
            return Err(DirectoryError::LastCollection);
        }

        self.edit(|all| all.retain(|c| c.id != id));
        if self.current().as_deref() == Some(id) {
            *self.inner.current.borrow_mut() = None;
            self.ensure_current();
            self.changed();
        }

        match self.inner.api.delete_collection(id).await {
            Ok(()) => Ok(SyncOutcome::Applied),
            Err(e) => {
                log::warn!("[DIR] delete collection {} failed: {}", id, e);
                self.inner.notifier.warn(format!("Couldn't delete collection: {}", e));
                Ok(SyncOutcome::Failed)
            }
        }
    }

    async fn push_patch(&self, id: &str, patch: &CollectionPatch) -> SyncOutcome {
        match self.inner.api.update_collection(id, patch).await {
            Ok(_) => SyncOutcome::Applied,
            Err(e) => {
                log::warn!("[DIR] update collection {} failed: {}", id, e);
                self.inner.notifier.warn(format!("Couldn't save collection: {}", e));
                SyncOutcome::Failed
            }
        }
    }
}
