//! Reconciling Sync Client
//!
//! Turns local, already-applied mutations into remote calls. Local state is
//! never rolled back and nothing is retried: a failed write is logged, shown
//! as a notice, and lost until the next mutation sends full state again.
//!
//! Every reorder and update carries a sequence number per collection (or per
//! item). When a response arrives for anything but the latest call, it is
//! discarded so a slow stale call cannot overwrite newer state.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::commands::PlannerApi;
use crate::models::{Item, ItemDraft, ItemId, ItemPatch, NewItem};
use crate::notice::Notifier;
use crate::ordered::OrderedStore;

/// What happened to one fire-and-forget persistence call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Remote accepted the call and it was the latest one
    Applied,
    /// A newer call was issued before this one resolved; response ignored
    Superseded,
    /// Remote rejected the call; local state kept, notice raised
    Failed,
    /// Nothing to send (empty patch, unresolved placeholder, ...)
    Skipped,
}

#[derive(Default)]
struct SyncState {
    next_local_id: u64,
    /// local placeholder id -> server id
    id_map: HashMap<u64, String>,
    /// patches made to placeholders before their create resolved
    pending_patches: HashMap<u64, ItemPatch>,
    /// placeholders deleted before their create resolved
    deleted_locals: HashSet<u64>,
    reorder_seq: HashMap<String, u64>,
    update_seq: HashMap<String, u64>,
}

impl SyncState {
    fn bump(map: &mut HashMap<String, u64>, key: &str) -> u64 {
        let seq = map.entry(key.to_string()).or_insert(0);
        *seq += 1;
        *seq
    }

    fn is_latest(map: &HashMap<String, u64>, key: &str, seq: u64) -> bool {
        map.get(key).copied() == Some(seq)
    }
}

struct SyncInner<A: PlannerApi> {
    api: Rc<A>,
    items: OrderedStore<Item>,
    notifier: Notifier,
    state: RefCell<SyncState>,
}

/// Shared handle; clone it into spawned tasks
pub struct SyncClient<A: PlannerApi> {
    inner: Rc<SyncInner<A>>,
}

impl<A: PlannerApi> Clone for SyncClient<A> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<A: PlannerApi + 'static> SyncClient<A> {
    pub fn new(api: Rc<A>, items: OrderedStore<Item>, notifier: Notifier) -> Self {
        Self {
            inner: Rc::new(SyncInner {
                api,
                items,
                notifier,
                state: RefCell::new(SyncState::default()),
            }),
        }
    }

    pub fn items(&self) -> &OrderedStore<Item> {
        &self.inner.items
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// Server id for `id`, if it has one yet.
    pub fn resolve_id(&self, id: &ItemId) -> Option<String> {
        match id {
            ItemId::Remote(remote) => Some(remote.clone()),
            ItemId::Local(local) => self.inner.state.borrow().id_map.get(local).cloned(),
        }
    }

    /// Fetch a collection's items and replace the local list (last write wins).
    pub async fn load_items(&self, collection_id: &str) -> bool {
        match self.inner.api.list_items(collection_id).await {
            Ok(items) => {
                log::debug!("[SYNC] loaded {} items for {}", items.len(), collection_id);
                self.inner.items.set_items(collection_id, items);
                true
            }
            Err(e) => {
                log::error!("[SYNC] load items for {} failed: {}", collection_id, e);
                self.inner.notifier.error(format!("Could not load items: {}", e));
                false
            }
        }
    }

    /// Send the full order of a collection.
    ///
    /// Placeholder ids are translated through the id map; ones whose create
    /// has not resolved yet are left out.
    pub async fn persist_reorder(&self, collection_id: &str, ordered: &[ItemId]) -> SyncOutcome {
        let item_ids: Vec<String> = ordered.iter().filter_map(|id| self.resolve_id(id)).collect();
        if item_ids.is_empty() {
            log::debug!("[SYNC] reorder for {} has no server ids, skipped", collection_id);
            return SyncOutcome::Skipped;
        }
        if item_ids.len() < ordered.len() {
            log::debug!(
                "[SYNC] reorder for {} omits {} unsaved items",
                collection_id,
                ordered.len() - item_ids.len()
            );
        }

        let seq = SyncState::bump(&mut self.inner.state.borrow_mut().reorder_seq, collection_id);
        log::debug!("[SYNC] reorder #{} for {}: {:?}", seq, collection_id, item_ids);
        let result = self.inner.api.reorder_items(collection_id, &item_ids).await;

        let latest = SyncState::is_latest(&self.inner.state.borrow().reorder_seq, collection_id, seq);
        match result {
            Ok(()) if latest => SyncOutcome::Applied,
            Ok(()) => {
                log::debug!("[SYNC] reorder #{} for {} superseded", seq, collection_id);
                SyncOutcome::Superseded
            }
            Err(e) if latest => {
                log::warn!("[SYNC] reorder for {} failed: {}", collection_id, e);
                self.inner.notifier.warn(format!("Couldn't save the new order: {}", e));
                SyncOutcome::Failed
            }
            Err(e) => {
                log::debug!("[SYNC] superseded reorder #{} for {} failed: {}", seq, collection_id, e);
                SyncOutcome::Superseded
            }
        }
    }

    /// Create an item: show a placeholder now, swap in the server entry on
    /// success. Returns the server id.
    ///
    /// Exactly one entry remains per successful create, whether or not the
    /// placeholder is still around or a fetch already brought the item in.
    pub async fn create_item(&self, collection_id: &str, draft: ItemDraft) -> Option<ItemId> {
        let local = {
            let mut state = self.inner.state.borrow_mut();
            state.next_local_id += 1;
            state.next_local_id
        };
        let local_key = ItemId::Local(local);
        let position = self.inner.items.len(collection_id) as i32;
        self.inner
            .items
            .push(collection_id, Item::placeholder(local, collection_id, position, &draft));

        let request = NewItem::from_draft(&draft, collection_id, position);
        let created = match self.inner.api.create_item(&request).await {
            Ok(created) => created,
            Err(e) => {
                log::warn!("[SYNC] create in {} failed: {}", collection_id, e);
                self.withdraw_placeholder(local);
                self.inner.notifier.warn(format!("Couldn't create \"{}\": {}", draft.title, e));
                return None;
            }
        };

        let Some(server_id) = created.id.as_remote().map(str::to_string) else {
            log::error!("[SYNC] create in {} returned non-server id {}", collection_id, created.id);
            self.withdraw_placeholder(local);
            self.inner.notifier.error(format!("Couldn't create \"{}\": server sent no id", draft.title));
            return None;
        };
        let remote_key = ItemId::Remote(server_id.clone());

        let (pending, deleted) = {
            let mut state = self.inner.state.borrow_mut();
            state.id_map.insert(local, server_id.clone());
            (state.pending_patches.remove(&local), state.deleted_locals.remove(&local))
        };

        if deleted {
            log::debug!("[SYNC] placeholder {} deleted while saving, removing {}", local, server_id);
            self.delete_remote(&server_id).await;
            return None;
        }

        let items = &self.inner.items;
        if items.contains(&remote_key) {
            items.remove(&local_key);
        } else if !items.replace(&local_key, created.clone()) {
            items.push(collection_id, created);
        }
        log::debug!("[SYNC] {} -> {}", local_key, remote_key);

        if let Some(patch) = pending {
            self.update_item(&remote_key, patch).await;
        }
        Some(remote_key)
    }

    /// Drop a placeholder whose create will never resolve. It has no server
    /// identity, so unlike reorders and patches it cannot be kept and synced
    /// later; leaving it would show an item that does not exist.
    fn withdraw_placeholder(&self, local: u64) {
        self.inner.items.remove(&ItemId::Local(local));
        let mut state = self.inner.state.borrow_mut();
        state.pending_patches.remove(&local);
        state.deleted_locals.remove(&local);
    }

    /// Patch locally right away, then remotely. A failed remote patch is not
    /// reverted.
    pub async fn update_item(&self, id: &ItemId, patch: ItemPatch) -> SyncOutcome {
        if patch.is_empty() {
            return SyncOutcome::Skipped;
        }
        // an editor may still hold the placeholder id after the create resolved
        let resolved = self.resolve_id(id);
        let local_key = resolved.clone().map(ItemId::Remote).unwrap_or_else(|| id.clone());
        self.inner.items.update(&local_key, |item| patch.apply_to(item));

        let Some(remote) = resolved else {
            if let ItemId::Local(local) = id {
                log::debug!("[SYNC] queue patch for unsaved {}", id);
                self.inner
                    .state
                    .borrow_mut()
                    .pending_patches
                    .entry(*local)
                    .or_default()
                    .merge(patch);
            }
            return SyncOutcome::Skipped;
        };

        let seq = SyncState::bump(&mut self.inner.state.borrow_mut().update_seq, &remote);
        let result = self.inner.api.update_item(&remote, &patch).await;
        let latest = SyncState::is_latest(&self.inner.state.borrow().update_seq, &remote, seq);

        match result {
            Ok(server) if latest => {
                // fields from the server, order from us
                let key = ItemId::Remote(remote);
                self.inner.items.update(&key, |item| {
                    let position = item.position;
                    let collection_id = std::mem::take(&mut item.collection_id);
                    *item = Item { id: key.clone(), position, collection_id, ..server };
                });
                SyncOutcome::Applied
            }
            Ok(_) => SyncOutcome::Superseded,
            Err(e) if latest => {
                log::warn!("[SYNC] update of {} failed: {}", remote, e);
                self.inner.notifier.warn(format!("Couldn't save changes: {}", e));
                SyncOutcome::Failed
            }
            Err(e) => {
                log::debug!("[SYNC] superseded update of {} failed: {}", remote, e);
                SyncOutcome::Superseded
            }
        }
    }

    /// Remove locally first, then remotely.
    pub async fn delete_item(&self, id: &ItemId) -> SyncOutcome {
        match self.resolve_id(id) {
            Some(remote) => {
                self.inner.items.remove(&ItemId::Remote(remote.clone()));
                self.delete_remote(&remote).await
            }
            None => {
                self.inner.items.remove(id);
                if let ItemId::Local(local) = id {
                    let mut state = self.inner.state.borrow_mut();
                    state.pending_patches.remove(local);
                    state.deleted_locals.insert(*local);
                }
                SyncOutcome::Skipped
            }
        }
    }

    async fn delete_remote(&self, remote: &str) -> SyncOutcome {
        match self.inner.api.delete_item(remote).await {
            Ok(()) => SyncOutcome::Applied,
            Err(e) => {
                log::warn!("[SYNC] delete of {} failed: {}", remote, e);
                self.inner.notifier.warn(format!("Couldn't delete item: {}", e));
                SyncOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::mock::{Call, MockApi};
    use crate::models::ItemStatus;
    use crate::notice::Notice;

    fn make_item(id: &str, position: i32) -> Item {
        Item {
            id: ItemId::remote(id),
            collection_id: "main".to_string(),
            position,
            thumbnail: None,
            title: format!("Item {}", id),
            description: String::new(),
            status: ItemStatus::Draft,
            scheduled_at: None,
        }
    }

    fn setup(ids: &[&str]) -> (SyncClient<MockApi>, Rc<MockApi>, Rc<RefCell<Vec<Notice>>>) {
        let items: Vec<Item> = ids.iter().enumerate().map(|(i, id)| make_item(id, i as i32)).collect();
        let api = Rc::new(MockApi::new());
        api.seed_items(items.clone());
        let store = OrderedStore::new();
        store.set_items("main", items);
        let (notifier, notices) = Notifier::collecting();
        (SyncClient::new(api.clone(), store, notifier), api, notices)
    }

    fn draft(title: &str) -> ItemDraft {
        ItemDraft { title: title.to_string(), ..Default::default() }
    }

    #[tokio::test]
    async fn test_persist_reorder_sends_full_list() {
        let (sync, api, _) = setup(&["1", "2", "3"]);
        let order = vec![ItemId::remote("3"), ItemId::remote("1"), ItemId::remote("2")];
        assert_eq!(sync.persist_reorder("main", &order).await, SyncOutcome::Applied);
        assert_eq!(api.reorder_calls(), vec![("main".to_string(), vec!["3".into(), "1".into(), "2".into()])]);
    }

    #[tokio::test]
    async fn test_reorder_failure_keeps_local_order() {
        let (sync, api, notices) = setup(&["1", "2", "3"]);
        api.fail("reorder_items");
        sync.items().move_item("main", 2, 0);
        let order = sync.items().ids("main");
        assert_eq!(sync.persist_reorder("main", &order).await, SyncOutcome::Failed);
        assert_eq!(sync.items().ids("main"), order);
        assert_eq!(notices.borrow().len(), 1);
        // no retry
        assert_eq!(api.reorder_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_reorder_response_is_superseded() {
        let (sync, api, notices) = setup(&["1", "2"]);
        api.hold("reorder_items");
        let first = vec![ItemId::remote("2"), ItemId::remote("1")];
        let second = vec![ItemId::remote("1"), ItemId::remote("2")];

        let (a, b, ()) = tokio::join!(
            sync.persist_reorder("main", &first),
            sync.persist_reorder("main", &second),
            async {
                while api.held_count() < 2 {
                    tokio::task::yield_now().await;
                }
                // newest resolves first, the stale one arrives late
                api.release(1);
                api.release(0);
            }
        );
        assert_eq!(a, SyncOutcome::Superseded);
        assert_eq!(b, SyncOutcome::Applied);
        assert!(notices.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_stale_failure_raises_no_notice() {
        let (sync, api, notices) = setup(&["1", "2"]);
        api.hold("reorder_items");
        api.fail("reorder_items");
        let order = vec![ItemId::remote("2"), ItemId::remote("1")];
        let (a, b, ()) = tokio::join!(
            sync.persist_reorder("main", &order),
            sync.persist_reorder("main", &order),
            async {
                while api.held_count() < 2 {
                    tokio::task::yield_now().await;
                }
                api.release(0);
                api.release(1);
            }
        );
        assert_eq!(a, SyncOutcome::Superseded);
        assert_eq!(b, SyncOutcome::Failed);
        assert_eq!(notices.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_create_replaces_placeholder() {
        let (sync, api, _) = setup(&["1"]);
        api.hold("create_item");

        let (created, ()) = tokio::join!(sync.create_item("main", draft("New video")), async {
            while api.held_count() < 1 {
                tokio::task::yield_now().await;
            }
            // placeholder rendered before the server answers
            let ids = sync.items().ids("main");
            assert_eq!(ids.len(), 2);
            assert!(ids[1].is_local());
            api.release(0);
        });

        let created = created.unwrap();
        assert_eq!(created, ItemId::remote("srv-1"));
        let items = sync.items().items("main");
        assert_eq!(items.len(), 2);
        assert_eq!(items.iter().filter(|i| i.id == created).count(), 1);
        assert!(items.iter().all(|i| !i.id.is_local()));
        assert_eq!(items[1].title, "New video");
        assert_eq!(items[1].position, 1);
    }

    #[tokio::test]
    async fn test_create_does_not_duplicate_after_refetch() {
        let (sync, api, _) = setup(&["1"]);
        api.hold("create_item");

        let (created, ()) = tokio::join!(sync.create_item("main", draft("Dup")), async {
            while api.held_count() < 1 {
                tokio::task::yield_now().await;
            }
            // a fetch merged the server copy in while the placeholder is still shown
            sync.items().push("main", make_item("srv-1", 0));
            assert_eq!(sync.items().len("main"), 3);
            api.release(0);
        });

        let created = created.unwrap();
        let items = sync.items().items("main");
        assert_eq!(items.len(), 2);
        assert_eq!(items.iter().filter(|i| i.id == created).count(), 1);
        assert!(items.iter().all(|i| !i.id.is_local()));
    }

    #[tokio::test]
    async fn test_create_after_placeholder_dropped_by_refetch() {
        let (sync, api, _) = setup(&["1"]);
        api.hold("create_item");

        let (created, ()) = tokio::join!(sync.create_item("main", draft("Late")), async {
            while api.held_count() < 1 {
                tokio::task::yield_now().await;
            }
            // full replacement from a fetch that predates the create
            sync.items().set_items("main", vec![make_item("1", 0)]);
            api.release(0);
        });

        let created = created.unwrap();
        assert_eq!(sync.items().ids("main"), vec![ItemId::remote("1"), created]);
    }

    #[tokio::test]
    async fn test_create_failure_withdraws_placeholder() {
        let (sync, api, notices) = setup(&["1"]);
        api.fail("create_item");
        assert_eq!(sync.create_item("main", draft("Nope")).await, None);
        assert_eq!(sync.items().ids("main"), vec![ItemId::remote("1")]);
        assert_eq!(notices.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_create_without_server_id_withdraws_placeholder() {
        let (sync, api, notices) = setup(&["1"]);
        api.answer_creates_with(ItemId::Local(99));
        assert_eq!(sync.create_item("main", draft("Ghost")).await, None);
        assert_eq!(sync.items().ids("main"), vec![ItemId::remote("1")]);
        assert!(sync.items().ids("main").iter().all(|id| !id.is_local()));
        assert_eq!(notices.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_patch_on_placeholder_is_replayed() {
        let (sync, api, _) = setup(&[]);
        api.hold("create_item");

        let (created, outcome) = tokio::join!(sync.create_item("main", draft("Draft")), async {
            while api.held_count() < 1 {
                tokio::task::yield_now().await;
            }
            let local = sync.items().ids("main")[0].clone();
            let outcome = sync.update_item(&local, ItemPatch::description("typed early")).await;
            assert_eq!(sync.items().items("main")[0].description, "typed early");
            api.release(0);
            outcome
        });
        assert_eq!(outcome, SyncOutcome::Skipped);

        let created = created.unwrap();
        assert!(api.calls().contains(&Call::UpdateItem(
            created.to_string(),
            ItemPatch::description("typed early")
        )));
        assert_eq!(sync.items().items("main")[0].description, "typed early");
    }

    #[tokio::test]
    async fn test_delete_placeholder_before_create_resolves() {
        let (sync, api, _) = setup(&[]);
        api.hold("create_item");

        let (created, ()) = tokio::join!(sync.create_item("main", draft("Gone")), async {
            while api.held_count() < 1 {
                tokio::task::yield_now().await;
            }
            let local = sync.items().ids("main")[0].clone();
            assert_eq!(sync.delete_item(&local).await, SyncOutcome::Skipped);
            api.release(0);
        });
        assert_eq!(created, None);
        assert_eq!(sync.items().len("main"), 0);
        assert!(api.calls().contains(&Call::DeleteItem("srv-1".to_string())));
    }

    #[tokio::test]
    async fn test_update_is_optimistic_and_not_reverted() {
        let (sync, api, notices) = setup(&["1", "2"]);
        api.fail("update_item");
        let id = ItemId::remote("2");
        let outcome = sync.update_item(&id, ItemPatch::title("Renamed")).await;
        assert_eq!(outcome, SyncOutcome::Failed);
        assert_eq!(sync.items().get("main", &id).unwrap().title, "Renamed");
        assert_eq!(notices.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_local_position() {
        let (sync, _api, _) = setup(&["1", "2", "3"]);
        // local reorder not yet known to the server
        sync.items().move_item("main", 0, 2);
        let id = ItemId::remote("1");
        let outcome = sync
            .update_item(&id, ItemPatch { status: Some(ItemStatus::Published), ..Default::default() })
            .await;
        assert_eq!(outcome, SyncOutcome::Applied);
        let item = sync.items().get("main", &id).unwrap();
        assert_eq!(item.status, ItemStatus::Published);
        assert_eq!(item.position, 2);
    }

    #[tokio::test]
    async fn test_empty_patch_is_skipped() {
        let (sync, api, _) = setup(&["1"]);
        let outcome = sync.update_item(&ItemId::remote("1"), ItemPatch::default()).await;
        assert_eq!(outcome, SyncOutcome::Skipped);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_local_first() {
        let (sync, api, notices) = setup(&["1", "2", "3"]);
        api.fail("delete_item");
        let outcome = sync.delete_item(&ItemId::remote("2")).await;
        assert_eq!(outcome, SyncOutcome::Failed);
        assert_eq!(sync.items().ids("main"), vec![ItemId::remote("1"), ItemId::remote("3")]);
        assert_eq!(sync.items().items("main")[1].position, 1);
        assert_eq!(notices.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_reorder_translates_and_skips_placeholders() {
        let (sync, _api, _) = setup(&["1"]);
        sync.inner.state.borrow_mut().id_map.insert(5, "srv-5".to_string());
        let order = vec![ItemId::Local(6), ItemId::Local(5), ItemId::remote("1")];
        sync.persist_reorder("main", &order).await;
        assert_eq!(
            sync.api().reorder_calls(),
            vec![("main".to_string(), vec!["srv-5".to_string(), "1".to_string()])]
        );

        let only_local = vec![ItemId::Local(6)];
        assert_eq!(sync.persist_reorder("main", &only_local).await, SyncOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_stale_placeholder_id_targets_server_entry() {
        let (sync, api, _) = setup(&[]);
        let created = sync.create_item("main", draft("Intro")).await.unwrap();
        assert_eq!(created, ItemId::remote("srv-1"));

        // an editor opened on the placeholder still uses local-1
        let outcome = sync.update_item(&ItemId::Local(1), ItemPatch::title("Intro v2")).await;
        assert_eq!(outcome, SyncOutcome::Applied);
        assert_eq!(sync.items().items("main")[0].title, "Intro v2");
        assert!(api.calls().contains(&Call::UpdateItem("srv-1".to_string(), ItemPatch::title("Intro v2"))));

        sync.delete_item(&ItemId::Local(1)).await;
        assert_eq!(sync.items().len("main"), 0);
        assert!(api.calls().contains(&Call::DeleteItem("srv-1".to_string())));
    }
}
