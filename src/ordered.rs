//! Ordered Collection Store
//!
//! In-memory ordered lists, one per collection id, shared by every planner
//! view. This is the single source of truth the grid renders from.
//!
//! After every mutation the `position` of each entry equals its index in the
//! list, and subscribers are called synchronously with the collection id.
//! Out-of-range indices and self-moves are no-ops that report `false`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use leptos_dragdrop::ReorderOp;

use crate::models::{Collection, Item, ItemId};

/// Anything that lives at a dense position inside an ordered list
pub trait OrderedEntity: Clone + 'static {
    type Key: Clone + Eq + Hash + Debug;

    fn key(&self) -> Self::Key;
    fn position(&self) -> i32;
    fn set_position(&mut self, position: i32);
}

impl OrderedEntity for Item {
    type Key = ItemId;

    fn key(&self) -> ItemId {
        self.id.clone()
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

impl OrderedEntity for Collection {
    type Key = String;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

// ========================
// Vec primitives
// ========================

/// Remove at `from` and reinsert at `to` (splice semantics, not a swap).
pub fn move_index<T>(list: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= list.len() || to >= list.len() {
        return false;
    }
    let entry = list.remove(from);
    list.insert(to, entry);
    true
}

/// Exchange exactly two entries.
pub fn swap_index<T>(list: &mut [T], a: usize, b: usize) -> bool {
    if a == b || a >= list.len() || b >= list.len() {
        return false;
    }
    list.swap(a, b);
    true
}

/// Swap two grid rows element-wise, skipping pairs that fall off the end.
pub fn swap_rows<T>(list: &mut [T], row_a: usize, row_b: usize, columns: usize) -> bool {
    if row_a == row_b || columns == 0 {
        return false;
    }
    let rows = list.len().div_ceil(columns);
    if row_a >= rows || row_b >= rows {
        return false;
    }
    let mut changed = false;
    for c in 0..columns {
        changed |= swap_index(list, row_a * columns + c, row_b * columns + c);
    }
    changed
}

/// Swap two grid columns element-wise over `ceil(n / columns)` rows.
pub fn swap_columns<T>(list: &mut [T], col_a: usize, col_b: usize, columns: usize) -> bool {
    if col_a == col_b || col_a >= columns || col_b >= columns {
        return false;
    }
    let rows = list.len().div_ceil(columns);
    let mut changed = false;
    for r in 0..rows {
        changed |= swap_index(list, r * columns + col_a, r * columns + col_b);
    }
    changed
}

/// Apply a drop-derived op to a plain list.
pub fn apply_op<T>(list: &mut Vec<T>, op: ReorderOp, columns: usize) -> bool {
    match op {
        ReorderOp::Move { from, to } => move_index(list, from, to),
        ReorderOp::Swap { a, b } => swap_index(list, a, b),
        ReorderOp::SwapRows { a, b } => swap_rows(list, a, b, columns),
        ReorderOp::SwapColumns { a, b } => swap_columns(list, a, b, columns),
    }
}

/// Rewrite positions to match list order.
pub fn renumber<T: OrderedEntity>(list: &mut [T]) {
    for (index, entry) in list.iter_mut().enumerate() {
        entry.set_position(index as i32);
    }
}

// ========================
// Store
// ========================

pub type SubscriberId = u64;

type Subscriber = Rc<dyn Fn(&str)>;

struct StoreInner<T: OrderedEntity> {
    lists: RefCell<HashMap<String, Vec<T>>>,
    subscribers: RefCell<Vec<(SubscriberId, Subscriber)>>,
    next_subscriber: Cell<SubscriberId>,
}

/// Shared handle to the ordered lists; clones see the same data
pub struct OrderedStore<T: OrderedEntity> {
    inner: Rc<StoreInner<T>>,
}

impl<T: OrderedEntity> Clone for OrderedStore<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: OrderedEntity> Default for OrderedStore<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(StoreInner {
                lists: RefCell::new(HashMap::new()),
                subscribers: RefCell::new(Vec::new()),
                next_subscriber: Cell::new(1),
            }),
        }
    }
}

impl<T: OrderedEntity> OrderedStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change callback, called with the collection id.
    pub fn subscribe(&self, f: impl Fn(&str) + 'static) -> SubscriberId {
        let id = self.inner.next_subscriber.get();
        self.inner.next_subscriber.set(id + 1);
        self.inner.subscribers.borrow_mut().push((id, Rc::new(f)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.inner.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
    }

    fn notify(&self, collection_id: &str) {
        // Snapshot so callbacks may (un)subscribe or read the store
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        for f in subscribers {
            f(collection_id);
        }
    }

    /// Run `f` on one list; renumber and notify if it reports a change.
    fn mutate(&self, collection_id: &str, f: impl FnOnce(&mut Vec<T>) -> bool) -> bool {
        let changed = {
            let mut lists = self.inner.lists.borrow_mut();
            match lists.get_mut(collection_id) {
                Some(list) => {
                    let changed = f(list);
                    if changed {
                        renumber(list);
                    }
                    changed
                }
                None => false,
            }
        };
        if changed {
            self.notify(collection_id);
        }
        changed
    }

    // ---- reads ----

    pub fn items(&self, collection_id: &str) -> Vec<T> {
        self.with_items(collection_id, |list| list.to_vec())
    }

    pub fn with_items<R>(&self, collection_id: &str, f: impl FnOnce(&[T]) -> R) -> R {
        let lists = self.inner.lists.borrow();
        f(lists.get(collection_id).map(Vec::as_slice).unwrap_or(&[]))
    }

    pub fn len(&self, collection_id: &str) -> usize {
        self.with_items(collection_id, |list| list.len())
    }

    pub fn ids(&self, collection_id: &str) -> Vec<T::Key> {
        self.with_items(collection_id, |list| list.iter().map(T::key).collect())
    }

    pub fn index_of(&self, collection_id: &str, key: &T::Key) -> Option<usize> {
        self.with_items(collection_id, |list| list.iter().position(|e| e.key() == *key))
    }

    pub fn get(&self, collection_id: &str, key: &T::Key) -> Option<T> {
        self.with_items(collection_id, |list| list.iter().find(|e| e.key() == *key).cloned())
    }

    /// Collection id holding `key`, searching every list.
    pub fn locate(&self, key: &T::Key) -> Option<String> {
        self.inner
            .lists
            .borrow()
            .iter()
            .find(|(_, list)| list.iter().any(|e| e.key() == *key))
            .map(|(cid, _)| cid.clone())
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.locate(key).is_some()
    }

    // ---- whole-list writes ----

    /// Replace a collection's list. The given order is authoritative;
    /// positions are rewritten to match it.
    pub fn set_items(&self, collection_id: &str, mut items: Vec<T>) {
        renumber(&mut items);
        log::debug!("[STORE] set {} entries for {}", items.len(), collection_id);
        self.inner
            .lists
            .borrow_mut()
            .insert(collection_id.to_string(), items);
        self.notify(collection_id);
    }

    pub fn remove_collection(&self, collection_id: &str) -> bool {
        let removed = self.inner.lists.borrow_mut().remove(collection_id).is_some();
        if removed {
            self.notify(collection_id);
        }
        removed
    }

    // ---- entry writes ----

    /// Insert at `index`, clamped to the end of the list.
    pub fn insert(&self, collection_id: &str, index: usize, entry: T) {
        self.inner
            .lists
            .borrow_mut()
            .entry(collection_id.to_string())
            .or_default();
        self.mutate(collection_id, |list| {
            let index = index.min(list.len());
            list.insert(index, entry);
            true
        });
    }

    pub fn push(&self, collection_id: &str, entry: T) {
        self.insert(collection_id, usize::MAX, entry);
    }

    /// Remove by key from whichever list holds it.
    pub fn remove(&self, key: &T::Key) -> Option<(String, T)> {
        let collection_id = self.locate(key)?;
        let mut removed = None;
        self.mutate(&collection_id, |list| {
            match list.iter().position(|e| e.key() == *key) {
                Some(index) => {
                    removed = Some(list.remove(index));
                    true
                }
                None => false,
            }
        });
        removed.map(|entry| (collection_id, entry))
    }

    /// Swap the entry stored under `key` for `entry`, keeping its slot.
    pub fn replace(&self, key: &T::Key, entry: T) -> bool {
        let Some(collection_id) = self.locate(key) else {
            return false;
        };
        self.mutate(&collection_id, |list| {
            match list.iter_mut().find(|e| e.key() == *key) {
                Some(slot) => {
                    *slot = entry;
                    true
                }
                None => false,
            }
        })
    }

    /// Edit one entry in place. Its position is restored afterwards.
    pub fn update(&self, key: &T::Key, f: impl FnOnce(&mut T)) -> bool {
        let Some(collection_id) = self.locate(key) else {
            return false;
        };
        self.mutate(&collection_id, |list| {
            match list.iter_mut().find(|e| e.key() == *key) {
                Some(entry) => {
                    f(entry);
                    true
                }
                None => false,
            }
        })
    }

    // ---- reordering ----

    pub fn move_item(&self, collection_id: &str, from: usize, to: usize) -> bool {
        self.mutate(collection_id, |list| move_index(list, from, to))
    }

    pub fn swap_items(&self, collection_id: &str, a: usize, b: usize) -> bool {
        self.mutate(collection_id, |list| swap_index(list, a, b))
    }

    pub fn swap_rows(&self, collection_id: &str, row_a: usize, row_b: usize, columns: usize) -> bool {
        self.mutate(collection_id, |list| swap_rows(list, row_a, row_b, columns))
    }

    pub fn swap_columns(&self, collection_id: &str, col_a: usize, col_b: usize, columns: usize) -> bool {
        self.mutate(collection_id, |list| swap_columns(list, col_a, col_b, columns))
    }

    pub fn apply(&self, collection_id: &str, op: ReorderOp, columns: usize) -> bool {
        self.mutate(collection_id, |list| apply_op(list, op, columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemStatus;

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

    fn store_with(ids: &[&str]) -> OrderedStore<Item> {
        let store = OrderedStore::new();
        store.set_items("main", ids.iter().enumerate().map(|(i, id)| make_item(id, i as i32)).collect());
        store
    }

    fn order(store: &OrderedStore<Item>) -> Vec<String> {
        store.ids("main").into_iter().map(|id| id.to_string()).collect()
    }

    fn assert_dense(store: &OrderedStore<Item>) {
        let positions: Vec<i32> = store.items("main").iter().map(|i| i.position).collect();
        let expected: Vec<i32> = (0..positions.len() as i32).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn test_move_item_splices() {
        let store = store_with(&["A", "B", "C", "D"]);
        assert!(store.move_item("main", 1, 3));
        assert_eq!(order(&store), ["A", "C", "D", "B"]);
        assert_dense(&store);
    }

    #[test]
    fn test_move_item_forward_to_front() {
        let store = store_with(&["A", "B", "C"]);
        assert!(store.move_item("main", 2, 0));
        assert_eq!(order(&store), ["C", "A", "B"]);
    }

    #[test]
    fn test_swap_twice_restores() {
        let store = store_with(&["A", "B", "C", "D"]);
        assert!(store.swap_items("main", 0, 3));
        assert_eq!(order(&store), ["D", "B", "C", "A"]);
        assert!(store.swap_items("main", 0, 3));
        assert_eq!(order(&store), ["A", "B", "C", "D"]);
        assert_dense(&store);
    }

    #[test]
    fn test_swap_rows_skips_partial_row() {
        let store = store_with(&["A", "B", "C", "D", "E"]);
        assert!(store.swap_rows("main", 0, 1, 2));
        assert_eq!(order(&store), ["C", "D", "A", "B", "E"]);
        assert_dense(&store);
    }

    #[test]
    fn test_swap_rows_with_partial_row_is_element_wise() {
        let store = store_with(&["A", "B", "C", "D", "E"]);
        // row 2 only has E; its column-1 pair is out of range
        assert!(store.swap_rows("main", 0, 2, 2));
        assert_eq!(order(&store), ["E", "B", "C", "D", "A"]);
    }

    #[test]
    fn test_swap_columns() {
        let store = store_with(&["A", "B", "C", "D", "E", "F", "G"]);
        // rows: [A,B,C] [D,E,F] [G]
        assert!(store.swap_columns("main", 0, 2, 3));
        assert_eq!(order(&store), ["C", "B", "A", "F", "E", "D", "G"]);
        assert_dense(&store);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let store = store_with(&["A", "B", "C"]);
        assert!(!store.move_item("main", 0, 3));
        assert!(!store.move_item("main", 5, 0));
        assert!(!store.swap_items("main", 0, 9));
        assert!(!store.swap_rows("main", 0, 4, 2));
        assert!(!store.swap_columns("main", 0, 2, 2));
        assert!(!store.swap_rows("main", 0, 1, 0));
        assert!(!store.move_item("missing", 0, 1));
        assert_eq!(order(&store), ["A", "B", "C"]);
    }

    #[test]
    fn test_extreme_grid_coordinates_are_noop() {
        let mut list = vec!["A", "B", "C", "D"];
        assert!(!swap_rows(&mut list, usize::MAX, 0, 2));
        assert!(!swap_rows(&mut list, 0, usize::MAX, 2));
        assert!(!swap_rows(&mut list, 0, 1, usize::MAX));
        assert!(!swap_columns(&mut list, usize::MAX, 0, 2));
        assert!(!swap_columns(&mut list, 0, usize::MAX - 1, usize::MAX));
        assert!(!apply_op(&mut list, ReorderOp::SwapRows { a: usize::MAX, b: 1 }, 2));
        assert_eq!(list, ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_self_move_does_not_notify() {
        let store = store_with(&["A", "B", "C"]);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        store.subscribe(move |_| seen.set(seen.get() + 1));

        assert!(!store.move_item("main", 1, 1));
        assert!(!store.swap_items("main", 2, 2));
        assert_eq!(calls.get(), 0);
        assert_eq!(store.items("main")[1].position, 1);

        store.swap_items("main", 0, 1);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_subscriber_can_read_store() {
        let store = store_with(&["A", "B"]);
        let reader = store.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |cid| sink.borrow_mut().push(reader.len(cid)));
        store.push("main", make_item("C", 0));
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn test_unsubscribe() {
        let store = store_with(&["A", "B"]);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let id = store.subscribe(move |_| seen.set(seen.get() + 1));
        store.unsubscribe(id);
        store.swap_items("main", 0, 1);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_set_items_renumbers_in_given_order() {
        let store = OrderedStore::new();
        store.set_items("main", vec![make_item("X", 7), make_item("Y", 3)]);
        assert_eq!(order(&store), ["X", "Y"]);
        assert_dense(&store);
    }

    #[test]
    fn test_insert_remove_replace() {
        let store = store_with(&["A", "B", "C"]);
        store.insert("main", 1, make_item("N", 99));
        assert_eq!(order(&store), ["A", "N", "B", "C"]);
        assert_dense(&store);

        let (cid, removed) = store.remove(&ItemId::remote("B")).unwrap();
        assert_eq!(cid, "main");
        assert_eq!(removed.title, "Item B");
        assert_eq!(order(&store), ["A", "N", "C"]);
        assert_dense(&store);

        assert!(store.replace(&ItemId::remote("N"), make_item("M", 0)));
        assert_eq!(order(&store), ["A", "M", "C"]);
        assert_eq!(store.items("main")[1].position, 1);
        assert!(store.remove(&ItemId::remote("zzz")).is_none());
    }

    #[test]
    fn test_positions_stay_dense_under_mixed_ops() {
        let ids: Vec<String> = (0..11).map(|i| format!("i{}", i)).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let store = store_with(&refs);

        // small deterministic LCG, indices deliberately overshoot the list
        let mut seed: u64 = 42;
        let mut next = |bound: usize| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) as usize) % bound
        };
        for step in 0..500 {
            let a = next(14);
            let b = next(14);
            match step % 4 {
                0 => { store.move_item("main", a, b); }
                1 => { store.swap_items("main", a, b); }
                2 => { store.swap_rows("main", a % 5, b % 5, 3); }
                _ => { store.swap_columns("main", a % 4, b % 4, 3); }
            }
            assert_dense(&store);
        }
        let mut sorted = order(&store);
        sorted.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(sorted, expected);
    }
}
