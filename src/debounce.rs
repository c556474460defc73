//! Debounced Field Sync
//!
//! Title/description edits are buffered and sent as one patch once typing
//! has been idle for [`FIELD_SYNC_DEBOUNCE_MS`], or immediately on blur and
//! teardown. Each edit bumps a generation; a timer only flushes if no edit
//! happened after it was armed.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use leptos::task::spawn_local;

use crate::commands::PlannerApi;
use crate::config::FIELD_SYNC_DEBOUNCE_MS;
use crate::models::{ItemId, ItemPatch};
use crate::sync::SyncClient;

/// Pending edits for one item
#[derive(Debug, Default)]
pub struct FieldBuffer {
    pending: ItemPatch,
    generation: u64,
}

impl FieldBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer an edit. Returns the generation a timer should wait on.
    pub fn edit(&mut self, patch: ItemPatch) -> u64 {
        self.pending.merge(patch);
        self.generation += 1;
        self.generation
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take the buffered patch if nothing was typed since `generation`.
    pub fn take_if_idle(&mut self, generation: u64) -> Option<ItemPatch> {
        if generation != self.generation {
            return None;
        }
        self.flush()
    }

    /// Take whatever is buffered.
    pub fn flush(&mut self) -> Option<ItemPatch> {
        if self.pending.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.pending))
    }
}

/// Buffer bound to an item and the sync client, with browser timers
pub struct DebouncedFields<A: PlannerApi + 'static> {
    item: ItemId,
    buffer: Rc<RefCell<FieldBuffer>>,
    sync: SyncClient<A>,
    delay_ms: u32,
}

impl<A: PlannerApi + 'static> Clone for DebouncedFields<A> {
    fn clone(&self) -> Self {
        Self {
            item: self.item.clone(),
            buffer: self.buffer.clone(),
            sync: self.sync.clone(),
            delay_ms: self.delay_ms,
        }
    }
}

impl<A: PlannerApi + 'static> DebouncedFields<A> {
    pub fn new(item: ItemId, sync: SyncClient<A>) -> Self {
        Self {
            item,
            buffer: Rc::new(RefCell::new(FieldBuffer::new())),
            sync,
            delay_ms: FIELD_SYNC_DEBOUNCE_MS,
        }
    }

    /// Buffer an edit without arming a timer. Returns its generation.
    pub fn record(&self, patch: ItemPatch) -> u64 {
        self.buffer.borrow_mut().edit(patch)
    }

    /// Buffer an edit and arm the idle timer.
    pub fn edit(&self, patch: ItemPatch) {
        let generation = self.record(patch);
        let this = self.clone();
        spawn_local(async move {
            TimeoutFuture::new(this.delay_ms).await;
            this.send_if_idle(generation).await;
        });
    }

    /// Send the buffer if `generation` is still the latest edit.
    pub async fn send_if_idle(&self, generation: u64) -> bool {
        let ready = self.buffer.borrow_mut().take_if_idle(generation);
        let Some(patch) = ready else { return false; };
        log::debug!("[SYNC] idle flush for {}", self.item);
        self.sync.update_item(&self.item, patch).await;
        true
    }

    /// Send whatever is buffered, timer or not.
    pub async fn send_pending(&self) -> bool {
        let ready = self.buffer.borrow_mut().flush();
        let Some(patch) = ready else { return false; };
        log::debug!("[SYNC] forced flush for {}", self.item);
        self.sync.update_item(&self.item, patch).await;
        true
    }

    /// Send buffered edits now (blur, teardown).
    pub fn flush(&self) {
        if !self.buffer.borrow().is_dirty() {
            return;
        }
        let this = self.clone();
        spawn_local(async move {
            this.send_pending().await;
        });
    }
}
