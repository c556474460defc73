//! Leptos DragDrop Utilities
//!
//! Mouse and keyboard drag-and-drop for Leptos, generic over the id type
//! of the things being dragged. Uses movement threshold to distinguish
//! click from drag. The gesture itself lives in [`DragSession`]; this module
//! only feeds it DOM events.

pub mod session;

pub use session::{
    DragKey, DragMode, DragPhase, DragSession, DropOutcome, ReorderOp, DRAG_THRESHOLD_PX,
};

use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Bound shared by every id that can be dragged
pub trait DragId: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static {}

impl<T> DragId for T where T: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static {}

/// DnD state signals
pub struct DndSignals<K: DragId> {
    pub session: RwSignal<DragSession<K>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
}

impl<K: DragId> Clone for DndSignals<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: DragId> Copy for DndSignals<K> {}

impl<K: DragId> DndSignals<K> {
    pub fn is_dragging(&self) -> bool {
        self.session.with(|s| s.is_dragging())
    }

    pub fn is_active(&self, id: &K) -> bool {
        self.session.with(|s| s.active() == Some(id))
    }

    pub fn is_over(&self, id: &K) -> bool {
        self.session.with(|s| s.over() == Some(id))
    }

    pub fn set_locked(&self, locked: bool) {
        self.session.update(|s| s.set_locked(locked));
    }
}

/// What the keyboard handler needs to know at the time of a key press
#[derive(Clone, Debug)]
pub struct KeyboardContext<K> {
    /// Id holding keyboard focus, grabbed on Space/Enter
    pub focused: Option<K>,
    pub mode: DragMode,
    /// Ids in display order
    pub order: Vec<K>,
    pub columns: usize,
}

pub fn create_dnd_signals<K: DragId>() -> DndSignals<K> {
    let session = RwSignal::new(DragSession::new());
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    DndSignals {
        session,
        drag_just_ended_read,
        drag_just_ended_write,
    }
}

/// End drag operation
pub fn end_drag<K: DragId>(dnd: &DndSignals<K>) {
    dnd.drag_just_ended_write.set(true);

    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), 100);
        cb.forget();
    }
}

/// Create mousedown handler for draggable elements
/// Records pending drag with start position
pub fn make_on_mousedown<K: DragId>(
    dnd: DndSignals<K>,
    id: K,
    mode: DragMode,
) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        // Ignore if target is input or button
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() { return; }
            if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() { return; }
        }
        let id = id.clone();
        dnd.session.update(|s| {
            if !s.press(id.clone(), mode, ev.client_x(), ev.client_y()) {
                log::debug!("[DND] press refused for {:?} (locked or busy)", id);
            }
        });
    }
}

/// Create mouseenter handler for drop targets
pub fn make_on_target_mouseenter<K: DragId>(
    dnd: DndSignals<K>,
    target: K,
) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.session.with_untracked(|s| s.is_dragging()) {
            let target = target.clone();
            dnd.session.update(|s| s.hover(target));
        }
    }
}

/// Create mouseleave handler
pub fn make_on_mouseleave<K: DragId>(dnd: DndSignals<K>) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.session.with_untracked(|s| s.over().is_some()) {
            dnd.session.update(|s| s.leave());
        }
    }
}

/// Bind document mousemove - starts drag once moved past the threshold
pub fn bind_global_mousemove<K: DragId>(dnd: DndSignals<K>) {
    use wasm_bindgen::closure::Closure;

    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        if !dnd.session.with_untracked(|s| s.is_pending()) {
            return;
        }
        dnd.session.update(|s| {
            if s.pointer_move(ev.client_x(), ev.client_y()) {
                log::debug!("[DND] drag started: {:?}", s.active());
            }
        });
    });

    if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
        let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
    }
    on_mousemove.forget();
}

/// Bind global mouseup handler for drop detection
///
/// `on_drop` only sees real drops; clicks fall through to the element.
/// Leaving the window mid-drag cancels the session.
pub fn bind_global_mouseup<K, F>(dnd: DndSignals<K>, on_drop: F)
where
    K: DragId,
    F: Fn(DropOutcome<K>) + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        if dnd.session.with_untracked(|s| matches!(s.phase(), DragPhase::Idle)) {
            return;
        }
        let mut outcome = DropOutcome::Ignored;
        dnd.session.update(|s| outcome = s.release());
        end_drag(&dnd);
        match outcome {
            DropOutcome::Dropped { .. } => {
                log::debug!("[DND] drop: {:?}", outcome);
                on_drop(outcome);
            }
            DropOutcome::Cancelled => log::debug!("[DND] drag cancelled"),
            // Click event will fire naturally on the element
            DropOutcome::Click(_) | DropOutcome::Ignored => {}
        }
    });

    let on_leave = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let mut cancelled = false;
        dnd.session.update(|s| cancelled = s.cancel());
        if cancelled {
            log::debug!("[DND] pointer left window, drag cancelled");
            end_drag(&dnd);
        }
    });

    if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
        let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
        if let Some(root) = doc.document_element() {
            let _ = root.add_event_listener_with_callback("mouseleave", on_leave.as_ref().unchecked_ref());
        }
    }
    on_mouseup.forget();
    on_leave.forget();

    // Also bind global mousemove
    bind_global_mousemove(dnd);
}

/// True for elements whose key presses belong to text entry
pub fn is_text_entry(tag_name: &str, content_editable: bool) -> bool {
    content_editable
        || ["INPUT", "TEXTAREA", "SELECT"]
            .iter()
            .any(|tag| tag_name.eq_ignore_ascii_case(tag))
}

fn targets_text_entry(ev: &web_sys::KeyboardEvent) -> bool {
    let Some(el) = ev.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok()) else {
        return false;
    };
    let editable = el
        .dyn_ref::<web_sys::HtmlElement>()
        .map(|h| h.is_content_editable())
        .unwrap_or(false);
    is_text_entry(&el.tag_name(), editable)
}

/// Bind document keydown for the keyboard drag alternative
///
/// `context` is asked on every relevant key press; returning `None` means
/// the keyboard is not over a draggable surface right now. Keys typed into
/// form fields are never intercepted.
pub fn bind_global_keydown<K, C, F>(dnd: DndSignals<K>, context: C, on_drop: F)
where
    K: DragId,
    C: Fn() -> Option<KeyboardContext<K>> + 'static,
    F: Fn(DropOutcome<K>) + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_keydown = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(move |ev: web_sys::KeyboardEvent| {
        let Some(key) = DragKey::from_key(&ev.key()) else { return; };
        if targets_text_entry(&ev) {
            return;
        }
        let dragging = dnd.session.with_untracked(|s| s.is_dragging());
        if !dragging && key != DragKey::Grab {
            return;
        }
        let Some(ctx) = context() else { return; };
        if !dragging && ctx.focused.is_none() {
            return;
        }
        ev.prevent_default();

        let mut outcome = None;
        dnd.session.update(|s| {
            outcome = s.on_key(key, ctx.focused.clone(), ctx.mode, &ctx.order, ctx.columns);
        });
        match outcome {
            Some(drop @ DropOutcome::Dropped { .. }) => {
                end_drag(&dnd);
                log::debug!("[DND] keyboard drop: {:?}", drop);
                on_drop(drop);
            }
            Some(_) => end_drag(&dnd),
            None => {}
        }
    });

    if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
        let _ = doc.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref());
    }
    on_keydown.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_fields_are_text_entry() {
        assert!(is_text_entry("INPUT", false));
        assert!(is_text_entry("TEXTAREA", false));
        assert!(is_text_entry("SELECT", false));
        assert!(is_text_entry("input", false));
    }

    #[test]
    fn test_contenteditable_is_text_entry() {
        assert!(is_text_entry("DIV", true));
    }

    #[test]
    fn test_cards_and_handles_are_not_text_entry() {
        assert!(!is_text_entry("DIV", false));
        assert!(!is_text_entry("BUTTON", false));
        assert!(!is_text_entry("SPAN", false));
    }
}
