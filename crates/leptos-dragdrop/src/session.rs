//! Drag Session State Machine
//!
//! Pure, framework-free tracking of a single drag gesture:
//! `Idle -> Pending -> Dragging -> (Dropped | Cancelled) -> Idle`.
//!
//! `Pending` is the pointer-down state before the movement threshold is
//! crossed; releasing there is a click, not a drag. Keyboard grabs skip
//! `Pending` and go straight to `Dragging`.

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// How a drop is turned into a reordering
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    /// Free list reordering (move-splice)
    List,
    /// Fixed grid, dropped card swaps with target card
    Grid,
    /// Row handle, whole rows are swapped
    Rows,
    /// Column handle, whole columns are swapped
    Columns,
}

/// Store mutation computed from a successful drop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderOp {
    Move { from: usize, to: usize },
    Swap { a: usize, b: usize },
    SwapRows { a: usize, b: usize },
    SwapColumns { a: usize, b: usize },
}

impl ReorderOp {
    /// Build the op for `mode` between two resolved indices.
    pub fn for_mode(mode: DragMode, active: usize, over: usize) -> Self {
        match mode {
            DragMode::List => ReorderOp::Move { from: active, to: over },
            DragMode::Grid => ReorderOp::Swap { a: active, b: over },
            DragMode::Rows => ReorderOp::SwapRows { a: active, b: over },
            DragMode::Columns => ReorderOp::SwapColumns { a: active, b: over },
        }
    }

    /// True when applying the op cannot change anything.
    pub fn is_noop(&self) -> bool {
        match *self {
            ReorderOp::Move { from, to } => from == to,
            ReorderOp::Swap { a, b }
            | ReorderOp::SwapRows { a, b }
            | ReorderOp::SwapColumns { a, b } => a == b,
        }
    }
}

/// Current phase of the session
#[derive(Clone, Debug, PartialEq)]
pub enum DragPhase<K> {
    Idle,
    /// Pointer is down on `id` but has not moved past the threshold
    Pending { id: K, mode: DragMode, start: (i32, i32) },
    Dragging { active: K, over: Option<K>, mode: DragMode },
}

/// Result of ending a gesture
#[derive(Clone, Debug, PartialEq)]
pub enum DropOutcome<K> {
    /// Released over a valid target different from the active one
    Dropped { active: K, over: K, mode: DragMode },
    /// Escape, leave, release over nothing or over self
    Cancelled,
    /// Pointer went down and up without crossing the threshold
    Click(K),
    /// No gesture was in progress
    Ignored,
}

impl<K> DropOutcome<K> {
    /// Resolve a drop into a store op using `index_of` to map ids to indices.
    ///
    /// Returns `None` for anything but a drop whose ids both resolve and
    /// whose op would actually change the order.
    pub fn resolve(&self, index_of: impl Fn(&K) -> Option<usize>) -> Option<ReorderOp> {
        match self {
            DropOutcome::Dropped { active, over, mode } => {
                let op = ReorderOp::for_mode(*mode, index_of(active)?, index_of(over)?);
                (!op.is_noop()).then_some(op)
            }
            _ => None,
        }
    }
}

/// Arrow keys and the two command keys understood while grabbed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragKey {
    /// Space or Enter: grab when idle, drop when dragging
    Grab,
    Up,
    Down,
    Left,
    Right,
    Escape,
}

impl DragKey {
    /// Map a `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Spacebar" | "Enter" => Some(DragKey::Grab),
            "ArrowUp" => Some(DragKey::Up),
            "ArrowDown" => Some(DragKey::Down),
            "ArrowLeft" => Some(DragKey::Left),
            "ArrowRight" => Some(DragKey::Right),
            "Escape" | "Esc" => Some(DragKey::Escape),
            _ => None,
        }
    }

    /// Index step for this key in `mode`, `None` if the key does nothing there.
    fn step(self, mode: DragMode, columns: usize) -> Option<isize> {
        let columns = columns.max(1) as isize;
        match (mode, self) {
            (DragMode::List, DragKey::Up | DragKey::Left) => Some(-1),
            (DragMode::List, DragKey::Down | DragKey::Right) => Some(1),
            (DragMode::Grid, DragKey::Left) => Some(-1),
            (DragMode::Grid, DragKey::Right) => Some(1),
            (DragMode::Grid, DragKey::Up) => Some(-columns),
            (DragMode::Grid, DragKey::Down) => Some(columns),
            (DragMode::Rows, DragKey::Up) => Some(-1),
            (DragMode::Rows, DragKey::Down) => Some(1),
            (DragMode::Columns, DragKey::Left) => Some(-1),
            (DragMode::Columns, DragKey::Right) => Some(1),
            _ => None,
        }
    }
}

/// An in-progress (or absent) drag gesture over ids of type `K`
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession<K> {
    phase: DragPhase<K>,
    locked: bool,
}

impl<K> Default for DragSession<K> {
    fn default() -> Self {
        Self {
            phase: DragPhase::Idle,
            locked: false,
        }
    }
}

impl<K: Clone + PartialEq> DragSession<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locking refuses new gestures; one already running is left alone.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn phase(&self) -> &DragPhase<K> {
        &self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, DragPhase::Pending { .. })
    }

    pub fn active(&self) -> Option<&K> {
        match &self.phase {
            DragPhase::Dragging { active, .. } => Some(active),
            _ => None,
        }
    }

    pub fn over(&self) -> Option<&K> {
        match &self.phase {
            DragPhase::Dragging { over, .. } => over.as_ref(),
            _ => None,
        }
    }

    pub fn mode(&self) -> Option<DragMode> {
        match &self.phase {
            DragPhase::Pending { mode, .. } | DragPhase::Dragging { mode, .. } => Some(*mode),
            DragPhase::Idle => None,
        }
    }

    /// Pointer down on a draggable. Returns false if the press was refused.
    pub fn press(&mut self, id: K, mode: DragMode, x: i32, y: i32) -> bool {
        if self.locked || !matches!(self.phase, DragPhase::Idle) {
            return false;
        }
        self.phase = DragPhase::Pending { id, mode, start: (x, y) };
        true
    }

    /// Pointer moved. Returns true when this move started the drag.
    pub fn pointer_move(&mut self, x: i32, y: i32) -> bool {
        let DragPhase::Pending { id, mode, start } = &self.phase else {
            return false;
        };
        let dx = (x - start.0).abs();
        let dy = (y - start.1).abs();
        if dx <= DRAG_THRESHOLD_PX && dy <= DRAG_THRESHOLD_PX {
            return false;
        }
        self.phase = DragPhase::Dragging {
            active: id.clone(),
            over: None,
            mode: *mode,
        };
        true
    }

    /// Pointer entered a droppable. Hovering the active id clears the target.
    pub fn hover(&mut self, target: K) {
        if let DragPhase::Dragging { active, over, .. } = &mut self.phase {
            *over = if *active == target { None } else { Some(target) };
        }
    }

    /// Pointer left the current droppable.
    pub fn leave(&mut self) {
        if let DragPhase::Dragging { over, .. } = &mut self.phase {
            *over = None;
        }
    }

    /// Pointer up. Always returns the session to `Idle`.
    pub fn release(&mut self) -> DropOutcome<K> {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => DropOutcome::Ignored,
            DragPhase::Pending { id, .. } => DropOutcome::Click(id),
            DragPhase::Dragging { active, over: Some(over), mode } if over != active => {
                DropOutcome::Dropped { active, over, mode }
            }
            DragPhase::Dragging { .. } => DropOutcome::Cancelled,
        }
    }

    /// Discard the gesture. Returns true if one was in progress.
    pub fn cancel(&mut self) -> bool {
        !matches!(std::mem::replace(&mut self.phase, DragPhase::Idle), DragPhase::Idle)
    }

    /// Keyboard grab of a focused item.
    pub fn grab(&mut self, id: K, mode: DragMode) -> bool {
        if self.locked || !matches!(self.phase, DragPhase::Idle) {
            return false;
        }
        self.phase = DragPhase::Dragging { active: id, over: None, mode };
        true
    }

    /// Move the candidate target one step in `key`'s direction through
    /// `order` (ids in display order). Returns the new target, if any.
    pub fn nudge(&mut self, key: DragKey, order: &[K], columns: usize) -> Option<K> {
        let DragPhase::Dragging { active, over, mode } = &mut self.phase else {
            return None;
        };
        let step = key.step(*mode, columns)?;
        let cursor = over.as_ref().unwrap_or(active);
        let current = order.iter().position(|k| k == cursor)? as isize;
        let next = current + step;
        if next < 0 || next as usize >= order.len() {
            return None;
        }
        let target = order[next as usize].clone();
        *over = if target == *active { None } else { Some(target.clone()) };
        over.clone()
    }

    /// Full keyboard handling. `focused` is the id with keyboard focus,
    /// used when grabbing. Returns an outcome when the gesture ended.
    pub fn on_key(
        &mut self,
        key: DragKey,
        focused: Option<K>,
        mode: DragMode,
        order: &[K],
        columns: usize,
    ) -> Option<DropOutcome<K>> {
        match key {
            DragKey::Grab if self.is_dragging() => Some(self.release()),
            DragKey::Grab => {
                if let Some(id) = focused {
                    self.grab(id, mode);
                }
                None
            }
            DragKey::Escape => self.cancel().then_some(DropOutcome::Cancelled),
            arrow => {
                self.nudge(arrow, order, columns);
                None
            }
        }
    }
}
