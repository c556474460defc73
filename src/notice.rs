//! Non-blocking Notices
//!
//! Remote failures end up here instead of in the render path.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A dismissible banner message
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Hands notices to whatever displays them
#[derive(Clone)]
pub struct Notifier {
    sink: Rc<dyn Fn(Notice)>,
    next_id: Rc<Cell<u64>>,
}

impl Notifier {
    pub fn new(sink: impl Fn(Notice) + 'static) -> Self {
        Self {
            sink: Rc::new(sink),
            next_id: Rc::new(Cell::new(1)),
        }
    }

    /// Drops every notice
    pub fn silent() -> Self {
        Self::new(|_| {})
    }

    /// Notifier plus the list it appends to
    pub fn collecting() -> (Self, Rc<RefCell<Vec<Notice>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (Self::new(move |n| sink.borrow_mut().push(n)), seen)
    }

    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        (self.sink)(Notice { id, level, message: message.into() });
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Error, message);
    }
}
