//! Plain text row.

use crate::row::{Listener, Row, RowCore, RowState, SubscriptionId};
use crate::term::Terminal;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// A row holding one mutable line of text.
///
/// Constructed as a shared handle; keep a clone to update the text after
/// handing the row to a window. Every update notifies subscribers.
#[derive(Debug)]
pub struct TextRow {
    core: RowCore,
    text: Mutex<String>,
}

impl TextRow {
    /// Create a row with the given initial text.
    pub fn new(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            core: RowCore::new(),
            text: Mutex::new(text.into()),
        })
    }

    /// Current text.
    pub fn text(&self) -> String {
        self.text.lock().clone()
    }

    /// Replace the text and notify subscribers.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock() = text.into();
        self.core.notify();
    }

    /// Finish silently; the window reclaims this row's line on the next
    /// redraw.
    pub fn end(&self) {
        self.core.end();
    }

    /// Finish, leaving `message` behind as a permanent log line.
    pub fn end_with(&self, message: impl Into<String>) {
        self.core.end_with(message);
    }

    /// Whether any subscriber is registered.
    pub fn is_active(&self) -> bool {
        self.core.is_active()
    }
}

impl Row for TextRow {
    fn render(&self, term: &mut dyn Terminal) -> io::Result<()> {
        term.write_str(&self.text.lock())
    }

    fn state(&self) -> RowState {
        self.core.state()
    }

    fn subscribe(&self, listener: Listener) -> Option<SubscriptionId> {
        Some(self.core.subscribe(listener))
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.core.unsubscribe(id);
    }
}
