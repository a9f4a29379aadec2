//! Column-based text row.

use crate::format::{Cell, ColumnFormatter};
use crate::layout::ColumnGeometry;
use crate::row::{Listener, Row, RowCore, RowState, SubscriptionId};
use crate::term::Terminal;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// A row that lays its content out in columns.
///
/// The row formats its cells against the terminal's current width on every
/// render, so it re-flows automatically when the terminal is resized.
pub struct ColumnRow {
    core: RowCore,
    formatter: ColumnFormatter,
    cells: Mutex<Vec<Cell>>,
}

impl ColumnRow {
    /// Create a row from a formatter and its initial cells.
    pub fn new(formatter: ColumnFormatter, cells: Vec<Cell>) -> Arc<Self> {
        Arc::new(Self {
            core: RowCore::new(),
            formatter,
            cells: Mutex::new(cells),
        })
    }

    /// Create a row from raw column geometries, with `spacing` characters
    /// between adjacent columns and no initial content.
    pub fn from_geometry(cols: Vec<ColumnGeometry>, spacing: usize) -> Arc<Self> {
        Self::new(ColumnFormatter::new(cols, spacing), Vec::new())
    }

    /// The formatter backing this row.
    pub fn formatter(&self) -> &ColumnFormatter {
        &self.formatter
    }

    /// Replace all cells and notify subscribers.
    pub fn set_cells(&self, cells: Vec<Cell>) {
        *self.cells.lock() = cells;
        self.core.notify();
    }

    /// Replace the cell at `index` and notify subscribers. Appends when
    /// `index` is the current cell count; further out of range is a no-op.
    pub fn set_cell(&self, index: usize, cell: Cell) {
        {
            let mut cells = self.cells.lock();
            match index.cmp(&cells.len()) {
                std::cmp::Ordering::Less => cells[index] = cell,
                std::cmp::Ordering::Equal => cells.push(cell),
                std::cmp::Ordering::Greater => return,
            }
        }
        self.core.notify();
    }

    /// Finish silently.
    pub fn end(&self) {
        self.core.end();
    }

    /// Finish, leaving `message` behind as a permanent log line.
    pub fn end_with(&self, message: impl Into<String>) {
        self.core.end_with(message);
    }
}

impl Row for ColumnRow {
    fn render(&self, term: &mut dyn Terminal) -> io::Result<()> {
        let width = term.size().0 as usize;
        let line = self.formatter.format(&self.cells.lock(), width);
        term.write_str(&line)
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

impl std::fmt::Debug for ColumnRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnRow")
            .field("core", &self.core)
            .field("cells", &self.cells.lock().len())
            .finish()
    }
}
