//! Fixed-position terminal render window with interleaved log output.
//!
//! `sill` maintains a multi-row window at the current position in a live
//! terminal stream, redrawing it in place without scrolling while ordinary
//! log lines flow past above it. Rows are supplied by the consumer and know
//! how to render their own content; the window handles redraw scheduling,
//! truncation to the terminal size, and reclaiming screen lines when rows
//! finish.
//!
//! # Example
//!
//! ```no_run
//! use sill::prelude::*;
//!
//! let window = RenderWindow::stdout(WindowOptions::default());
//!
//! let status = TextRow::new("working...");
//! window.add(status.clone());
//!
//! window.interrupt("a permanent log line above the window")?;
//! status.set_text("still working...");
//!
//! status.end_with("done");
//! window.close(false)?;
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! # Non-terminal output
//!
//! When the stream is not a live terminal (a pipe, a CI log), windowed
//! rendering is skipped entirely; interrupt lines and row replacement text
//! still come through as plain lines, so no information is lost - only the
//! in-place presentation.

#![warn(missing_docs)]

pub mod format;
pub mod layout;
pub mod row;
pub mod rows;
pub mod term;
pub mod throttle;
pub mod window;

pub use format::{Cell, CellContent, ColumnFormatter};
pub use layout::{column_widths, ColumnGeometry};
pub use row::{Listener, Row, RowCore, RowState, SubscriptionId};
pub use rows::{ColumnRow, TextRow};
pub use term::{StdoutTerminal, Terminal};
pub use throttle::{Throttle, ThrottleHandle};
pub use window::{RenderWindow, RowId, WindowOptions};

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::format::{Cell, ColumnFormatter};
    pub use crate::layout::ColumnGeometry;
    pub use crate::row::{Row, RowState};
    pub use crate::rows::{ColumnRow, TextRow};
    pub use crate::window::{RenderWindow, WindowOptions};
}
