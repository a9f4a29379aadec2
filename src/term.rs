//! Terminal handle abstraction.
//!
//! The render window drives the terminal exclusively through the
//! [`Terminal`] trait: a tty query, a size query, raw writes, and the three
//! cursor/line primitives the redraw algorithm needs. [`StdoutTerminal`]
//! is the crossterm-backed implementation for the process's standard
//! output; tests substitute a capturing implementation.

use crossterm::{cursor, queue, terminal};
use std::io::{self, IsTerminal, Stdout, Write};

/// Fallback terminal width when the size query fails.
pub const DEFAULT_COLUMNS: u16 = 80;
/// Fallback terminal height when the size query fails.
pub const DEFAULT_ROWS: u16 = 24;

/// Terminal capability consumed by the render window.
///
/// Cursor operations are only issued when [`Terminal::is_tty`] reports an
/// interactive terminal; implementations for non-interactive sinks only
/// need `write_str` and `flush` to behave.
pub trait Terminal: Send {
    /// Whether this handle is attached to a live interactive terminal.
    fn is_tty(&self) -> bool;

    /// Current size as `(columns, rows)`.
    fn size(&self) -> (u16, u16);

    /// Write raw text at the cursor position.
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    /// Move the cursor to an absolute column on the current line.
    fn cursor_to_column(&mut self, column: u16) -> io::Result<()>;

    /// Clear from the cursor to the end of the current line.
    fn clear_to_line_end(&mut self) -> io::Result<()>;

    /// Move the cursor by `delta` rows; negative moves up.
    fn move_rows(&mut self, delta: i16) -> io::Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> io::Result<()>;
}

/// Crossterm-backed terminal on standard output.
pub struct StdoutTerminal {
    stdout: Stdout,
    is_tty: bool,
}

impl StdoutTerminal {
    /// Create a handle bound to the process's standard output.
    pub fn new() -> Self {
        let stdout = io::stdout();
        let is_tty = stdout.is_terminal();
        Self { stdout, is_tty }
    }
}

impl Default for StdoutTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for StdoutTerminal {
    fn is_tty(&self) -> bool {
        self.is_tty
    }

    fn size(&self) -> (u16, u16) {
        terminal::size().unwrap_or((DEFAULT_COLUMNS, DEFAULT_ROWS))
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.stdout.write_all(text.as_bytes())
    }

    fn cursor_to_column(&mut self, column: u16) -> io::Result<()> {
        queue!(self.stdout, cursor::MoveToColumn(column))
    }

    fn clear_to_line_end(&mut self) -> io::Result<()> {
        queue!(self.stdout, terminal::Clear(terminal::ClearType::UntilNewLine))
    }

    fn move_rows(&mut self, delta: i16) -> io::Result<()> {
        if delta < 0 {
            queue!(self.stdout, cursor::MoveUp(delta.unsigned_abs()))
        } else if delta > 0 {
            queue!(self.stdout, cursor::MoveDown(delta as u16))
        } else {
            Ok(())
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl std::fmt::Debug for StdoutTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdoutTerminal")
            .field("is_tty", &self.is_tty)
            .finish()
    }
}
