//! The render window.
//!
//! [`RenderWindow`] owns an ordered set of rows and redraws them in place
//! at the current cursor position, without scrolling: every redraw rewrites
//! the same fixed band of terminal lines and moves the cursor back to the
//! band's first line. Ordinary log output is interleaved through
//! [`RenderWindow::interrupt`], which pushes the band down instead of
//! overwriting it.
//!
//! Redraws are coalesced through a leading/trailing [`Throttle`], so any
//! rate of row mutation costs at most two physical redraws per interval.
//!
//! When a row is removed the band shrinks, but the previous, taller draw
//! has left stale characters on screen; the vacated positions are drawn as
//! blank lines for exactly one redraw cycle (`deleted_rows_since_last_render`)
//! so they get cleared rather than abandoned.

use crate::row::{Listener, Row, RowState, SubscriptionId};
use crate::term::{StdoutTerminal, Terminal};
use crate::throttle::Throttle;
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// DEC autowrap off/on. Emitted as a matched pair bracketing each redraw
/// so long rows truncate at the terminal edge instead of wrapping.
const AUTOWRAP_OFF: &str = "\x1b[?7l";
const AUTOWRAP_ON: &str = "\x1b[?7h";

static ROW_IDS: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a row inside a window.
///
/// Returned by [`RenderWindow::add`] / [`RenderWindow::insert`]. All
/// removal paths resolve to a `RowId` before touching the row list, so a
/// stale id is a harmless no-op rather than an off-by-one removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(u64);

impl RowId {
    fn next() -> Self {
        Self(ROW_IDS.fetch_add(1, Ordering::Relaxed))
    }
}

/// Construction options for a [`RenderWindow`].
#[derive(Debug, Clone, Copy)]
pub struct WindowOptions {
    /// Suppress terminal word-wrap for the duration of each redraw.
    pub disable_word_wrap: bool,
    /// Upper bound on scheduled redraw frequency.
    pub fps: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            disable_word_wrap: true,
            fps: 15,
        }
    }
}

struct Entry {
    id: RowId,
    row: Arc<dyn Row>,
    subscription: Option<SubscriptionId>,
}

struct WindowInner {
    term: Box<dyn Terminal>,
    rows: Vec<Entry>,
    deleted_rows_since_last_render: usize,
    ended: bool,
    disable_word_wrap: bool,
}

impl WindowInner {
    /// Windowed rendering happens only on a live terminal that has not
    /// been closed. Interrupt output always flows.
    fn enabled(&self) -> bool {
        self.term.is_tty() && !self.ended
    }

    fn window_width(&self) -> usize {
        if self.term.is_tty() {
            self.term.size().0 as usize
        } else {
            0
        }
    }

    fn window_height(&self) -> usize {
        if self.term.is_tty() {
            self.term.size().1 as usize
        } else {
            0
        }
    }

    fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|e| e.id == id)
    }

    /// Write `text` as permanent log output. On a live terminal each line
    /// is followed by clear-to-end-of-line and a real newline, pushing the
    /// windowed band down; otherwise it is a plain line write.
    fn interrupt(&mut self, text: &str) -> io::Result<()> {
        if self.enabled() {
            self.term.cursor_to_column(0)?;
            for line in text.split('\n') {
                self.term.write_str(line)?;
                self.term.clear_to_line_end()?;
                self.term.write_str("\n")?;
            }
        } else {
            self.term.write_str(text)?;
            self.term.write_str("\n")?;
        }
        self.term.flush()
    }

    /// Remove the row with the given id, unsubscribing the window's
    /// listener. With `replace`, the text is logged immediately through the
    /// interrupt path; without it, the vacated line is only counted so the
    /// next redraw blanks it. Unknown ids are a no-op.
    fn remove(&mut self, id: RowId, replace: Option<&str>) -> io::Result<()> {
        let Some(pos) = self.position(id) else {
            return Ok(());
        };
        let entry = self.rows.remove(pos);
        if let Some(sub) = entry.subscription {
            entry.row.unsubscribe(sub);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(row = id.0, replaced = replace.is_some(), "row removed");

        match replace {
            Some(text) if !text.is_empty() => self.interrupt(text),
            _ => {
                self.deleted_rows_since_last_render += 1;
                Ok(())
            }
        }
    }

    /// One physical redraw.
    ///
    /// `reset_cursor` is true for scheduler-driven draws, which anchor the
    /// cursor back to the window's first line afterwards. The single
    /// cursor-preserving call (`close(clear = false)`) passes false and
    /// compensates only for rows deleted since the last draw.
    fn render_pass(&mut self, reset_cursor: bool) -> io::Result<usize> {
        // Sweep rows that marked themselves ended. Runs before the enabled
        // check so replacement text still reaches non-TTY output.
        let ended: Vec<(RowId, RowState)> = self
            .rows
            .iter()
            .map(|e| (e.id, e.row.state()))
            .filter(|(_, state)| state.is_ended())
            .collect();
        for (id, state) in ended {
            match state {
                RowState::EndedWithMessage(ref text) if !text.is_empty() => {
                    self.remove(id, Some(text))?;
                }
                _ => self.remove(id, None)?,
            }
        }

        if !self.enabled() {
            return Ok(0);
        }

        let blank_rows = if reset_cursor {
            self.deleted_rows_since_last_render
        } else {
            0
        };

        if self.disable_word_wrap {
            self.term.write_str(AUTOWRAP_OFF)?;
        }

        let height = self.window_height();
        let mut line = 0;
        while line < height && line < self.rows.len() + blank_rows {
            if line > 0 {
                self.term.write_str("\n")?;
            } else {
                self.term.cursor_to_column(0)?;
            }
            if line < self.rows.len() {
                self.rows[line].row.render(self.term.as_mut())?;
            }
            // erases stale longer content, and blanks reclaimed lines
            self.term.clear_to_line_end()?;
            line += 1;
        }

        if reset_cursor {
            // back to the first row of the window
            self.term.move_rows(-(line as i16 - 1))?;
        } else if self.deleted_rows_since_last_render > 0 {
            // rows vanished from the end of the band; park the cursor on
            // the first blanked line
            self.term.move_rows(-(self.deleted_rows_since_last_render as i16))?;
        }

        if self.disable_word_wrap {
            self.term.write_str(AUTOWRAP_ON)?;
        }

        self.deleted_rows_since_last_render = 0;
        self.term.flush()?;

        #[cfg(feature = "tracing")]
        tracing::trace!(lines = line, "redraw");

        Ok(line)
    }
}

/// A fixed-position multi-row render window over a terminal stream.
///
/// Rows render in insertion order, top to bottom. Mutating a row's content
/// (through its change-notification contract) schedules a throttled redraw;
/// [`RenderWindow::interrupt`] interleaves permanent log lines above the
/// window. Closing the window is terminal: only interrupt output flows
/// afterwards.
pub struct RenderWindow {
    inner: Arc<Mutex<WindowInner>>,
    throttle: Throttle,
}

impl RenderWindow {
    /// Create a window over the given terminal handle.
    pub fn new(term: Box<dyn Terminal>, options: WindowOptions) -> Self {
        let inner = Arc::new(Mutex::new(WindowInner {
            term,
            rows: Vec::new(),
            deleted_rows_since_last_render: 0,
            ended: false,
            disable_word_wrap: options.disable_word_wrap,
        }));

        let weak: Weak<Mutex<WindowInner>> = Arc::downgrade(&inner);
        let interval = Duration::from_secs_f64(1.0 / f64::from(options.fps.max(1)));
        let throttle = Throttle::new(interval, move || {
            if let Some(inner) = weak.upgrade() {
                // a broken stream fails the next synchronous write too;
                // scheduled draws have no caller to report to
                let _ = inner.lock().render_pass(true);
            }
        });

        Self { inner, throttle }
    }

    /// Create a window over the process's standard output.
    pub fn stdout(options: WindowOptions) -> Self {
        Self::new(Box::new(StdoutTerminal::new()), options)
    }

    /// Append a row at the bottom of the window.
    pub fn add(&self, row: Arc<dyn Row>) -> RowId {
        let index = self.inner.lock().rows.len() as isize;
        self.insert(row, index)
    }

    /// Insert a row at `index`. Negative indices count from the end of the
    /// list; out-of-range indices clamp to the nearest end.
    pub fn insert(&self, row: Arc<dyn Row>, index: isize) -> RowId {
        let id = RowId::next();
        let handle = self.throttle.handle();
        let listener: Listener = Arc::new(move || handle.call());
        let subscription = row.subscribe(listener);

        {
            let mut inner = self.inner.lock();
            let len = inner.rows.len() as isize;
            let at = if index < 0 {
                (len + index).max(0) as usize
            } else {
                (index as usize).min(inner.rows.len())
            };
            inner.rows.insert(
                at,
                Entry {
                    id,
                    row,
                    subscription,
                },
            );
        }

        self.throttle.call();
        id
    }

    /// Remove a row, blanking its line on the next redraw. Unknown ids are
    /// a no-op.
    pub fn remove(&self, id: RowId) {
        // removal without replacement performs no terminal writes
        let _ = self.inner.lock().remove(id, None);
        self.throttle.call();
    }

    /// Remove the row at `index`. Out-of-range indices are a no-op.
    pub fn remove_at(&self, index: usize) {
        let id = {
            let inner = self.inner.lock();
            inner.rows.get(index).map(|e| e.id)
        };
        if let Some(id) = id {
            self.remove(id);
        }
    }

    /// Remove a row and immediately log `text` in its place. The text is
    /// written synchronously through the interrupt path; the remaining rows
    /// re-render below it on the next redraw.
    pub fn remove_replacing(&self, id: RowId, text: &str) -> io::Result<()> {
        let result = self.inner.lock().remove(id, Some(text));
        self.throttle.call();
        result
    }

    /// Log `text` as a permanent line ahead of the window, then schedule a
    /// redraw. Off-terminal this degrades to `text` plus a newline.
    pub fn interrupt(&self, text: &str) -> io::Result<()> {
        let result = self.inner.lock().interrupt(text);
        self.render();
        result
    }

    /// Request a throttled redraw. No-op when the window is not attached to
    /// a live terminal or already closed.
    pub fn render(&self) {
        let enabled = self.inner.lock().enabled();
        if enabled {
            self.throttle.call();
        }
    }

    /// Stop rendering. With `clear`, all rows are removed and their lines
    /// blanked by one final redraw; without it, the current output is left
    /// in place and the cursor is not re-anchored. Either way the window
    /// becomes permanently inert apart from [`RenderWindow::interrupt`].
    pub fn close(&self, clear: bool) -> io::Result<()> {
        let mut drained = Vec::new();
        let result;
        {
            let mut inner = self.inner.lock();
            if clear {
                inner.deleted_rows_since_last_render += inner.rows.len();
                drained = std::mem::take(&mut inner.rows);
            }
            // immediate, unthrottled final draw
            result = inner.render_pass(clear);
            inner.ended = true;

            for entry in inner.rows.iter_mut() {
                if let Some(sub) = entry.subscription.take() {
                    entry.row.unsubscribe(sub);
                }
            }
        }
        for entry in &drained {
            if let Some(sub) = entry.subscription {
                entry.row.unsubscribe(sub);
            }
        }
        self.throttle.cancel();

        #[cfg(feature = "tracing")]
        tracing::debug!(cleared = clear, "window closed");

        result.map(|_| ())
    }

    /// Number of rows currently in the window.
    pub fn height(&self) -> usize {
        self.inner.lock().rows.len()
    }

    /// Terminal width in characters, or `0` when not a live terminal.
    pub fn window_width(&self) -> usize {
        self.inner.lock().window_width()
    }

    /// Terminal height in characters, or `0` when not a live terminal.
    pub fn window_height(&self) -> usize {
        self.inner.lock().window_height()
    }

    /// Whether windowed redraws are currently possible.
    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled()
    }
}

impl std::fmt::Debug for RenderWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RenderWindow")
            .field("rows", &inner.rows.len())
            .field("ended", &inner.ended)
            .finish()
    }
}
