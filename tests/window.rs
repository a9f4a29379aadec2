#![allow(clippy::unwrap_used)]
//! Integration tests for the render window.
//!
//! These drive a [`RenderWindow`] against a capturing terminal and assert
//! on the exact sequence of terminal operations, since the whole point of
//! the window is the byte-level cursor discipline.

use parking_lot::Mutex;
use sill::{
    Cell, ColumnGeometry, ColumnRow, RenderWindow, Row, RowState, Terminal, TextRow, WindowOptions,
};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One recorded terminal operation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Write(String),
    CursorToColumn(u16),
    ClearToLineEnd,
    MoveRows(i16),
}

type Ops = Arc<Mutex<Vec<Op>>>;

/// Terminal double that records every operation.
struct TestTerminal {
    is_tty: bool,
    size: (u16, u16),
    ops: Ops,
}

impl TestTerminal {
    fn tty(size: (u16, u16)) -> (Self, Ops) {
        let ops: Ops = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                is_tty: true,
                size,
                ops: Arc::clone(&ops),
            },
            ops,
        )
    }

    fn pipe() -> (Self, Ops) {
        let ops: Ops = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                is_tty: false,
                size: (0, 0),
                ops: Arc::clone(&ops),
            },
            ops,
        )
    }
}

impl Terminal for TestTerminal {
    fn is_tty(&self) -> bool {
        self.is_tty
    }

    fn size(&self) -> (u16, u16) {
        self.size
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.ops.lock().push(Op::Write(text.to_string()));
        Ok(())
    }

    fn cursor_to_column(&mut self, column: u16) -> io::Result<()> {
        self.ops.lock().push(Op::CursorToColumn(column));
        Ok(())
    }

    fn clear_to_line_end(&mut self) -> io::Result<()> {
        self.ops.lock().push(Op::ClearToLineEnd);
        Ok(())
    }

    fn move_rows(&mut self, delta: i16) -> io::Result<()> {
        if delta != 0 {
            self.ops.lock().push(Op::MoveRows(delta));
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Row that counts how often it renders.
struct CountingRow {
    renders: Arc<AtomicUsize>,
    core: sill::RowCore,
}

impl CountingRow {
    fn new() -> (Arc<Self>, Arc<AtomicUsize>) {
        let renders = Arc::new(AtomicUsize::new(0));
        let row = Arc::new(Self {
            renders: Arc::clone(&renders),
            core: sill::RowCore::new(),
        });
        (row, renders)
    }

    fn touch(&self) {
        self.core.notify();
    }
}

impl Row for CountingRow {
    fn render(&self, term: &mut dyn Terminal) -> io::Result<()> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        term.write_str("tick")
    }

    fn state(&self) -> RowState {
        RowState::Active
    }

    fn subscribe(&self, listener: sill::Listener) -> Option<sill::SubscriptionId> {
        Some(self.core.subscribe(listener))
    }

    fn unsubscribe(&self, id: sill::SubscriptionId) {
        self.core.unsubscribe(id);
    }
}

fn writes(ops: &Ops) -> Vec<String> {
    ops.lock()
        .iter()
        .filter_map(|op| match op {
            Op::Write(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

fn slow() -> WindowOptions {
    // one-second interval: only the synchronous leading edge fires during
    // a test unless it sleeps
    WindowOptions {
        disable_word_wrap: false,
        fps: 1,
    }
}

#[test]
fn interrupt_on_pipe_is_a_plain_line() {
    let (term, ops) = TestTerminal::pipe();
    let window = RenderWindow::new(Box::new(term), slow());

    window.interrupt("hello").unwrap();

    assert_eq!(
        *ops.lock(),
        vec![Op::Write("hello".into()), Op::Write("\n".into())]
    );
}

#[test]
fn interrupt_on_tty_clears_each_line() {
    let (term, ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    window.interrupt("one\ntwo").unwrap();

    assert_eq!(
        *ops.lock(),
        vec![
            Op::CursorToColumn(0),
            Op::Write("one".into()),
            Op::ClearToLineEnd,
            Op::Write("\n".into()),
            Op::Write("two".into()),
            Op::ClearToLineEnd,
            Op::Write("\n".into()),
            // the scheduled draw that follows has zero rows to paint; its
            // anchor arithmetic (-(lines - 1)) still runs and moves down one
            Op::MoveRows(1),
        ]
    );
}

#[test]
fn rows_draw_in_insertion_order_and_cursor_returns_to_anchor() {
    let (term, ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    window.add(TextRow::new("first"));
    window.add(TextRow::new("second"));
    ops.lock().clear();

    // close(clear = true) runs one immediate cursor-resetting draw
    window.close(true).unwrap();

    // both rows were just removed, so their two lines are drawn blank and
    // the cursor moves back up to the anchor
    assert_eq!(
        *ops.lock(),
        vec![
            Op::CursorToColumn(0),
            Op::ClearToLineEnd,
            Op::Write("\n".into()),
            Op::ClearToLineEnd,
            Op::MoveRows(-1),
        ]
    );
    assert_eq!(window.height(), 0);
}

#[test]
fn insert_with_negative_index_counts_from_the_end() {
    let (term, ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    window.add(TextRow::new("a"));
    window.add(TextRow::new("c"));
    window.insert(TextRow::new("b"), -1);
    ops.lock().clear();

    window.close(false).unwrap();
    assert_eq!(writes(&ops), vec!["a", "\n", "b", "\n", "c"]);
}

#[test]
fn window_height_caps_drawn_lines() {
    let (term, ops) = TestTerminal::tty((80, 2));
    let window = RenderWindow::new(Box::new(term), slow());

    for text in ["a", "b", "c", "d"] {
        window.add(TextRow::new(text));
    }
    ops.lock().clear();

    window.close(false).unwrap();
    // four rows, but the terminal is two lines tall
    assert_eq!(writes(&ops), vec!["a", "\n", "b"]);
}

#[test]
fn removed_row_line_is_blanked_on_next_draw() {
    let (term, ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    window.add(TextRow::new("keep"));
    let gone = window.add(TextRow::new("gone"));
    window.remove(gone);
    ops.lock().clear();

    window.close(true).unwrap();
    // one live row plus one blank line for the removed row
    assert_eq!(
        *ops.lock(),
        vec![
            Op::CursorToColumn(0),
            Op::ClearToLineEnd,   // close(clear) removed "keep" too
            Op::Write("\n".into()),
            Op::ClearToLineEnd,
            Op::MoveRows(-1),
        ]
    );
}

#[test]
fn remove_replacing_logs_synchronously() {
    let (term, ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    let id = window.add(TextRow::new("build"));
    ops.lock().clear();

    window.remove_replacing(id, "build ok").unwrap();

    // direct interrupt write, not a scheduled draw
    assert_eq!(
        ops.lock()[..4],
        [
            Op::CursorToColumn(0),
            Op::Write("build ok".into()),
            Op::ClearToLineEnd,
            Op::Write("\n".into()),
        ]
    );
    assert_eq!(window.height(), 0);
}

#[test]
fn remove_of_unknown_id_and_index_is_a_no_op() {
    let (term, ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    let id = window.add(TextRow::new("only"));
    window.remove(id);
    window.remove(id);
    window.remove_at(7);

    assert_eq!(window.height(), 0);
    drop(ops);
}

#[test]
fn ended_row_with_message_flushes_once_before_windowed_content() {
    let (term, ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    window.add(TextRow::new("stays"));
    let done = TextRow::new("working");
    window.add(done.clone());
    done.end_with("X");
    ops.lock().clear();

    window.close(false).unwrap();

    let texts = writes(&ops);
    assert_eq!(texts.iter().filter(|t| t.as_str() == "X").count(), 1);
    // the message precedes the windowed redraw
    assert_eq!(texts[0], "X");
    assert!(texts.contains(&"stays".to_string()));
    assert!(!texts.contains(&"working".to_string()));
    assert_eq!(window.height(), 1);
}

#[test]
fn silently_ended_row_leaves_no_log_line() {
    let (term, ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    let done = TextRow::new("temp");
    window.add(done.clone());
    done.end();
    ops.lock().clear();

    window.close(false).unwrap();

    assert!(!writes(&ops).contains(&"temp".to_string()));
    assert_eq!(window.height(), 0);
}

#[test]
fn ended_rows_still_flush_replacement_text_on_a_pipe() {
    let (term, ops) = TestTerminal::pipe();
    let window = RenderWindow::new(Box::new(term), slow());

    let row = TextRow::new("fetch");
    window.add(row.clone());
    row.end_with("fetch done");
    ops.lock().clear();

    window.close(false).unwrap();

    // plain line write, no cursor control on a pipe
    assert_eq!(
        *ops.lock(),
        vec![Op::Write("fetch done".into()), Op::Write("\n".into())]
    );
}

#[test]
fn cursor_preserving_close_compensates_only_deleted_rows() {
    let (term, ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    window.add(TextRow::new("one"));
    let two = TextRow::new("two");
    window.add(two.clone());
    two.end();
    ops.lock().clear();

    window.close(false).unwrap();

    // Known edge case: the compensation counts rows deleted before this
    // draw (including the sweep at its start) but not lines the shrunken
    // band no longer rewrote; the documented arithmetic is exactly
    // -deleted, not a recomputed anchor.
    assert_eq!(ops.lock().last(), Some(&Op::MoveRows(-1)));
}

#[test]
fn close_is_terminal_for_windowed_output_but_not_interrupts() {
    let (term, ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    window.add(TextRow::new("row"));
    window.close(true).unwrap();
    ops.lock().clear();

    window.add(TextRow::new("late"));
    window.render();
    std::thread::sleep(Duration::from_millis(30));
    assert!(writes(&ops).is_empty());
    assert!(!window.is_enabled());

    window.interrupt("still logging").unwrap();
    assert_eq!(
        *ops.lock(),
        vec![Op::Write("still logging".into()), Op::Write("\n".into())]
    );
}

#[test]
fn close_unsubscribes_remaining_rows() {
    let (term, _ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    let row = TextRow::new("row");
    window.add(row.clone());
    assert!(row.is_active());

    window.close(false).unwrap();
    assert!(!row.is_active());
}

#[test]
fn burst_of_updates_renders_at_most_twice_per_interval() {
    let (term, _ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(
        Box::new(term),
        WindowOptions {
            disable_word_wrap: false,
            fps: 10,
        },
    );

    let (row, renders) = CountingRow::new();
    window.add(row.clone());
    // the add itself drew once (leading edge)
    assert_eq!(renders.load(Ordering::SeqCst), 1);

    for _ in 0..50 {
        row.touch();
    }
    std::thread::sleep(Duration::from_millis(250));

    // leading draw from add + one trailing draw for the whole burst
    assert_eq!(renders.load(Ordering::SeqCst), 2);
}

#[test]
fn word_wrap_suppression_brackets_the_draw() {
    let (term, ops) = TestTerminal::tty((80, 24));
    let window = RenderWindow::new(
        Box::new(term),
        WindowOptions {
            disable_word_wrap: true,
            fps: 1,
        },
    );

    window.add(TextRow::new("wide"));
    ops.lock().clear();
    window.close(false).unwrap();

    let texts = writes(&ops);
    assert_eq!(texts.first().map(String::as_str), Some("\x1b[?7l"));
    assert_eq!(texts.last().map(String::as_str), Some("\x1b[?7h"));
}

#[test]
fn column_row_renders_at_terminal_width() {
    let (term, ops) = TestTerminal::tty((15, 24));
    let window = RenderWindow::new(Box::new(term), slow());

    let row = ColumnRow::from_geometry(
        vec![ColumnGeometry::fixed(10), ColumnGeometry::fixed(10)],
        1,
    );
    row.set_cells(vec![Cell::text("aaaaaaaaaa"), Cell::text("bbbbbbbbbb")]);
    window.add(row);
    ops.lock().clear();

    window.close(false).unwrap();
    // overflow layout: usable 14 across floors 20 scales both columns to 7
    assert_eq!(writes(&ops), vec!["aaaaaa… bbbbbb…"]);
}
