//! Column line formatting.
//!
//! [`ColumnFormatter`] composes the width allocation from [`crate::layout`]
//! with per-cell content resolution to produce one fixed-width line of text.
//! Every cell is padded or truncated to exactly its allotted width, so the
//! joined line never exceeds the width it was formatted for.

use crate::layout::{column_widths, ColumnGeometry};
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

/// Character appended when a cell's content is cut to fit its column.
const ELLIPSIS: char = '…';

/// Content of one cell, resolved at format time.
pub enum CellContent {
    /// Literal text.
    Text(String),
    /// Width-adaptive text: the closure receives the column's computed
    /// width, so content such as a progress bar can scale to its slot.
    Dynamic(Box<dyn Fn(usize) -> String + Send + Sync>),
}

impl std::fmt::Debug for CellContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Dynamic(_) => f.debug_tuple("Dynamic").finish(),
        }
    }
}

/// One column cell: content plus an optional post-formatting transform.
///
/// The transform runs *after* padding and truncation, on the already
/// fixed-width string, so it can wrap the cell in escape sequences (color,
/// emphasis) without disturbing the layout.
pub struct Cell {
    content: CellContent,
    format: Option<Box<dyn Fn(&str) -> String + Send + Sync>>,
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("content", &self.content)
            .field("format", &self.format.is_some())
            .finish()
    }
}

impl Cell {
    /// A cell with literal text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: CellContent::Text(text.into()),
            format: None,
        }
    }

    /// A cell whose content is generated from the column's computed width.
    pub fn dynamic(content: impl Fn(usize) -> String + Send + Sync + 'static) -> Self {
        Self {
            content: CellContent::Dynamic(Box::new(content)),
            format: None,
        }
    }

    /// Attach a transform applied after padding/truncation.
    pub fn with_format(mut self, format: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.format = Some(Box::new(format));
        self
    }

    fn render(&self, width: usize) -> String {
        let fitted = match &self.content {
            CellContent::Text(text) => fit(text, width),
            CellContent::Dynamic(generate) => fit(&generate(width), width),
        };
        match &self.format {
            Some(format) => format(&fitted),
            None => fitted,
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

/// Formats cell lists into single fixed-width lines.
#[derive(Debug, Clone)]
pub struct ColumnFormatter {
    cols: Vec<ColumnGeometry>,
    spacing: usize,
}

impl ColumnFormatter {
    /// Create a formatter for the given column geometries, with `spacing`
    /// characters between adjacent columns.
    pub fn new(cols: Vec<ColumnGeometry>, spacing: usize) -> Self {
        Self { cols, spacing }
    }

    /// The column geometries this formatter lays out.
    pub fn geometries(&self) -> &[ColumnGeometry] {
        &self.cols
    }

    /// Format one line of cells for a terminal `width` characters wide.
    ///
    /// Cells beyond the geometry list are ignored; missing cells render as
    /// blank columns.
    pub fn format(&self, cells: &[Cell], width: usize) -> String {
        let widths = column_widths(width, &self.cols, self.spacing);
        let space = " ".repeat(self.spacing);

        widths
            .iter()
            .enumerate()
            .map(|(i, &w)| match cells.get(i) {
                Some(cell) => cell.render(w),
                None => " ".repeat(w),
            })
            .collect::<Vec<_>>()
            .join(&space)
    }
}

/// Pad or truncate `text` to exactly `width` display columns.
///
/// Oversized content keeps `width - 1` columns and gains a trailing
/// ellipsis; this is the only place content is ever cut. Width `0` renders
/// as an empty string regardless of content.
fn fit(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }

    let text_width = UnicodeWidthStr::width(text);
    if text_width <= width {
        let mut out = String::with_capacity(text.len() + (width - text_width));
        out.push_str(text);
        for _ in 0..width - text_width {
            out.push(' ');
        }
        return out;
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        used += w;
        out.push(ch);
    }
    // a double-width glyph straddling the cut can leave a one-column gap
    for _ in 0..width - 1 - used {
        out.push(' ');
    }
    out.push(ELLIPSIS);
    out
}
