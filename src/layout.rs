//! Column width allocation.
//!
//! A pure function that divides a fixed character budget between an ordered
//! set of columns. Each column declares a floor width and an optional growth
//! weight; surplus space is split between growing columns proportionally,
//! and when the floors alone do not fit, every column is shrunk by the same
//! proportional factor.

/// Width constraints for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnGeometry {
    /// Floor width in characters. A column is only rendered narrower than
    /// this when the whole line overflows and every column is scaled down.
    pub min_width: usize,
    /// Growth weight. Columns with weight `0` never receive surplus space.
    pub grow: u32,
}

impl ColumnGeometry {
    /// A fixed column: `min_width` characters, no growth.
    pub const fn fixed(min_width: usize) -> Self {
        Self { min_width, grow: 0 }
    }

    /// A growing column with the given floor and weight.
    pub const fn growing(min_width: usize, grow: u32) -> Self {
        Self { min_width, grow }
    }
}

/// Compute the width of each column for a line `width` characters wide.
///
/// `spacing` characters are reserved between each pair of adjacent columns.
/// If the spacing alone exhausts the line, every column gets width `0`.
///
/// When the floors do not fit, all columns shrink by the factor
/// `usable / total`, rounded down per column; the rounding loss is accepted
/// rather than redistributed. When there is room to spare, the surplus goes
/// to columns with a positive `grow` weight, proportionally, again rounded
/// down; if no column grows, the surplus is left as trailing space.
pub fn column_widths(width: usize, cols: &[ColumnGeometry], spacing: usize) -> Vec<usize> {
    if cols.is_empty() {
        return Vec::new();
    }

    let gaps = (cols.len() - 1) * spacing;
    let usable = width.saturating_sub(gaps);
    let total: usize = cols.iter().map(|c| c.min_width).sum();

    if usable == 0 {
        return vec![0; cols.len()];
    }

    if total > usable {
        let scale = usable as f64 / total as f64;
        return cols
            .iter()
            .map(|c| (scale * c.min_width as f64).floor() as usize)
            .collect();
    }

    let remaining = usable - total;
    let divide: u64 = cols.iter().map(|c| u64::from(c.grow)).sum();
    if divide == 0 {
        return cols.iter().map(|c| c.min_width).collect();
    }

    cols.iter()
        .map(|c| {
            if c.grow == 0 {
                c.min_width
            } else {
                c.min_width + (u64::from(c.grow) * remaining as u64 / divide) as usize
            }
        })
        .collect()
}
