//! Ready-made row implementations.

mod columns;
mod text;

pub use columns::ColumnRow;
pub use text::TextRow;
