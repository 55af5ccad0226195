//! Geometric layout recovery: fragments to rows, and rows to column grids.

pub mod grid;
pub mod rows;

pub use rows::{reconstruct_rows, row_text, RawRow};
