//! `sheetfuse-engine` — Core table model.
//!
//! Pure data crate: cells, scalar types, and the column-ordered `Table`.
//! No file IO dependencies.

pub mod cell;
pub mod table;

pub use cell::{CellValue, ScalarType};
pub use table::Table;
