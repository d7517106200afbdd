// File I/O operations

pub mod csv;
pub mod export;
pub mod ingest;
pub mod xlsx;

pub use ingest::{ingest_batch, ingest_bytes, ingest_path, FileKind, ImportError, IngestFailure, SourceFile};

/// Sheet name assigned to the single implicit sheet of a CSV file.
pub const CSV_SHEET_NAME: &str = "Sheet1";
