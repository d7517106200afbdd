//! `sheetfuse-merge` — Header reconciliation and merge engine.
//!
//! Pure engine crate: receives ingested files, reconciles header
//! mismatches per a user-built plan, merges with provenance tracking and
//! analyzes the result for near-empty columns. No file IO of its own.

pub mod analyze;
pub mod emptiness;
pub mod error;
pub mod merge;
pub mod model;
pub mod plan;
pub mod session;

pub use analyze::analyze_headers;
pub use emptiness::{analyze_emptiness, apply_removal};
pub use error::MergeError;
pub use merge::merge_files;
pub use model::{FileSelection, HeaderReport, MatchStatus, MergedTable, SelectionMap, SOURCE_COLUMN};
pub use plan::{HeaderAction, HeaderPlan};
pub use session::MergeSession;
