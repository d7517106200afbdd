use std::collections::BTreeSet;

use serde::Serialize;
use sheetfuse_engine::{ScalarType, Table};
use sheetfuse_io::SourceFile;

/// Reserved provenance column name. When a source file legitimately owns a
/// column with this name, the merger picks a suffixed variant instead of
/// displacing user data (see `merge::reserve_source_column`).
pub const SOURCE_COLUMN: &str = "_source_file";

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Per-file merge participation: whether the file is included and which of
/// its sheets feeds the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub included: bool,
    pub sheet: String,
}

/// Selections in upload order. Iteration order is the merge's row order,
/// so it must stay deterministic — hence a vector, not a hash map.
#[derive(Debug, Clone, Default)]
pub struct SelectionMap {
    entries: Vec<(String, FileSelection)>,
}

impl SelectionMap {
    /// Default selection for a batch: every file included, first sheet.
    pub fn defaults(files: &[SourceFile]) -> Self {
        Self {
            entries: files
                .iter()
                .map(|f| {
                    (
                        f.name.clone(),
                        FileSelection {
                            included: true,
                            sheet: f.first_sheet_name().to_string(),
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn get(&self, file: &str) -> Option<&FileSelection> {
        self.entries.iter().find(|(n, _)| n == file).map(|(_, s)| s)
    }

    pub fn get_mut(&mut self, file: &str) -> Option<&mut FileSelection> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == file)
            .map(|(_, s)| s)
    }

    /// Effective selection for a file: the stored entry, or the default
    /// (included, first sheet) when the file has none.
    pub fn for_file(&self, file: &SourceFile) -> FileSelection {
        self.get(&file.name).cloned().unwrap_or(FileSelection {
            included: true,
            sheet: file.first_sheet_name().to_string(),
        })
    }

    pub fn any_included(&self, files: &[SourceFile]) -> bool {
        files.iter().any(|f| self.for_file(f).included)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileSelection)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }
}

// ---------------------------------------------------------------------------
// Header analysis
// ---------------------------------------------------------------------------

/// Advisory match status of one header relative to the other included
/// files. Drives defaults and highlighting, never blocks a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Appears in at least one other included file.
    Match,
    /// Appears in this file only.
    NoMatch,
    /// Only one file is included, so the comparison is vacuous.
    SingleFile,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderStatus {
    pub name: String,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileHeaders {
    pub file: String,
    pub sheet: String,
    pub headers: Vec<HeaderStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderReport {
    /// Union of headers across included files, first-seen order.
    pub union: Vec<String>,
    /// True iff >=2 files are included and some included file's header set
    /// differs (as a set) from the first included file's.
    pub has_mismatch: bool,
    pub included_count: usize,
    pub per_file: Vec<FileHeaders>,
}

// ---------------------------------------------------------------------------
// Merge output
// ---------------------------------------------------------------------------

/// Merged output plus the provenance column name actually used (the
/// reserved name, or its suffixed variant on collision).
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    pub table: Table,
    pub source_column: String,
}

// ---------------------------------------------------------------------------
// Emptiness analysis
// ---------------------------------------------------------------------------

/// Emptiness buckets, inclusive lower bounds: >=95% drop-recommended,
/// >=50% review, below that healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptinessBucket {
    DropRecommended,
    Review,
    Healthy,
}

impl EmptinessBucket {
    pub fn for_percentage(pct: f64) -> Self {
        if pct >= 95.0 {
            Self::DropRecommended
        } else if pct >= 50.0 {
            Self::Review
        } else {
            Self::Healthy
        }
    }
}

impl std::fmt::Display for EmptinessBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DropRecommended => write!(f, "drop-recommended"),
            Self::Review => write!(f, "review"),
            Self::Healthy => write!(f, "healthy"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnEmptiness {
    pub column: String,
    pub scalar_type: ScalarType,
    pub empty_count: usize,
    pub non_empty_count: usize,
    pub empty_pct: f64,
    /// Up to 3 sample non-empty values, rendered as display text.
    pub samples: Vec<String>,
    pub bucket: EmptinessBucket,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmptinessReport {
    pub total_rows: usize,
    pub source_column: String,
    pub columns: Vec<ColumnEmptiness>,
}

impl EmptinessReport {
    /// The default removal selection: exactly the drop-recommended bucket.
    pub fn default_removal(&self) -> BTreeSet<String> {
        self.columns
            .iter()
            .filter(|c| c.bucket == EmptinessBucket::DropRecommended)
            .map(|c| c.column.clone())
            .collect()
    }
}
