use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum MergeError {
    /// A selection or plan references a file not in the current batch.
    UnknownFile(String),
    /// A selection names a sheet the file does not have.
    InvalidSheetReference { file: String, sheet: String },
    /// Merge requested with zero files included.
    EmptySelection,
    /// Two non-excluded headers in the same file map to the same final name.
    DuplicateRenameTarget { file: String, target: String },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFile(name) => write!(f, "unknown file: '{name}'"),
            Self::InvalidSheetReference { file, sheet } => {
                write!(f, "file '{file}' has no sheet named '{sheet}'")
            }
            Self::EmptySelection => write!(f, "no files are included in the merge"),
            Self::DuplicateRenameTarget { file, target } => {
                write!(f, "file '{file}': two headers map to the same final name '{target}'")
            }
        }
    }
}

impl std::error::Error for MergeError {}
