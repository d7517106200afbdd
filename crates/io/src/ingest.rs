use std::fmt;
use std::path::Path;

use sheetfuse_engine::Table;

use crate::{csv as csv_io, xlsx, CSV_SHEET_NAME};

/// Detected file kind, decided purely by filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Spreadsheet,
    Unknown,
}

impl FileKind {
    /// Case-insensitive extension match: `.csv` → Csv, `.xlsx`/`.xls` →
    /// Spreadsheet, anything else → Unknown.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            FileKind::Csv
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            FileKind::Spreadsheet
        } else {
            FileKind::Unknown
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Spreadsheet => write!(f, "spreadsheet"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug)]
pub enum ImportError {
    /// Extension is neither .csv nor .xlsx/.xls.
    UnsupportedExtension(String),
    /// Malformed CSV content.
    Csv { file: String, message: String },
    /// Workbook could not be opened (corrupt or wrong format).
    Workbook { file: String, message: String },
    /// One sheet failed to read; the whole file is rejected.
    Sheet { file: String, sheet: String, message: String },
    /// Underlying file read error.
    Io { file: String, message: String },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedExtension(name) => {
                write!(f, "unsupported file type: '{name}' (expected .csv, .xlsx or .xls)")
            }
            Self::Csv { file, message } => write!(f, "'{file}': malformed CSV: {message}"),
            Self::Workbook { file, message } => {
                write!(f, "'{file}': cannot open workbook: {message}")
            }
            Self::Sheet { file, sheet, message } => {
                write!(f, "'{file}', sheet '{sheet}': {message}")
            }
            Self::Io { file, message } => write!(f, "'{file}': {message}"),
        }
    }
}

impl std::error::Error for ImportError {}

/// One ingested upload. Immutable once built; a new upload batch replaces
/// the whole set.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub byte_size: usize,
    pub kind: FileKind,
    /// Sheet names in workbook order. CSV files have exactly one.
    pub sheet_names: Vec<String>,
    /// Parsed table per sheet name, same order as `sheet_names`.
    sheets: Vec<(String, Table)>,
}

impl SourceFile {
    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn first_sheet_name(&self) -> &str {
        &self.sheet_names[0]
    }
}

/// A file that failed to ingest. The rest of the batch continues.
#[derive(Debug)]
pub struct IngestFailure {
    pub name: String,
    pub error: ImportError,
}

/// Parse one uploaded file from its bytes.
pub fn ingest_bytes(name: &str, bytes: &[u8]) -> Result<SourceFile, ImportError> {
    let kind = FileKind::from_name(name);
    let sheets = match kind {
        FileKind::Csv => {
            let table = csv_io::parse_csv_bytes(name, bytes)?;
            vec![(CSV_SHEET_NAME.to_string(), table)]
        }
        FileKind::Spreadsheet => xlsx::parse_workbook_bytes(name, bytes)?,
        FileKind::Unknown => return Err(ImportError::UnsupportedExtension(name.to_string())),
    };

    Ok(SourceFile {
        name: name.to_string(),
        byte_size: bytes.len(),
        kind,
        sheet_names: sheets.iter().map(|(n, _)| n.clone()).collect(),
        sheets,
    })
}

/// Parse one uploaded file from disk. The file's base name becomes its
/// identity within the session.
pub fn ingest_path(path: &Path) -> Result<SourceFile, ImportError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let bytes = std::fs::read(path).map_err(|e| ImportError::Io {
        file: name.clone(),
        message: e.to_string(),
    })?;

    ingest_bytes(&name, &bytes)
}

/// Ingest a batch of files. Failures are per-file: one corrupt upload is
/// reported and skipped, the remaining files still ingest.
pub fn ingest_batch(paths: &[std::path::PathBuf]) -> (Vec<SourceFile>, Vec<IngestFailure>) {
    let mut files = Vec::new();
    let mut failures = Vec::new();

    for path in paths {
        match ingest_path(path) {
            Ok(file) => files.push(file),
            Err(error) => failures.push(IngestFailure {
                name: path.to_string_lossy().into_owned(),
                error,
            }),
        }
    }

    (files, failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(FileKind::from_name("test.csv"), FileKind::Csv);
        assert_eq!(FileKind::from_name("TEST.CSV"), FileKind::Csv);
        assert_eq!(FileKind::from_name("book.xlsx"), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_name("book.XLS"), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_name("notes.txt"), FileKind::Unknown);
        assert_eq!(FileKind::from_name("noext"), FileKind::Unknown);
    }

    #[test]
    fn csv_ingests_as_single_sheet() {
        let file = ingest_bytes("a.csv", b"Name,Age\nJohn,25\n").unwrap();
        assert_eq!(file.kind, FileKind::Csv);
        assert_eq!(file.sheet_names, vec!["Sheet1"]);
        let table = file.sheet("Sheet1").unwrap();
        assert_eq!(table.columns(), &["Name".to_string(), "Age".to_string()]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn unknown_extension_rejected() {
        let err = ingest_bytes("a.txt", b"whatever").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedExtension(_)));
    }

    #[test]
    fn batch_recovers_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        let bad = dir.path().join("bad.pdf");
        std::fs::write(&good, "A,B\n1,2\n").unwrap();
        std::fs::write(&bad, "not a table").unwrap();

        let (files, failures) = ingest_batch(&[good, bad]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "good.csv");
        assert_eq!(failures.len(), 1);
    }
}
