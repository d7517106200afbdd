// Excel workbook ingestion (xlsx, xls)
//
// One-way conversion: every sheet becomes a header-rowed Table. There is
// no Excel export; merged output leaves as CSV only.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use sheetfuse_engine::{CellValue, Table};

use crate::csv::dedup_headers;
use crate::ingest::ImportError;

/// Parse every sheet of a workbook held in memory. A failure on any one
/// sheet rejects the whole file — no partial ingestion.
pub fn parse_workbook_bytes(file: &str, bytes: &[u8]) -> Result<Vec<(String, Table)>, ImportError> {
    let cursor = Cursor::new(bytes);
    let mut workbook = open_workbook_auto_from_rs(cursor).map_err(|e| ImportError::Workbook {
        file: file.to_string(),
        message: e.to_string(),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(ImportError::Workbook {
            file: file.to_string(),
            message: "workbook contains no sheets".to_string(),
        });
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| ImportError::Sheet {
                file: file.to_string(),
                sheet: sheet_name.clone(),
                message: e.to_string(),
            })?;

        sheets.push((sheet_name.clone(), range_to_table(&range)));
    }

    Ok(sheets)
}

/// First row of the used range is the header row; the rest are data rows.
/// An empty sheet yields a zero-column, zero-row table.
fn range_to_table(range: &calamine::Range<Data>) -> Table {
    let mut rows = range.rows();

    let headers = match rows.next() {
        Some(header_row) => {
            let names: Vec<String> = header_row.iter().map(header_text).collect();
            dedup_headers(names.iter().map(|s| s.as_str()))
        }
        None => return Table::new(Vec::new()),
    };

    let mut table = Table::new(headers);
    for row in rows {
        table.push_row(row.iter().map(data_to_cell).collect());
    }
    table
}

fn header_text(data: &Data) -> String {
    match data {
        Data::String(s) => s.trim().to_string(),
        other => data_to_cell(other).display(),
    }
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Missing,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Missing
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Keep the error marker as text so it survives into the merge
        Data::Error(e) => CellValue::Text(format!("#{e:?}")),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_mapping() {
        assert_eq!(data_to_cell(&Data::Empty), CellValue::Missing);
        assert_eq!(data_to_cell(&Data::String("  ".into())), CellValue::Missing);
        assert_eq!(data_to_cell(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(data_to_cell(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(data_to_cell(&Data::Bool(true)), CellValue::Bool(true));
    }

    #[test]
    fn garbage_bytes_rejected_as_workbook_error() {
        let err = parse_workbook_bytes("junk.xlsx", b"this is not a zip archive").unwrap_err();
        assert!(matches!(err, ImportError::Workbook { .. }));
    }
}
