// CSV ingestion

use std::collections::HashMap;

use sheetfuse_engine::{CellValue, Table};

use crate::ingest::ImportError;

/// Decode raw bytes to UTF-8, falling back to Windows-1252 (common for
/// Excel-exported CSVs).
fn decode_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Parse CSV bytes into a table. First record is the header row; duplicate
/// header names get a numeric suffix so column names stay unique.
pub fn parse_csv_bytes(file: &str, bytes: &[u8]) -> Result<Table, ImportError> {
    let content = decode_utf8(bytes);
    parse_csv_str(file, &content)
}

pub fn parse_csv_str(file: &str, content: &str) -> Result<Table, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let headers = match records.next() {
        Some(result) => {
            let record = result.map_err(|e| ImportError::Csv {
                file: file.to_string(),
                message: e.to_string(),
            })?;
            dedup_headers(record.iter())
        }
        // Empty input: zero columns, zero rows.
        None => return Ok(Table::new(Vec::new())),
    };

    let mut table = Table::new(headers);

    for result in records {
        let record = result.map_err(|e| ImportError::Csv {
            file: file.to_string(),
            message: e.to_string(),
        })?;
        let row: Vec<CellValue> = record.iter().map(CellValue::from_field).collect();
        table.push_row(row);
    }

    Ok(table)
}

/// Make header names unique: repeats become `name_2`, `name_3`, … The
/// suffix is bumped further if the suffixed name itself already exists.
pub fn dedup_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::new();

    for name in names {
        let base = name.to_string();
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;

        if *count == 1 {
            out.push(base);
            continue;
        }

        let mut n = *count;
        let mut candidate = format!("{base}_{n}");
        while out.iter().any(|existing| *existing == candidate) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        out.push(candidate);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetfuse_engine::ScalarType;

    #[test]
    fn parse_basic_csv() {
        let table = parse_csv_str("t.csv", "Name,Age,City\nJohn,25,Bangkok\nJane,30,Chiang Mai\n")
            .unwrap();
        assert_eq!(
            table.columns(),
            &["Name".to_string(), "Age".to_string(), "City".to_string()]
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 1), Some(&CellValue::Number(25.0)));
        assert_eq!(table.column_type(0), ScalarType::Text);
        assert_eq!(table.column_type(1), ScalarType::Number);
    }

    #[test]
    fn quoted_fields_with_embedded_delimiters() {
        let table = parse_csv_str("t.csv", "Name,Note\n\"Smith, Jane\",\"He said \"\"hi\"\"\"\n")
            .unwrap();
        assert_eq!(table.cell(0, 0), Some(&CellValue::Text("Smith, Jane".into())));
        assert_eq!(table.cell(0, 1), Some(&CellValue::Text("He said \"hi\"".into())));
    }

    #[test]
    fn short_rows_pad_with_missing() {
        let table = parse_csv_str("t.csv", "A,B,C\n1,2\n").unwrap();
        assert_eq!(table.cell(0, 2), Some(&CellValue::Missing));
    }

    #[test]
    fn empty_fields_are_missing() {
        let table = parse_csv_str("t.csv", "A,B\n,x\n").unwrap();
        assert_eq!(table.cell(0, 0), Some(&CellValue::Missing));
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = parse_csv_str("t.csv", "").unwrap();
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn duplicate_headers_suffixed() {
        assert_eq!(
            dedup_headers(["Id", "Name", "Id", "Id"].into_iter()),
            vec!["Id", "Name", "Id_2", "Id_3"]
        );
    }

    #[test]
    fn dedup_avoids_existing_suffixed_name() {
        assert_eq!(
            dedup_headers(["Id", "Id_2", "Id"].into_iter()),
            vec!["Id", "Id_2", "Id_3"]
        );
    }

    #[test]
    fn windows_1252_fallback() {
        // "café" in Windows-1252: é = 0xE9 (invalid as UTF-8 here)
        let bytes = b"Name\ncaf\xe9\n";
        let table = parse_csv_bytes("t.csv", bytes).unwrap();
        assert_eq!(table.cell(0, 0), Some(&CellValue::Text("café".into())));
    }
}
