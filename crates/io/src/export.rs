// CSV export

use std::path::Path;

use chrono::{DateTime, Local};
use sheetfuse_engine::Table;

/// Render a table as CSV text: header line first, then rows in declared
/// column order. Missing cells become empty fields; quoting and escaping
/// are the csv writer's (quotes doubled, fields with comma/quote/newline
/// wrapped in double quotes).
pub fn to_csv_string(table: &Table) -> Result<String, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(table.columns())
        .map_err(|e| e.to_string())?;

    for row in table.rows() {
        let record: Vec<String> = row.iter().map(|cell| cell.display()).collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

pub fn export_csv(table: &Table, path: &Path) -> Result<(), String> {
    let text = to_csv_string(table)?;
    std::fs::write(path, text).map_err(|e| e.to_string())
}

/// Download filename stamped with the given local time:
/// `merged_file_<YYYYMMDD>_<HHMMSS>.csv`.
pub fn download_filename(now: DateTime<Local>) -> String {
    now.format("merged_file_%Y%m%d_%H%M%S.csv").to_string()
}

pub fn default_download_filename() -> String {
    download_filename(Local::now())
}
