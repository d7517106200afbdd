use std::collections::BTreeSet;

use sheetfuse_engine::{CellValue, ScalarType, Table};

use crate::model::{ColumnEmptiness, EmptinessBucket, EmptinessReport, MergedTable};

/// Maximum sample values carried per column in the report.
const MAX_SAMPLES: usize = 3;

/// Classify every non-provenance column of a merged table by how empty it
/// is. Percentages are computed against the whole table's row count, so a
/// column contributed by only one source can score very high even when
/// fully populated within that source.
pub fn analyze_emptiness(merged: &MergedTable) -> EmptinessReport {
    let table = &merged.table;
    let total_rows = table.row_count();

    let columns = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| **name != merged.source_column)
        .map(|(idx, name)| analyze_column(table, idx, name, total_rows))
        .collect();

    EmptinessReport {
        total_rows,
        source_column: merged.source_column.clone(),
        columns,
    }
}

fn analyze_column(table: &Table, idx: usize, name: &str, total_rows: usize) -> ColumnEmptiness {
    let scalar_type = table.column_type(idx);

    let mut empty_count = 0;
    let mut samples = Vec::new();

    for cell in table.column_values(idx) {
        if is_effectively_empty(cell, scalar_type) {
            empty_count += 1;
        } else if samples.len() < MAX_SAMPLES {
            samples.push(cell.display());
        }
    }

    // A zero-row table has no cells to be empty; report 0%, not 100%.
    let empty_pct = if total_rows == 0 {
        0.0
    } else {
        empty_count as f64 / total_rows as f64 * 100.0
    };

    ColumnEmptiness {
        column: name.to_string(),
        scalar_type,
        empty_count,
        non_empty_count: total_rows - empty_count,
        empty_pct,
        samples,
        bucket: EmptinessBucket::for_percentage(empty_pct),
    }
}

/// Missing always counts. A blank-after-trim string counts only in
/// text-typed columns; zero and false are never "empty".
fn is_effectively_empty(cell: &CellValue, column_type: ScalarType) -> bool {
    match cell {
        CellValue::Missing => true,
        CellValue::Text(s) => column_type == ScalarType::Text && s.trim().is_empty(),
        _ => false,
    }
}

/// Pure projection: the merged table minus the selected columns. Never
/// mutates its input, so it can be re-applied under different selections
/// without re-running the merge.
pub fn apply_removal(table: &Table, removal: &BTreeSet<String>) -> Table {
    table.select_columns(|name| !removal.contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SOURCE_COLUMN;

    fn merged_from(columns: Vec<&str>, rows: Vec<Vec<CellValue>>) -> MergedTable {
        let mut cols: Vec<String> = columns.into_iter().map(String::from).collect();
        cols.push(SOURCE_COLUMN.to_string());
        let mut table = Table::new(cols);
        for mut row in rows {
            row.push(CellValue::Text("f.csv".into()));
            table.push_row(row);
        }
        MergedTable {
            table,
            source_column: SOURCE_COLUMN.to_string(),
        }
    }

    #[test]
    fn all_missing_column_is_100_pct_drop_recommended() {
        let merged = merged_from(
            vec!["A", "B"],
            vec![
                vec![CellValue::Number(1.0), CellValue::Missing],
                vec![CellValue::Number(2.0), CellValue::Missing],
            ],
        );
        let report = analyze_emptiness(&merged);

        let b = &report.columns[1];
        assert_eq!(b.empty_pct, 100.0);
        assert_eq!(b.bucket, EmptinessBucket::DropRecommended);
        assert_eq!(b.scalar_type, ScalarType::Unknown);
        assert!(b.samples.is_empty());
        assert_eq!(report.default_removal(), BTreeSet::from(["B".to_string()]));
    }

    #[test]
    fn provenance_column_is_skipped() {
        let merged = merged_from(vec!["A"], vec![vec![CellValue::Number(1.0)]]);
        let report = analyze_emptiness(&merged);
        assert_eq!(report.columns.len(), 1);
        assert_eq!(report.columns[0].column, "A");
    }

    #[test]
    fn zero_is_not_empty() {
        let merged = merged_from(
            vec!["N"],
            vec![vec![CellValue::Number(0.0)], vec![CellValue::Bool(false)]],
        );
        let report = analyze_emptiness(&merged);
        assert_eq!(report.columns[0].empty_count, 0);
        assert_eq!(report.columns[0].bucket, EmptinessBucket::Healthy);
    }

    #[test]
    fn date_serial_zero_is_not_empty() {
        // Date columns count only true-missing cells; a 0.0 serial is a
        // real date value, not an empty one.
        let merged = merged_from(
            vec!["When"],
            vec![vec![CellValue::DateTime(0.0)], vec![CellValue::Missing]],
        );
        let report = analyze_emptiness(&merged);

        let when = &report.columns[0];
        assert_eq!(when.scalar_type, ScalarType::Date);
        assert_eq!(when.empty_count, 1);
        assert_eq!(when.non_empty_count, 1);
        assert_eq!(when.empty_pct, 50.0);
        assert_eq!(when.samples, vec!["0"]);
    }

    #[test]
    fn blank_text_counts_only_in_text_columns() {
        // Column types by first non-missing cell: T is text, so "  " is empty
        let merged = merged_from(
            vec!["T"],
            vec![
                vec![CellValue::Text("x".into())],
                vec![CellValue::Text("  ".into())],
            ],
        );
        let report = analyze_emptiness(&merged);
        assert_eq!(report.columns[0].empty_count, 1);
        assert_eq!(report.columns[0].non_empty_count, 1);
        assert_eq!(report.columns[0].empty_pct, 50.0);
        assert_eq!(report.columns[0].bucket, EmptinessBucket::Review);
    }

    #[test]
    fn pct_against_whole_table_rows() {
        // 1 populated row out of 10 total → 90% empty
        let mut rows = vec![vec![CellValue::Number(5.0)]];
        for _ in 0..9 {
            rows.push(vec![CellValue::Missing]);
        }
        let merged = merged_from(vec!["Partial"], rows);
        let report = analyze_emptiness(&merged);
        assert_eq!(report.columns[0].empty_pct, 90.0);
        assert_eq!(report.columns[0].bucket, EmptinessBucket::Review);
    }

    #[test]
    fn samples_cap_at_three() {
        let rows = (1..=5)
            .map(|n| vec![CellValue::Number(n as f64)])
            .collect();
        let merged = merged_from(vec!["N"], rows);
        let report = analyze_emptiness(&merged);
        assert_eq!(report.columns[0].samples, vec!["1", "2", "3"]);
    }

    #[test]
    fn zero_row_table_reports_healthy() {
        let merged = merged_from(vec!["A"], vec![]);
        let report = analyze_emptiness(&merged);
        assert_eq!(report.total_rows, 0);
        assert_eq!(report.columns[0].empty_pct, 0.0);
        assert_eq!(report.columns[0].bucket, EmptinessBucket::Healthy);
    }

    #[test]
    fn removal_is_pure_projection() {
        let merged = merged_from(
            vec!["A", "B"],
            vec![vec![CellValue::Number(1.0), CellValue::Missing]],
        );
        let removal = BTreeSet::from(["B".to_string()]);
        let pruned = apply_removal(&merged.table, &removal);

        assert_eq!(pruned.columns(), &["A", SOURCE_COLUMN].map(String::from));
        assert_eq!(pruned.row_count(), 1);
        // original untouched; re-application under another selection works
        assert_eq!(merged.table.column_count(), 3);
        let pruned2 = apply_removal(&merged.table, &BTreeSet::new());
        assert_eq!(pruned2.column_count(), 3);
    }
}
