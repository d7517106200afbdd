use sheetfuse_engine::{CellValue, Table};
use sheetfuse_io::SourceFile;

use crate::error::MergeError;
use crate::model::{MergedTable, SelectionMap, SOURCE_COLUMN};
use crate::plan::HeaderPlan;

/// Merge the included files' chosen sheets into a single table.
///
/// Per file: excluded columns are dropped, survivors renamed per the plan,
/// then rows are concatenated under the outer union of final column names.
/// A column absent from some file yields `Missing` for that file's rows.
/// Each row carries its source filename in the provenance column, which is
/// always the last column. Row order: files in selection order, rows in
/// original order.
///
/// Zero included files yields an empty table (no rows, no columns), not an
/// error — the interactive path blocks that case before calling here.
pub fn merge_files(
    files: &[SourceFile],
    selections: &SelectionMap,
    plan: &HeaderPlan,
) -> Result<MergedTable, MergeError> {
    plan.validate(files, selections)?;

    // Per included file: (name, final column names, source table, kept indices)
    let mut contributions: Vec<(&str, Vec<String>, &Table, Vec<usize>)> = Vec::new();

    for file in files {
        let selection = selections.for_file(file);
        if !selection.included {
            continue;
        }
        let table = file
            .sheet(&selection.sheet)
            .ok_or_else(|| MergeError::InvalidSheetReference {
                file: file.name.clone(),
                sheet: selection.sheet.clone(),
            })?;

        let mut final_names = Vec::new();
        let mut kept = Vec::new();
        for (idx, header) in table.columns().iter().enumerate() {
            if let Some(final_name) = plan.final_name(&file.name, header) {
                final_names.push(final_name);
                kept.push(idx);
            }
        }

        contributions.push((&file.name, final_names, table, kept));
    }

    if contributions.is_empty() {
        return Ok(MergedTable {
            table: Table::new(Vec::new()),
            source_column: SOURCE_COLUMN.to_string(),
        });
    }

    // Outer union of final names, first-seen order
    let mut union: Vec<String> = Vec::new();
    for (_, final_names, _, _) in &contributions {
        for name in final_names {
            if !union.contains(name) {
                union.push(name.clone());
            }
        }
    }

    let source_column = reserve_source_column(&union);

    let mut columns = union.clone();
    columns.push(source_column.clone());
    let width = columns.len();
    let mut merged = Table::new(columns);

    for (file_name, final_names, table, kept) in &contributions {
        // Map each kept source column to its slot in the union
        let slots: Vec<usize> = final_names
            .iter()
            .map(|name| {
                union
                    .iter()
                    .position(|u| u == name)
                    .unwrap_or(width - 1) // unreachable: union was built from final_names
            })
            .collect();

        for row in table.rows() {
            let mut out = vec![CellValue::Missing; width];
            for (&src_idx, &slot) in kept.iter().zip(&slots) {
                out[slot] = row[src_idx].clone();
            }
            out[width - 1] = CellValue::Text(file_name.to_string());
            merged.push_row(out);
        }
    }

    Ok(MergedTable {
        table: merged,
        source_column,
    })
}

/// Pick the provenance column name: the reserved name, or — when a user
/// column already claims it — the first free suffixed variant.
fn reserve_source_column(union: &[String]) -> String {
    if !union.iter().any(|c| c == SOURCE_COLUMN) {
        return SOURCE_COLUMN.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{SOURCE_COLUMN}_{n}");
        if !union.iter().any(|c| *c == candidate) {
            return candidate;
        }
        n += 1;
    }
}
