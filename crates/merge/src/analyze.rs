use std::collections::BTreeSet;

use sheetfuse_io::SourceFile;

use crate::error::MergeError;
use crate::model::{FileHeaders, HeaderReport, HeaderStatus, MatchStatus, SelectionMap};

/// Analyze headers across the included files' chosen sheets.
///
/// `has_mismatch` is a set-equality check against the first included file:
/// supersets and subsets both count as mismatches. With fewer than two
/// included files it is vacuously false.
pub fn analyze_headers(
    files: &[SourceFile],
    selections: &SelectionMap,
) -> Result<HeaderReport, MergeError> {
    // (file, sheet, headers) per included file, in upload order
    let mut included: Vec<(&str, String, Vec<String>)> = Vec::new();

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
        included.push((&file.name, selection.sheet, table.columns().to_vec()));
    }

    let mut union: Vec<String> = Vec::new();
    for (_, _, headers) in &included {
        for header in headers {
            if !union.contains(header) {
                union.push(header.clone());
            }
        }
    }

    let header_sets: Vec<BTreeSet<&String>> = included
        .iter()
        .map(|(_, _, headers)| headers.iter().collect())
        .collect();

    let has_mismatch = header_sets.len() >= 2
        && header_sets[1..].iter().any(|set| *set != header_sets[0]);

    let single_file = included.len() < 2;
    let per_file = included
        .iter()
        .enumerate()
        .map(|(i, (file, sheet, headers))| FileHeaders {
            file: file.to_string(),
            sheet: sheet.clone(),
            headers: headers
                .iter()
                .map(|header| HeaderStatus {
                    name: header.clone(),
                    status: if single_file {
                        MatchStatus::SingleFile
                    } else if header_sets
                        .iter()
                        .enumerate()
                        .any(|(j, set)| j != i && set.contains(header))
                    {
                        MatchStatus::Match
                    } else {
                        MatchStatus::NoMatch
                    },
                })
                .collect(),
        })
        .collect();

    Ok(HeaderReport {
        union,
        has_mismatch,
        included_count: included.len(),
        per_file,
    })
}
