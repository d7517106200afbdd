//! Flag parsing and session assembly shared by the subcommands.

use std::path::PathBuf;

use clap::Args;
use sheetfuse_io::{ingest_batch, IngestFailure};
use sheetfuse_merge::{HeaderPlan, MergeSession};

use crate::exit_codes::{EXIT_MERGE, EXIT_PARSE, EXIT_USAGE};
use crate::CliError;

/// Input files plus per-file selection flags.
#[derive(Args)]
pub struct SelectionArgs {
    /// Files to ingest (.csv, .xlsx, .xls)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Choose a sheet for one file (default: its first sheet)
    #[arg(long = "sheet", value_name = "FILE=SHEET")]
    pub sheets: Vec<String>,

    /// Leave one file out of the merge
    #[arg(long = "exclude-file", value_name = "FILE")]
    pub exclude_files: Vec<String>,
}

/// Per-header reconciliation flags.
#[derive(Args)]
pub struct PlanArgs {
    /// Rename a header before merging
    #[arg(long = "map", value_name = "FILE:OLD=NEW")]
    pub maps: Vec<String>,

    /// Drop a header from one file's contribution
    #[arg(long = "drop", value_name = "FILE:HEADER")]
    pub drops: Vec<String>,
}

pub fn usage_err(message: impl Into<String>, hint: Option<&str>) -> CliError {
    CliError {
        code: EXIT_USAGE,
        message: message.into(),
        hint: hint.map(String::from),
    }
}

pub fn merge_err(e: sheetfuse_merge::MergeError) -> CliError {
    CliError {
        code: EXIT_MERGE,
        message: e.to_string(),
        hint: None,
    }
}

/// `FILE=SHEET` → (file, sheet).
fn parse_sheet_spec(spec: &str) -> Result<(&str, &str), CliError> {
    spec.split_once('=')
        .ok_or_else(|| usage_err(format!("bad --sheet spec: '{spec}'"), Some("expected FILE=SHEET")))
}

/// `FILE:OLD=NEW` → (file, old, new).
fn parse_map_spec(spec: &str) -> Result<(&str, &str, &str), CliError> {
    let (file, rest) = spec
        .split_once(':')
        .ok_or_else(|| usage_err(format!("bad --map spec: '{spec}'"), Some("expected FILE:OLD=NEW")))?;
    let (old, new) = rest
        .split_once('=')
        .ok_or_else(|| usage_err(format!("bad --map spec: '{spec}'"), Some("expected FILE:OLD=NEW")))?;
    Ok((file, old, new))
}

/// `FILE:HEADER` → (file, header).
fn parse_drop_spec(spec: &str) -> Result<(&str, &str), CliError> {
    spec.split_once(':')
        .ok_or_else(|| usage_err(format!("bad --drop spec: '{spec}'"), Some("expected FILE:HEADER")))
}

/// Report per-file ingestion failures on stderr; the batch continues.
pub fn report_failures(failures: &[IngestFailure]) {
    for failure in failures {
        eprintln!("warning: skipping {}: {}", failure.name, failure.error);
    }
}

/// Ingest the batch and build a session with selections applied.
/// Fails only when *every* file failed to ingest.
pub fn build_session(selection: &SelectionArgs) -> Result<MergeSession, CliError> {
    let (files, failures) = ingest_batch(&selection.files);
    report_failures(&failures);

    if files.is_empty() {
        return Err(CliError {
            code: EXIT_PARSE,
            message: "no usable input files".to_string(),
            hint: None,
        });
    }

    let mut session = MergeSession::new();
    session.load_batch(files);

    for spec in &selection.sheets {
        let (file, sheet) = parse_sheet_spec(spec)?;
        session.set_sheet(file, sheet).map_err(merge_err)?;
    }

    for file in &selection.exclude_files {
        session.set_included(file, false).map_err(merge_err)?;
    }

    Ok(session)
}

/// Layer the plan flags onto a session. A spec naming a file that is not
/// in the ingested batch would otherwise be a silent no-op (the plan only
/// walks ingested files), so it is rejected here instead.
pub fn apply_plan(session: &mut MergeSession, plan_args: &PlanArgs) -> Result<(), CliError> {
    if plan_args.maps.is_empty() && plan_args.drops.is_empty() {
        return Ok(());
    }

    let check_file = |flag: &str, file: &str| -> Result<(), CliError> {
        if session.files().iter().any(|f| f.name == file) {
            Ok(())
        } else {
            Err(usage_err(
                format!("{flag} references unknown file '{file}'"),
                Some("the file must be one of the ingested inputs"),
            ))
        }
    };

    let mut plan = HeaderPlan::new();
    for spec in &plan_args.maps {
        let (file, old, new) = parse_map_spec(spec)?;
        check_file("--map", file)?;
        plan.rename(file, old, new);
    }
    for spec in &plan_args.drops {
        let (file, header) = parse_drop_spec(spec)?;
        check_file("--drop", file)?;
        plan.exclude(file, header);
    }

    session.set_plan(plan);
    Ok(())
}
