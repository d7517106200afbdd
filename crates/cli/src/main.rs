// sheetfuse CLI - headless multi-file merge operations

mod exit_codes;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_IO, EXIT_PARSE, EXIT_SUCCESS};
use pipeline::{apply_plan, build_session, merge_err, report_failures, PlanArgs, SelectionArgs};
use sheetfuse_io::export::{default_download_filename, export_csv};
use sheetfuse_io::ingest_batch;

/// Structured CLI failure: exit code + message, optional hint.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Parser)]
#[command(name = "sfuse")]
#[command(about = "Merge CSV and Excel files with header reconciliation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List each file's kind, sheets, headers and row counts
    #[command(after_help = "\
Examples:
  sfuse inspect january.csv february.xlsx")]
    Inspect {
        /// Files to ingest (.csv, .xlsx, .xls)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Analyze header consistency across the included files
    #[command(after_help = "\
Examples:
  sfuse headers a.csv b.csv
  sfuse headers a.csv book.xlsx --sheet book.xlsx=Q2 --json")]
    Headers {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge the included files into one CSV with provenance tracking
    #[command(after_help = "\
Examples:
  sfuse merge a.csv b.csv -o merged.csv
  sfuse merge a.csv b.csv --map b.csv:Country=City --drop b.csv:Notes
  sfuse merge a.csv book.xlsx --sheet book.xlsx=Q2")]
    Merge {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        plan: PlanArgs,

        /// Output path (default: merged_file_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a JSON summary instead of the human one
        #[arg(long)]
        json_summary: bool,
    },

    /// Merge, then report how empty each output column is
    #[command(after_help = "\
Examples:
  sfuse analyze a.csv b.csv
  sfuse analyze a.csv b.csv --map b.csv:Country=City --json")]
    Analyze {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        plan: PlanArgs,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge and drop near-empty columns before export
    #[command(after_help = "\
Examples:
  sfuse prune a.csv b.csv -o clean.csv
  sfuse prune a.csv b.csv --remove Notes --remove Ghost

Without --remove, the drop-recommended bucket (>=95% empty) is removed.")]
    Prune {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        plan: PlanArgs,

        /// Remove these columns instead of the automatic selection
        #[arg(long = "remove", value_name = "COLUMN")]
        removals: Vec<String>,

        /// Output path (default: merged_file_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = &e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Inspect { files } => cmd_inspect(&files),
        Commands::Headers { selection, json } => cmd_headers(&selection, json),
        Commands::Merge { selection, plan, output, json_summary } => {
            cmd_merge(&selection, &plan, output, json_summary)
        }
        Commands::Analyze { selection, plan, json } => cmd_analyze(&selection, &plan, json),
        Commands::Prune { selection, plan, removals, output } => {
            cmd_prune(&selection, &plan, &removals, output)
        }
    }
}

fn cmd_inspect(paths: &[PathBuf]) -> Result<(), CliError> {
    let (files, failures) = ingest_batch(paths);
    report_failures(&failures);

    if files.is_empty() {
        return Err(CliError {
            code: EXIT_PARSE,
            message: "no usable input files".to_string(),
            hint: None,
        });
    }

    for file in &files {
        println!("{} ({}, {} bytes)", file.name, file.kind, file.byte_size);
        for sheet_name in &file.sheet_names {
            if let Some(table) = file.sheet(sheet_name) {
                println!(
                    "  {}: {} rows x {} columns [{}]",
                    sheet_name,
                    table.row_count(),
                    table.column_count(),
                    table.columns().join(", ")
                );
            }
        }
    }

    Ok(())
}

fn cmd_headers(selection: &SelectionArgs, json: bool) -> Result<(), CliError> {
    let mut session = build_session(selection)?;
    let report = session.header_report().map_err(merge_err)?;

    if json {
        println!("{}", json_pretty(report)?);
        return Ok(());
    }

    println!(
        "{} file(s) included, {}",
        report.included_count,
        if report.has_mismatch {
            "headers MISMATCH"
        } else {
            "headers consistent"
        }
    );
    println!("union: {}", report.union.join(", "));

    for file in &report.per_file {
        println!("\n{} ({}):", file.file, file.sheet);
        for header in &file.headers {
            let marker = match header.status {
                sheetfuse_merge::MatchStatus::Match => "match",
                sheetfuse_merge::MatchStatus::NoMatch => "no match",
                sheetfuse_merge::MatchStatus::SingleFile => "-",
            };
            println!("  {:<24} {marker}", header.name);
        }
    }

    Ok(())
}

fn cmd_merge(
    selection: &SelectionArgs,
    plan: &PlanArgs,
    output: Option<PathBuf>,
    json_summary: bool,
) -> Result<(), CliError> {
    let mut session = build_session(selection)?;
    apply_plan(&mut session, plan)?;

    let merged = session.merge().map_err(merge_err)?;
    let out_path = output.unwrap_or_else(|| PathBuf::from(default_download_filename()));
    write_csv(&merged.table, &out_path)?;

    if json_summary {
        let summary = serde_json::json!({
            "output": out_path.display().to_string(),
            "rows": merged.table.row_count(),
            "columns": merged.table.columns(),
            "source_column": merged.source_column,
        });
        println!("{summary}");
    } else {
        println!(
            "merged {} rows x {} columns -> {}",
            merged.table.row_count(),
            merged.table.column_count(),
            out_path.display()
        );
    }

    Ok(())
}

fn cmd_analyze(selection: &SelectionArgs, plan: &PlanArgs, json: bool) -> Result<(), CliError> {
    let mut session = build_session(selection)?;
    apply_plan(&mut session, plan)?;

    let report = session.emptiness_report().map_err(merge_err)?;

    if json {
        println!("{}", json_pretty(report)?);
        return Ok(());
    }

    println!("{} rows merged; per-column emptiness:", report.total_rows);
    for col in &report.columns {
        println!(
            "  {:<24} {:>6.1}% empty  {:<16} {}  [{}]",
            col.column,
            col.empty_pct,
            format!("({})", col.bucket),
            col.scalar_type,
            col.samples.join(", ")
        );
    }

    Ok(())
}

fn cmd_prune(
    selection: &SelectionArgs,
    plan: &PlanArgs,
    removals: &[String],
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut session = build_session(selection)?;
    apply_plan(&mut session, plan)?;

    // Compute the report first so the default removal selection exists;
    // explicit --remove flags then override it.
    session.emptiness_report().map_err(merge_err)?;
    if !removals.is_empty() {
        session.set_removal(removals.iter().cloned().collect());
    }

    let dropped: Vec<String> = session.removal().iter().cloned().collect();
    let pruned = session.pruned().map_err(merge_err)?;

    let out_path = output.unwrap_or_else(|| PathBuf::from(default_download_filename()));
    write_csv(&pruned, &out_path)?;

    println!(
        "pruned {} column(s) [{}]; wrote {} rows x {} columns -> {}",
        dropped.len(),
        dropped.join(", "),
        pruned.row_count(),
        pruned.column_count(),
        out_path.display()
    );

    Ok(())
}

fn write_csv(table: &sheetfuse_engine::Table, path: &PathBuf) -> Result<(), CliError> {
    export_csv(table, path).map_err(|message| CliError {
        code: EXIT_IO,
        message,
        hint: None,
    })
}

fn json_pretty<T: serde::Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError {
        code: EXIT_IO,
        message: e.to_string(),
        hint: None,
    })
}
