use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use micalint::diagnostics::{render_error, ReportedDiagnostic};
use micalint::span::line_col;
use micalint::{analyze_source, display_path};

#[derive(Parser)]
#[command(
    name = "micalint",
    version,
    about = "Flag closure bodies that reach an outer variable when a similarly typed parameter is closer"
)]
struct Cli {
    /// Source files to analyze, in order.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Emit findings as a JSON array instead of one line per finding.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut reports: Vec<ReportedDiagnostic> = Vec::new();
    for path in &cli.files {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                println!("loader: {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        };
        let display = display_path(path);
        match analyze_source(&source) {
            Ok(diags) => {
                reports.extend(diags.into_iter().map(|d| {
                    let (line, col) = line_col(&source, d.span.start);
                    ReportedDiagnostic {
                        path: display.clone(),
                        line,
                        col,
                        suggestion: d.suggestion,
                    }
                }));
            }
            Err(err) => {
                render_error(&source, &display, &err);
                println!("loader: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&reports) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("error: could not serialize findings: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for report in &reports {
            println!("{report}");
        }
    }

    if reports.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
