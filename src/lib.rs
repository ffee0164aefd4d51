pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod shadow;
pub mod span;
pub mod typeck;
pub mod visit;

use std::path::Path;

use diagnostics::{CheckError, ReportedDiagnostic};
use shadow::ShadowDiagnostic;
use span::line_col;

/// Run the whole pipeline over one source string. Findings come back in
/// source order; a `CheckError` means the input never made it to analysis.
pub fn analyze_source(source: &str) -> Result<Vec<ShadowDiagnostic>, CheckError> {
    let tokens = lexer::lex(source)?;
    let file = parser::Parser::new(&tokens, source).parse_file()?;
    let checked = typeck::check(&file)?;
    Ok(shadow::analyze(&file, &checked))
}

/// Analyze the file at `path` and resolve findings to line and column.
pub fn analyze_file(path: &Path) -> Result<Vec<ReportedDiagnostic>, CheckError> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| CheckError::io(e.to_string(), path.display().to_string()))?;
    let display = display_path(path);
    let diags = analyze_source(&source)?;
    Ok(diags
        .into_iter()
        .map(|d| {
            let (line, col) = line_col(&source, d.span.start);
            ReportedDiagnostic { path: display.clone(), line, col, suggestion: d.suggestion }
        })
        .collect())
}

/// Paths under the working directory print relative to it, anything else
/// prints as given.
pub fn display_path(path: &Path) -> String {
    if let (Ok(abs), Ok(cwd)) = (path.canonicalize(), std::env::current_dir()) {
        if let Ok(rel) = abs.strip_prefix(&cwd) {
            return rel.display().to_string();
        }
    }
    path.display().to_string()
}
