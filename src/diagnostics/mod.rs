use crate::span::Span;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A fatal frontend failure: the input could not be loaded, parsed, or checked.
/// The driver reports these with a `loader: ` prefix and exits immediately.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{path}: {msg}")]
    Io { msg: String, path: String },

    #[error("syntax error: {msg}")]
    Syntax { msg: String, span: Span },

    #[error("type error: {msg}")]
    Type { msg: String, span: Span },
}

impl CheckError {
    pub fn io(msg: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io { msg: msg.into(), path: path.into() }
    }

    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        Self::Syntax { msg: msg.into(), span }
    }

    pub fn type_err(msg: impl Into<String>, span: Span) -> Self {
        Self::Type { msg: msg.into(), span }
    }
}

/// Render a CheckError with ariadne for nice terminal output.
pub fn render_error(source: &str, _filename: &str, err: &CheckError) {
    use ariadne::{Label, Report, ReportKind, Source};

    match err {
        CheckError::Syntax { msg, span } | CheckError::Type { msg, span } => {
            let kind_str = match err {
                CheckError::Syntax { .. } => "syntax",
                _ => "type",
            };
            Report::build(ReportKind::Error, (), span.start)
                .with_message(format!("{kind_str} error"))
                .with_label(
                    Label::new(span.start..span.end)
                        .with_message(msg),
                )
                .finish()
                .eprint(Source::from(source))
                .ok();
        }
        CheckError::Io { msg, path } => {
            eprintln!("error: {path}: {msg}");
        }
    }
}

/// A shadow finding resolved to a file position, ready for printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedDiagnostic {
    pub path: String,
    pub line: u32,
    pub col: u32,
    pub suggestion: String,
}

impl fmt::Display for ReportedDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: accessing outer scope when closer var of same type exists. Did you mean {}?",
            self.path, self.line, self.col, self.suggestion
        )
    }
}
