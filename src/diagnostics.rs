use std::fmt;

use thiserror::Error;

/// Represents a byte span within an expression or source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Classification of a diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexer,
    Parser,
    Runtime,
    Condition,
    Usage,
    UnknownStatement,
}

/// Rich diagnostic information surfaced to end users.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Option<SourceSpan>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            notes: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// One-line form written to the program's output when a statement fails.
    pub fn summary(&self) -> String {
        if self.notes.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, self.notes.join("; "))
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)?;
        if let Some(span) = self.span {
            write!(f, " ({}..{})", span.start, span.end)?;
        }
        if !self.notes.is_empty() {
            writeln!(f)?;
            for note in &self.notes {
                writeln!(f, "  note: {note}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

/// Errors that end a program run. Statement-level problems are reported
/// and skipped instead; they only surface here through `Diagnostic` when a
/// caller asks for a strict result such as `try_evaluate`.
#[derive(Debug, Error)]
pub enum SelectwayError {
    #[error("{0}")]
    Diagnostic(#[from] Diagnostic),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("input ended while reading a value for `{target}`")]
    InputExhausted { target: String },
    #[error("loop exceeded the limit of {limit} iterations")]
    IterationLimit { limit: u64 },
    #[error("execution interrupted")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, SelectwayError>;
