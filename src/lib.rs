//! Core library for the SELECTWAY scripting language: expression evaluation,
//! statement execution, and the helpers behind the interactive shell.

pub mod ast;
pub mod diagnostics;
pub mod evaluator;
pub mod host;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runtime;
pub mod scripts;
pub mod statement;
pub mod store;
pub mod value;

use std::sync::Once;

pub use diagnostics::{Diagnostic, DiagnosticKind, Result, SelectwayError, SourceSpan};
pub use evaluator::{evaluate, try_evaluate};
pub use parser::PlusSplit;
pub use repl::Repl;
pub use runtime::{run, ExecutionContext, Interpreter};
pub use store::VariableStore;
pub use value::Value;

static TRACING_INIT: Once = Once::new();

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, so program output on stdout stays
/// clean. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
