//! Doccheck - doc-comment coverage for PHP sources.
//!
//! Doccheck finds classes, interfaces, functions, class variables and class
//! constants that are not immediately preceded by a `/** ... */` comment,
//! and checks that each file opens with one.
//!
//! # Architecture
//!
//! - `lexer`: PHP source to a flat, lossless token stream
//! - `pattern`: backward token patterns for modifier runs
//! - `detect`: attachment rules, the entity scanner and the `Checker`
//! - `config`: report flags and the YAML config file
//! - `report`: reporters and output formatting (text, JSON)
//! - `score`: documentation coverage

use std::sync::Once;

pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod lexer;
pub mod pattern;
pub mod report;
pub mod score;

pub use config::{ConfigFile, ReportConfig};
pub use detect::{Checker, EntityKind, FileReport, Finding, Tally};
pub use error::CheckError;
pub use lexer::{tokenize, Token, TokenKind, TokenStream};
pub use report::{CollectingReporter, ConsoleReporter, Reporter};
pub use score::CoverageScore;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing from `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}
