//! Detection of missing doc-comments.
//!
//! The [`Checker`] drives files and directories through the lexer and the
//! entity [`scanner`], which applies the attachment [`rules`] to every
//! declaration it finds.

pub mod rules;
mod runner;
pub mod scanner;
mod types;

pub use runner::{is_php_file, Checker};
pub use scanner::{scan, ContextKind, ContextStack, EntityContext, ScanState, Scanner};
pub use types::{EntityKind, FileReport, Finding, KindCount, Tally};
