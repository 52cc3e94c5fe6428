//! CLI support for rql-lang
//!
//! Provides programmatic access to the `rql` commands so other tools can
//! compile, check and merge queries the same way the binary does.

mod check;
mod convert;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check, execute_merge, parse_offset};
pub use convert::{node_to_json, value_to_json};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use crate::RqlError;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Lexical, syntax or validation error in a query
    Query(RqlError),
    /// JSON serialization error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No query given and nothing piped to stdin
    NoInput,
    /// `--offset` value that is not `+HH:MM` / `-HH:MM`
    InvalidOffset(String),
    /// Unknown documentation category
    UnknownCategory(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Query(e) => write!(f, "Query error: {}", e),
            CliError::Json(e) => write!(f, "JSON error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => write!(f, "No query provided. Pass it as an argument or pipe it to stdin."),
            CliError::InvalidOffset(o) => {
                write!(f, "Invalid offset: '{}' (expected a value such as +02:00 or -05:30)", o)
            }
            CliError::UnknownCategory(c) => {
                write!(f, "Unknown category: '{}'\nRun 'rql docs' to see available categories.", c)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Query(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RqlError> for CliError {
    fn from(e: RqlError) -> Self {
        CliError::Query(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
