//! Compile, validate and merge queries for the CLI

use chrono::FixedOffset;

use super::{CliError, node_to_json};
use crate::{Format, ParseOptions, QueryNode, parse_with};

/// Options shared by the parse, check and merge commands
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The RQL query to compile
    pub query: String,
    /// Render in the normalized (fully functional) format
    pub normalized: bool,
    /// Emit the tree as JSON instead of RQL text
    pub json: bool,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Only validate, don't render
    pub syntax_only: bool,
    /// Lexer and parser settings
    pub parse: ParseOptions,
}

impl CheckOptions {
    fn format(&self) -> Format {
        if self.normalized {
            Format::Normalized
        } else {
            Format::Standard
        }
    }
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// The query compiled and validated
    Valid,
    /// RQL text in the requested format
    Text(String),
    /// Tree as JSON
    Json(serde_json::Value),
}

/// Parses `+HH:MM` / `-HH:MM` (or `Z`) into a fixed offset.
pub fn parse_offset(text: &str) -> Result<FixedOffset, CliError> {
    if text.eq_ignore_ascii_case("z") || text.eq_ignore_ascii_case("utc") {
        return Ok(ParseOptions::utc().local_offset);
    }
    text.parse::<FixedOffset>()
        .map_err(|_| CliError::InvalidOffset(text.to_string()))
}

fn render(node: &QueryNode, options: &CheckOptions) -> CheckResult {
    if options.syntax_only {
        CheckResult::Valid
    } else if options.json {
        CheckResult::Json(node_to_json(node))
    } else {
        CheckResult::Text(node.to_string_format(options.format()))
    }
}

/// Compile a query and render it as requested
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let node = parse_with(&options.query, &options.parse)?;
    Ok(render(&node, options))
}

/// Compile `options.query` and `other`, then merge them
pub fn execute_merge(options: &CheckOptions, other: &str) -> Result<CheckResult, CliError> {
    let left = parse_with(&options.query, &options.parse)?;
    let right = parse_with(other, &options.parse)?;
    let merged = left.merge(&right)?;
    Ok(render(&merged, options))
}
