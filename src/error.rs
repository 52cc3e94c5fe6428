//! Error type shared by the lexer, the parser and the query tree operations.

use thiserror::Error;

/// The single error kind raised while compiling or combining RQL queries.
///
/// Every failure is fatal: no partial tree is returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RqlError {
    /// Malformed or incomplete literal, bad escape, or end of input inside a token.
    #[error("lexical error at position {position}: {message}")]
    Lex { position: usize, message: String },

    /// Token out of place for the current grammar position.
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// Conflicting or duplicated clauses found by whole-tree validation.
    #[error("invalid query: {0}")]
    Semantic(String),

    /// A child that the target node's shape does not accept.
    #[error("invalid node: {0}")]
    Shape(String),
}

impl RqlError {
    pub fn lex(position: usize, message: impl Into<String>) -> Self {
        Self::Lex {
            position,
            message: message.into(),
        }
    }

    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Self::Semantic(message.into())
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    /// The human-readable part of the error, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Lex { message, .. } | Self::Syntax { message, .. } => message,
            Self::Semantic(message) | Self::Shape(message) => message,
        }
    }
}

/// Result type alias for RQL operations.
pub type Result<T> = std::result::Result<T, RqlError>;
