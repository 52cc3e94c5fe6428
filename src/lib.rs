pub mod ast;
pub mod error;
pub mod lexer;
pub mod members;
pub mod options;
pub mod output;
pub mod parser;
pub mod queue;
pub mod reader;
pub mod transform;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{
    AggregateOp, Child, CompareOp, Limit, MatchOp, MembershipOp, Operation, Property, QueryNode,
    SortOrder, SortProperty, Symbol, Token,
};
pub use error::{Result, RqlError};
pub use lexer::{Lexer, scan};
pub use members::MemberSet;
pub use options::ParseOptions;
pub use output::{Format, QueryPrinter};
pub use parser::{Parser, parse, parse_with};
pub use queue::TokenQueue;
pub use reader::CharReader;
pub use value::{DateTimeKind, DateTimeValue, Value};
