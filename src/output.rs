//! Text rendering of query trees.
//!
//! Two formats are available, and both parse back to an equal tree:
//!
//! - **Standard** - the surface syntax a client would write: infix
//!   comparisons joined with `&` and `|`, functional syntax for everything
//!   else. This is what [`Display`](std::fmt::Display) produces.
//! - **Normalized** - fully functional, e.g. `and(eq(Name,"John"),gt(Age,30))`,
//!   with every sort key carrying an explicit `+` or `-`.
//!
//! Literals are written so their type survives the round trip: `5` is an
//! int32, `5L` an int64, `5U` a uint32, `byte:5` a uint8, `1.5D` a double.
//!
//! # Examples
//!
//! ```
//! use rql_lang::{parse, Format};
//!
//! let node = parse("Name=John&sort(Age)").unwrap();
//! assert_eq!(node.to_string(), r#"Name="John"&sort(Age)"#);
//! assert_eq!(
//!     node.to_string_format(Format::Normalized),
//!     r#"and(eq(Name,"John"),sort(+Age))"#
//! );
//! ```

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{SecondsFormat, TimeDelta};

use crate::{
    ast::{Limit, Property, QueryNode, SortOrder, SortProperty},
    value::{DateTimeKind, Value},
};

/// Rendering style for [`QueryNode::to_string_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Standard,
    Normalized,
}

pub struct QueryPrinter {
    format: Format,
}

impl QueryPrinter {
    pub fn new(format: Format) -> Self {
        QueryPrinter { format }
    }

    pub fn print(&self, node: &QueryNode) -> String {
        let mut out = String::new();
        self.print_node(node, &mut out, true);
        out
    }

    fn print_node(&self, node: &QueryNode, out: &mut String, root: bool) {
        match node {
            QueryNode::Noop => {}
            QueryNode::And(nodes) | QueryNode::Or(nodes)
                if self.format == Format::Standard && nodes.len() > 1 =>
            {
                let joiner = if matches!(node, QueryNode::And(_)) { '&' } else { '|' };
                if !root {
                    out.push('(');
                }
                for (i, child) in nodes.iter().enumerate() {
                    if i > 0 {
                        out.push(joiner);
                    }
                    self.print_node(child, out, false);
                }
                if !root {
                    out.push(')');
                }
            }
            QueryNode::And(nodes) | QueryNode::Or(nodes) => {
                out.push_str(node.operation().as_str());
                out.push('(');
                self.print_nodes(nodes, out);
                out.push(')');
            }
            QueryNode::Compare {
                op,
                property,
                value,
            } if self.format == Format::Standard => {
                print_property(property, out);
                out.push_str(op.symbol());
                print_value(value, out);
            }
            QueryNode::Compare {
                property, value, ..
            }
            | QueryNode::Match {
                property,
                pattern: value,
                ..
            } => {
                open(node, out);
                print_property(property, out);
                out.push(',');
                print_value(value, out);
                out.push(')');
            }
            QueryNode::Membership {
                property, values, ..
            } => {
                open(node, out);
                print_property(property, out);
                for value in values {
                    out.push(',');
                    print_value(value, out);
                }
                out.push(')');
            }
            QueryNode::Limit(limit) => {
                open(node, out);
                print_limit(limit, out);
                out.push(')');
            }
            QueryNode::Select(properties) => {
                open(node, out);
                print_properties(properties, out);
                out.push(')');
            }
            QueryNode::Sort(keys) => {
                open(node, out);
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.print_sort_key(key, out);
                }
                out.push(')');
            }
            QueryNode::Distinct | QueryNode::First | QueryNode::One | QueryNode::Count(None) => {
                open(node, out);
                out.push(')');
            }
            QueryNode::Count(Some(property))
            | QueryNode::Values(property)
            | QueryNode::Function { property, .. } => {
                open(node, out);
                print_property(property, out);
                out.push(')');
            }
            QueryNode::Aggregate { groups, functions } => {
                open(node, out);
                print_properties(groups, out);
                if !groups.is_empty() && !functions.is_empty() {
                    out.push(',');
                }
                self.print_nodes(functions, out);
                out.push(')');
            }
        }
    }

    fn print_nodes(&self, nodes: &[QueryNode], out: &mut String) {
        for (i, child) in nodes.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.print_node(child, out, false);
        }
    }

    fn print_sort_key(&self, key: &SortProperty, out: &mut String) {
        match (key.order, self.format) {
            (SortOrder::Descending, _) => out.push('-'),
            (SortOrder::Ascending, Format::Normalized) => out.push('+'),
            (SortOrder::Ascending, Format::Standard) => {}
        }
        print_property(&key.property, out);
    }
}

fn open(node: &QueryNode, out: &mut String) {
    out.push_str(node.operation().as_str());
    out.push('(');
}

fn print_property(property: &Property, out: &mut String) {
    out.push_str(&property.path());
}

fn print_properties(properties: &[Property], out: &mut String) {
    for (i, property) in properties.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        print_property(property, out);
    }
}

fn print_limit(limit: &Limit, out: &mut String) {
    if let Some(start) = limit.start {
        out.push_str(&start.to_string());
        out.push(',');
    }
    out.push_str(&limit.count.to_string());
}

/// `%` is written as a unicode escape so the text survives percent-decoding.
fn escape_into(text: &str, quote: char, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '%' => out.push_str("\\u0025"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
}

fn quoted(text: &str, quote: char, out: &mut String) {
    out.push(quote);
    escape_into(text, quote, out);
    out.push(quote);
}

/// `[-]H:MM:SS[.fffffffff]`
fn print_timespan(span: &TimeDelta, out: &mut String) {
    if *span < TimeDelta::zero() {
        out.push('-');
    }
    let span = span.abs();
    let seconds = span.num_seconds();
    out.push_str(&format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    ));
    let nanos = span.subsec_nanos();
    if nanos != 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
}

/// Writes a literal in a form the lexer reads back as the same type.
fn print_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Char(c) => quoted(&c.to_string(), '\'', out),
        Value::String(s) => quoted(s, '"', out),
        Value::I8(n) => out.push_str(&format!("int8:{}", n)),
        Value::I16(n) => out.push_str(&format!("int16:{}", n)),
        Value::I32(n) => out.push_str(&n.to_string()),
        Value::I64(n) => out.push_str(&format!("{}L", n)),
        Value::U8(n) => out.push_str(&format!("byte:{}", n)),
        Value::U16(n) => out.push_str(&format!("uint16:{}", n)),
        Value::U32(n) => out.push_str(&format!("{}U", n)),
        Value::U64(n) => out.push_str(&format!("{}UL", n)),
        Value::Float(f) => out.push_str(&format!("{}F", f)),
        Value::Double(d) => out.push_str(&format!("{}D", d)),
        Value::Decimal(m) => out.push_str(&format!("{}M", m)),
        Value::DateTime(dt) => match dt.kind {
            DateTimeKind::Utc => {
                out.push_str("utc:");
                out.push_str(&dt.instant.to_rfc3339_opts(SecondsFormat::AutoSi, true));
            }
            DateTimeKind::Local => {
                out.push_str(&dt.instant.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
        },
        Value::TimeSpan(span) => print_timespan(span, out),
        Value::Guid(guid) => out.push_str(&guid.hyphenated().to_string()),
        Value::Binary(bytes) => {
            out.push_str("bin:");
            out.push_str(&STANDARD.encode(bytes));
        }
        Value::Uri(uri) => {
            out.push_str("uri:");
            quoted(uri, '"', out);
        }
    }
}

impl QueryNode {
    pub fn to_string_format(&self, format: Format) -> String {
        QueryPrinter::new(format).print(self)
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_format(Format::Standard))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        print_value(self, &mut out);
        f.write_str(&out)
    }
}
