use chrono::{DateTime, FixedOffset, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A typed scalar carried by a literal token or a query node.
///
/// Width, signedness and kind are preserved exactly as written, so a value
/// re-rendered in the standard format parses back to the same variant.
///
/// # Examples
///
/// ```
/// use rql_lang::Value;
///
/// let id = Value::I8(-104);
/// assert_eq!(id.type_name(), "int8");
/// assert!(Value::String("Smith".into()).eq_ignore_case(&Value::String("SMITH".into())));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null`
    Null,

    /// `true`, `false`, or `bool:yes` and friends
    Bool(bool),

    /// Single-quoted character
    Char(char),

    /// Double-quoted or bare string
    String(String),

    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),

    /// `f` suffix or `float:` prefix
    Float(f32),

    /// Real literal without suffix, `d` suffix or `double:` prefix
    Double(f64),

    /// `m` suffix or `decimal:` prefix
    Decimal(Decimal),

    DateTime(DateTimeValue),

    /// `HH:MM:SS` duration
    TimeSpan(TimeDelta),

    Guid(Uuid),

    /// Base64 payload of a `bin:` literal
    Binary(Vec<u8>),

    /// Absolute (`http://...`) or relative (`/...`) reference
    Uri(String),
}

/// How a date/time literal was anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateTimeKind {
    /// Resolved against the parse-time local offset
    Local,
    /// Written with a `utc:` prefix
    Utc,
}

/// A resolved instant together with the kind it was written as.
///
/// Equality compares the instant, not the offset it is displayed in, so
/// `2000-01-01T00:00:00Z` and `12/31/1999 19:00:00-05:00` are equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateTimeValue {
    pub instant: DateTime<FixedOffset>,
    pub kind: DateTimeKind,
}

impl DateTimeValue {
    pub fn new(instant: DateTime<FixedOffset>, kind: DateTimeKind) -> Self {
        DateTimeValue { instant, kind }
    }
}

impl Value {
    /// Name of the value's concrete type, as used by type prefixes.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::I8(_) => "int8",
            Value::I16(_) => "int16",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::U8(_) => "uint8",
            Value::U16(_) => "uint16",
            Value::U32(_) => "uint32",
            Value::U64(_) => "uint64",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::DateTime(_) => "datetime",
            Value::TimeSpan(_) => "timespan",
            Value::Guid(_) => "guid",
            Value::Binary(_) => "binary",
            Value::Uri(_) => "uri",
        }
    }

    /// Integer value widened to i128, for any of the eight integer widths.
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Value::I8(n) => Some(n.into()),
            Value::I16(n) => Some(n.into()),
            Value::I32(n) => Some(n.into()),
            Value::I64(n) => Some(n.into()),
            Value::U8(n) => Some(n.into()),
            Value::U16(n) => Some(n.into()),
            Value::U32(n) => Some(n.into()),
            Value::U64(n) => Some(n.into()),
            _ => None,
        }
    }

    /// Textual content for string-like values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Uri(s) => Some(s),
            _ => None,
        }
    }

    /// Structural equality where text compares case-insensitively.
    pub fn eq_ignore_case(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) | (Value::Uri(a), Value::Uri(b)) => {
                a.to_lowercase() == b.to_lowercase()
            }
            (Value::Char(a), Value::Char(b)) => a.to_lowercase().eq(b.to_lowercase()),
            _ => self == other,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::I32(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
