// tests/lexer_tests.rs

use chrono::{FixedOffset, TimeDelta, TimeZone};
use pretty_assertions::assert_eq;
use rql_lang::ast::{Function, Symbol};
use rql_lang::{
    CompareOp, DateTimeKind, DateTimeValue, Lexer, ParseOptions, QueryNode, RqlError, Value,
    parse_with, scan,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn options() -> ParseOptions {
    ParseOptions::utc()
}

/// Value of the comparison in `Id=<literal>`.
fn id_value(literal: &str) -> Value {
    let query = format!("Id={}", literal);
    match parse_with(&query, &options()).unwrap() {
        QueryNode::Compare {
            op: CompareOp::Eq,
            property,
            value,
        } => {
            assert_eq!(property.path(), "Id");
            value
        }
        other => panic!("{} parsed to {:?}", query, other),
    }
}

fn lex_error(literal: &str) -> String {
    let query = format!("Id={}", literal);
    match parse_with(&query, &options()) {
        Err(RqlError::Lex { message, .. }) => message,
        other => panic!("{} should fail to scan, got {:?}", query, other),
    }
}

fn symbols(input: &str) -> Vec<Symbol> {
    scan(input, &options())
        .unwrap()
        .into_iter()
        .map(|t| t.symbol)
        .collect()
}

// ============================================================================
// Integers
// ============================================================================

#[test]
fn test_plain_integers_take_narrowest_type() {
    assert_eq!(id_value("5"), Value::I32(5));
    assert_eq!(id_value("-5"), Value::I32(-5));
    assert_eq!(id_value("2147483648"), Value::I64(2147483648));
    assert_eq!(id_value("9223372036854775808"), Value::U64(9223372036854775808));
}

#[test]
fn test_integer_suffixes() {
    assert_eq!(id_value("5L"), Value::I64(5));
    assert_eq!(id_value("5l"), Value::I64(5));
    assert_eq!(id_value("5u"), Value::U32(5));
    assert_eq!(id_value("5000000000U"), Value::U64(5000000000));
    assert_eq!(id_value("5UL"), Value::U64(5));
    assert_eq!(id_value("5LU"), Value::U64(5));
}

#[test]
fn test_integer_prefixes() {
    assert_eq!(id_value("byte:200"), Value::U8(200));
    assert_eq!(id_value("uint8:200"), Value::U8(200));
    assert_eq!(id_value("sbyte:-5"), Value::I8(-5));
    assert_eq!(id_value("int8:-104"), Value::I8(-104));
    assert_eq!(id_value("short:-300"), Value::I16(-300));
    assert_eq!(id_value("int16:-300"), Value::I16(-300));
    assert_eq!(id_value("ushort:60000"), Value::U16(60000));
    assert_eq!(id_value("int:7"), Value::I32(7));
    assert_eq!(id_value("integer:7"), Value::I32(7));
    assert_eq!(id_value("uint:7"), Value::U32(7));
    assert_eq!(id_value("long:7"), Value::I64(7));
    assert_eq!(id_value("ulong:7"), Value::U64(7));
}

#[test]
fn test_hex_literals() {
    assert_eq!(id_value("0xFF"), Value::U8(255));
    assert_eq!(id_value("0x1234"), Value::U16(0x1234));
    assert_eq!(id_value("0x12345678"), Value::U32(0x12345678));
    assert_eq!(id_value("0xFFFFFFFFFFFFFFFF"), Value::U64(u64::MAX));
    assert_eq!(id_value("sbyte:0xFF"), Value::I8(-1));
    assert_eq!(id_value("short:0x7FFF"), Value::I16(i16::MAX));
    assert_eq!(id_value("int:0xFFFFFFFF"), Value::I32(-1));
}

#[test]
fn test_integer_errors() {
    assert_eq!(lex_error("byte:300"), "numeric literal 300 is out of range for uint8");
    assert!(lex_error("byte:0x1FF").contains("more than 2 hex digits"));
    assert!(lex_error("0x").contains("expecting hex digits"));
    assert!(lex_error("0x12345678901234567").contains("more than 16 hex digits"));
    assert!(lex_error("int:abc").contains("expecting a number"));
    assert!(lex_error("int:1.5").contains("expecting an integer"));
}

// ============================================================================
// Reals
// ============================================================================

#[test]
fn test_real_literals() {
    assert_eq!(id_value("1.5"), Value::Double(1.5));
    assert_eq!(id_value("1.5d"), Value::Double(1.5));
    assert_eq!(id_value("2D"), Value::Double(2.0));
    assert_eq!(id_value("1.5f"), Value::Float(1.5));
    assert_eq!(id_value("1.5m"), Value::Decimal(Decimal::new(15, 1)));
    assert_eq!(id_value("-0.25M"), Value::Decimal(Decimal::new(-25, 2)));
    assert_eq!(id_value("1e3"), Value::Double(1000.0));
    assert_eq!(id_value("2.5E-1"), Value::Double(0.25));
}

#[test]
fn test_real_overflow() {
    assert_eq!(lex_error("1e400"), "numeric literal 1e400 is out of range for double");
    assert_eq!(lex_error("1e39f"), "numeric literal 1e39f is out of range for float");
    assert!(lex_error("float:1e39").contains("out of range for float"));
    assert_eq!(id_value("1e-400"), Value::Double(0.0));
}

#[test]
fn test_real_prefixes() {
    assert_eq!(id_value("float:1.5"), Value::Float(1.5));
    assert_eq!(id_value("single:1.5"), Value::Float(1.5));
    assert_eq!(id_value("double:2"), Value::Double(2.0));
    assert_eq!(id_value("decimal:2.5"), Value::Decimal(Decimal::new(25, 1)));
}

// ============================================================================
// Booleans, null, text
// ============================================================================

#[test]
fn test_booleans_and_null() {
    assert_eq!(id_value("true"), Value::Bool(true));
    assert_eq!(id_value("FALSE"), Value::Bool(false));
    assert_eq!(id_value("null"), Value::Null);
    assert_eq!(id_value("bool:yes"), Value::Bool(true));
    assert_eq!(id_value("bool:Y"), Value::Bool(true));
    assert_eq!(id_value("boolean:0"), Value::Bool(false));
    assert_eq!(id_value("bool:\"no\""), Value::Bool(false));
    assert!(lex_error("bool:maybe").contains("invalid bool literal"));
}

#[test]
fn test_strings_and_chars() {
    assert_eq!(id_value("\"John Smith\""), Value::from("John Smith"));
    assert_eq!(id_value(r#""tab\there""#), Value::from("tab\there"));
    assert_eq!(id_value(r#""A""#), Value::from("A"));
    assert_eq!(id_value("string:abc"), Value::from("abc"));
    assert_eq!(id_value("string:'a&b'"), Value::from("a&b"));
    assert_eq!(id_value("'x'"), Value::Char('x'));
    assert_eq!(id_value(r"'\''"), Value::Char('\''));
    assert_eq!(id_value("char:z"), Value::Char('z'));
}

#[test]
fn test_text_errors() {
    assert!(lex_error("\"abc").contains("unterminated string literal \"abc"));
    assert!(lex_error(r#""a\qb""#).contains("invalid escape sequence \\q"));
    assert!(lex_error("'ab'").contains("exactly one character"));
    assert!(lex_error(r#""\u00""#).contains("expecting 4 hex digits"));
}

#[test]
fn test_bare_words_are_strings() {
    assert_eq!(id_value("John"), Value::from("John"));
    assert_eq!(id_value("T*"), Value::from("T*"));
    assert_eq!(id_value("1-1"), Value::from("1-1"));
    assert_eq!(id_value("1.2.3"), Value::from("1.2.3"));
    assert_eq!(id_value("12abc"), Value::from("12abc"));
    assert_eq!(id_value("-abc"), Value::from("-abc"));
    assert_eq!(id_value("a/b"), Value::from("a/b"));
}

// ============================================================================
// GUIDs, binary, URIs
// ============================================================================

#[test]
fn test_guids() {
    let guid = Uuid::parse_str("0f8fad5b-d9cb-469f-a165-70867728950e").unwrap();
    assert_eq!(id_value("0f8fad5b-d9cb-469f-a165-70867728950e"), Value::Guid(guid));
    assert_eq!(id_value("0F8FAD5B-D9CB-469F-A165-70867728950E"), Value::Guid(guid));
    assert_eq!(
        id_value("guid:\"0f8fad5b-d9cb-469f-a165-70867728950e\""),
        Value::Guid(guid)
    );

    let letters = Uuid::parse_str("deadbeef-0000-0000-0000-000000000000").unwrap();
    assert_eq!(id_value("deadbeef-0000-0000-0000-000000000000"), Value::Guid(letters));
}

#[test]
fn test_guid_commit_errors() {
    assert!(lex_error("0f8fad5b-d9cb").contains("invalid GUID"));
    assert!(lex_error("0f8fad5b-d9cb-469f-a165-70867728950ex").contains("unexpected trailing"));
}

#[test]
fn test_binary() {
    assert_eq!(id_value("bin:AQID"), Value::Binary(vec![1, 2, 3]));
    assert_eq!(id_value("binary:\"AQIDBA==\""), Value::Binary(vec![1, 2, 3, 4]));
    assert!(lex_error("bin:A").contains("invalid base64"));
}

#[test]
fn test_uris() {
    assert_eq!(
        id_value("http://example.com/a?b=c"),
        Value::Uri("http://example.com/a?b=c".to_string())
    );
    assert_eq!(id_value("https://x.org"), Value::Uri("https://x.org".to_string()));
    assert_eq!(id_value("/relative/path"), Value::Uri("/relative/path".to_string()));
    assert_eq!(
        id_value("uri:\"http://x.org/?a=1&b=2\""),
        Value::Uri("http://x.org/?a=1&b=2".to_string())
    );
}

// ============================================================================
// Dates and time spans
// ============================================================================

fn utc_instant(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> chrono::DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .unwrap()
}

#[test]
fn test_date_forms_normalize_to_one_instant() {
    let expected = Value::DateTime(DateTimeValue::new(
        utc_instant(2000, 1, 2, 0, 0, 0),
        DateTimeKind::Local,
    ));
    for literal in [
        "2000-01-02",
        "2000/01/02",
        "1/2/2000",
        "01-02-2000",
        "2000-01-02T00:00:00",
        "2000-01-02 00:00",
        "2000-01-02T00:00:00Z",
        "2000-01-02T00:00:00GMT",
        "2000-01-01T19:00:00-05:00",
        "2000-01-02T05:30:00+0530",
        "date:2000-01-02",
        "datetime:\"2000-01-02 00:00:00\"",
    ] {
        assert_eq!(id_value(literal), expected, "literal {}", literal);
    }
}

#[test]
fn test_utc_prefix_sets_kind() {
    match id_value("utc:2000-01-02T03:04:05") {
        Value::DateTime(dt) => {
            assert_eq!(dt.kind, DateTimeKind::Utc);
            assert_eq!(dt.instant, utc_instant(2000, 1, 2, 3, 4, 5));
        }
        other => panic!("expected datetime, got {:?}", other),
    }
}

#[test]
fn test_local_offset_is_a_parameter() {
    let plus_two = ParseOptions::utc().with_local_offset(FixedOffset::east_opt(7200).unwrap());
    let node = parse_with("Id=2000-01-02T12:00:00", &plus_two).unwrap();
    match node {
        QueryNode::Compare {
            value: Value::DateTime(dt),
            ..
        } => assert_eq!(dt.instant, utc_instant(2000, 1, 2, 10, 0, 0)),
        other => panic!("expected datetime comparison, got {:?}", other),
    }
}

#[test]
fn test_date_errors() {
    assert!(lex_error("2000-13-01").contains("no such day"));
    assert!(lex_error("2000-02-30").contains("no such day"));
    assert!(lex_error("2000-01-02T25:00").contains("out of range"));
    assert!(lex_error("2000-01-02x").contains("unexpected 'x'"));
}

#[test]
fn test_time_spans() {
    assert_eq!(id_value("12:30:15"), Value::TimeSpan(TimeDelta::seconds(45015)));
    assert_eq!(id_value("-1:00:00"), Value::TimeSpan(TimeDelta::seconds(-3600)));
    assert_eq!(
        id_value("0:00:01.5"),
        Value::TimeSpan(TimeDelta::milliseconds(1500))
    );
    assert_eq!(id_value("time:\"100:00:00\""), Value::TimeSpan(TimeDelta::hours(100)));
    assert!(lex_error("12:30").contains("invalid time span"));
}

// ============================================================================
// Punctuation and operators
// ============================================================================

#[test]
fn test_operator_tokens() {
    use Symbol::*;
    assert_eq!(
        symbols("A=1&B!=2|C<3"),
        vec![Property, Eq, Literal, Ampersand, Property, Ne, Literal, Pipe, Property, Lt, Literal, Eof]
    );
    assert_eq!(symbols("A<=1 B>=2 C>3"), vec![Property, Le, Literal, Property, Ge, Literal, Property, Gt, Literal, Eof]);
}

#[test]
fn test_fiql_operators() {
    use Symbol::*;
    assert_eq!(symbols("A=eq=1"), vec![Property, Eq, Literal, Eof]);
    assert_eq!(symbols("A=ne=1"), vec![Property, Ne, Literal, Eof]);
    assert_eq!(symbols("A=lt=1"), vec![Property, Lt, Literal, Eof]);
    assert_eq!(symbols("A=le=1"), vec![Property, Le, Literal, Eof]);
    assert_eq!(symbols("A=gt=1"), vec![Property, Gt, Literal, Eof]);
    assert_eq!(symbols("A=ge=1"), vec![Property, Ge, Literal, Eof]);
    assert_eq!(symbols("A=nest"), vec![Property, Eq, Property, Eof]);
}

#[test]
fn test_reserved_words_need_parens() {
    assert_eq!(symbols("sort(A)")[0], Symbol::Function(Function::Sort));
    assert_eq!(symbols("LIMIT (1)")[0], Symbol::Function(Function::Limit));
    assert_eq!(symbols("sort=1")[0], Symbol::Property);
    assert_eq!(symbols("Name=count")[2], Symbol::Property);
}

#[test]
fn test_token_positions_and_text() {
    let mut lexer = Lexer::with_options("Name = \"John\"", options());
    let name = lexer.next_token().unwrap();
    let eq = lexer.next_token().unwrap();
    let value = lexer.next_token().unwrap();
    let eof = lexer.next_token().unwrap();

    assert_eq!((name.position, name.text.as_str()), (0, "Name"));
    assert_eq!((eq.position, eq.symbol), (5, Symbol::Eq));
    assert_eq!(value.position, 7);
    assert_eq!(value.text, "\"John\"");
    assert_eq!(value.value, Some(Value::from("John")));
    assert!(eof.is(Symbol::Eof));
}

#[test]
fn test_lex_error_reports_token_start() {
    let err = scan("Name=\"open", &options()).unwrap_err();
    match err {
        RqlError::Lex { position, message } => {
            assert_eq!(position, 5);
            assert_eq!(message, "unterminated string literal \"open: expecting closing \"");
        }
        other => panic!("expected lexical error, got {:?}", other),
    }
    assert!(scan("A!1", &options()).is_err());
    assert!(scan("A=foo:1", &options()).unwrap_err().to_string().contains("unknown type prefix 'foo:'"));
}
