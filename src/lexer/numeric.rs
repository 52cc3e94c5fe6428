//! Decimal and hex number literals, suffixes and typed-prefix conversion.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::{Scan, at_boundary};
use crate::{reader::CharReader, value::Value};

/// Target of a numeric type prefix such as `int8:` or `decimal:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumericType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Float,
    Double,
    Decimal,
}

impl NumericType {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            NumericType::I8 => "int8",
            NumericType::I16 => "int16",
            NumericType::I32 => "int32",
            NumericType::I64 => "int64",
            NumericType::U8 => "uint8",
            NumericType::U16 => "uint16",
            NumericType::U32 => "uint32",
            NumericType::U64 => "uint64",
            NumericType::Float => "float",
            NumericType::Double => "double",
            NumericType::Decimal => "decimal",
        }
    }

    /// Bit width of integer targets.
    fn bits(&self) -> Option<u32> {
        match self {
            NumericType::I8 | NumericType::U8 => Some(8),
            NumericType::I16 | NumericType::U16 => Some(16),
            NumericType::I32 | NumericType::U32 => Some(32),
            NumericType::I64 | NumericType::U64 => Some(64),
            _ => None,
        }
    }
}

/// States of the decimal number machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Sign,
    Integer,
    Fraction,
    ExponentMark,
    ExponentSign,
    Exponent,
    Suffix,
}

/// Mantissa text (sign, digits, point, exponent) and trailing suffix letters.
#[derive(Debug, Default)]
struct Mantissa {
    text: String,
    suffix: String,
    real: bool,
}

fn is_suffix_letter(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'u' | 'l' | 'f' | 'd' | 'm')
}

fn valid_suffix(suffix: &str) -> bool {
    matches!(
        suffix.to_ascii_lowercase().as_str(),
        "" | "u" | "l" | "f" | "d" | "m" | "ul" | "lu"
    )
}

/// Runs the decimal machine from the cursor. Returns `None`, with the reader
/// left mid-run, when the run is not a number; the caller backtracks.
fn scan_mantissa(reader: &mut CharReader) -> Option<Mantissa> {
    let mut state = State::Start;
    let mut m = Mantissa::default();

    loop {
        let Some(c) = reader.peek() else { break };
        let next = reader.peek_ahead(1);
        state = match (state, c) {
            (State::Start, '+' | '-') => State::Sign,
            (State::Start | State::Sign | State::Integer, '0'..='9') => State::Integer,
            (State::Start | State::Sign | State::Integer, '.')
                if next.is_some_and(|n| n.is_ascii_digit()) =>
            {
                m.real = true;
                State::Fraction
            }
            (State::Fraction, '0'..='9') => State::Fraction,
            (State::Integer | State::Fraction, 'e' | 'E')
                if next.is_some_and(|n| n.is_ascii_digit() || n == '+' || n == '-') =>
            {
                m.real = true;
                State::ExponentMark
            }
            (State::ExponentMark, '+' | '-') => State::ExponentSign,
            (State::ExponentMark | State::ExponentSign | State::Exponent, '0'..='9') => {
                State::Exponent
            }
            (State::Integer | State::Fraction | State::Exponent | State::Suffix, c)
                if is_suffix_letter(c) && m.suffix.len() < 2 =>
            {
                m.suffix.push(c);
                reader.read();
                if !valid_suffix(&m.suffix) && m.suffix.len() == 2 {
                    return None;
                }
                state = State::Suffix;
                continue;
            }
            _ if at_boundary(reader) => break,
            _ => return None,
        };
        m.text.push(c);
        reader.read();
    }

    match state {
        State::Integer | State::Fraction | State::Exponent => Some(m),
        State::Suffix if valid_suffix(&m.suffix) => Some(m),
        _ => None,
    }
}

/// Bare decimal number with optional suffix.
///
/// `Ok(None)` means the run is not numeric and should be read as a bare word.
pub(crate) fn scan_number(reader: &mut CharReader) -> Scan<Option<Value>> {
    let start = reader.position();
    let Some(m) = scan_mantissa(reader) else {
        return Ok(None);
    };
    let lexeme = reader.slice_from(start);
    suffixed_value(&m, &lexeme).map(Some)
}

fn suffixed_value(m: &Mantissa, lexeme: &str) -> Scan<Value> {
    let suffix = m.suffix.to_ascii_lowercase();
    match (suffix.as_str(), m.real) {
        ("", false) => {
            let n = parse_integer(&m.text, lexeme)?;
            if let Ok(v) = i32::try_from(n) {
                Ok(Value::I32(v))
            } else if let Ok(v) = i64::try_from(n) {
                Ok(Value::I64(v))
            } else if let Ok(v) = u64::try_from(n) {
                Ok(Value::U64(v))
            } else {
                Err(out_of_range(lexeme, "any integer type"))
            }
        }
        ("", true) | ("d", _) => parse_double(&m.text, lexeme).map(Value::Double),
        ("f", _) => parse_float(&m.text, lexeme).map(Value::Float),
        ("m", _) => parse_decimal(&m.text, lexeme).map(Value::Decimal),
        ("u", false) => {
            let n = parse_integer(&m.text, lexeme)?;
            u32::try_from(n)
                .map(Value::U32)
                .or_else(|_| u64::try_from(n).map(Value::U64))
                .map_err(|_| out_of_range(lexeme, "uint64"))
        }
        ("l", false) => {
            let n = parse_integer(&m.text, lexeme)?;
            i64::try_from(n)
                .map(Value::I64)
                .map_err(|_| out_of_range(lexeme, "int64"))
        }
        ("ul" | "lu", false) => {
            let n = parse_integer(&m.text, lexeme)?;
            u64::try_from(n)
                .map(Value::U64)
                .map_err(|_| out_of_range(lexeme, "uint64"))
        }
        (suffix, _) => Err(format!(
            "invalid numeric literal {}: suffix '{}' requires an integer",
            lexeme, suffix
        )),
    }
}

fn parse_integer(text: &str, lexeme: &str) -> Scan<i128> {
    text.parse::<i128>()
        .map_err(|_| out_of_range(lexeme, "any integer type"))
}

fn parse_double(text: &str, lexeme: &str) -> Scan<f64> {
    let value = text
        .parse::<f64>()
        .map_err(|e| format!("invalid double literal {}: {}", lexeme, e))?;
    if !value.is_finite() {
        return Err(out_of_range(lexeme, "double"));
    }
    Ok(value)
}

fn parse_float(text: &str, lexeme: &str) -> Scan<f32> {
    let value = text
        .parse::<f32>()
        .map_err(|e| format!("invalid float literal {}: {}", lexeme, e))?;
    if !value.is_finite() {
        return Err(out_of_range(lexeme, "float"));
    }
    Ok(value)
}

fn parse_decimal(text: &str, lexeme: &str) -> Scan<Decimal> {
    let text = text.strip_prefix('+').unwrap_or(text);
    let parsed = if text.contains(['e', 'E']) {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str(text)
    };
    parsed.map_err(|e| format!("invalid decimal literal {}: {}", lexeme, e))
}

fn out_of_range(lexeme: &str, target: &str) -> String {
    format!("numeric literal {} is out of range for {}", lexeme, target)
}

/// True when the cursor sits on `0x` / `0X`.
pub(crate) fn hex_ahead(reader: &CharReader) -> bool {
    reader.peek() == Some('0') && matches!(reader.peek_ahead(1), Some('x' | 'X'))
}

/// Reads `0x` and the hex digits after it.
fn scan_hex_digits(reader: &mut CharReader) -> Scan<String> {
    let start = reader.position();
    reader.read();
    reader.read();
    let digits = reader.read_while(|c| c.is_ascii_hexdigit());
    if digits.is_empty() {
        return Err(format!(
            "invalid hex literal {}: expecting hex digits",
            reader.slice_from(start)
        ));
    }
    if digits.len() > 16 {
        return Err(format!(
            "invalid hex literal {}: more than 16 hex digits",
            reader.slice_from(start)
        ));
    }
    Ok(digits)
}

/// Bare hex literal. Width follows the digit count; `u`, `l` and `ul`
/// suffixes pick the type explicitly.
pub(crate) fn scan_hex(reader: &mut CharReader) -> Scan<Value> {
    let start = reader.position();
    let digits = scan_hex_digits(reader)?;
    let suffix = reader.read_while_n(2, |c| matches!(c.to_ascii_lowercase(), 'u' | 'l'));
    if !at_boundary(reader) || !valid_suffix(&suffix) {
        return Err(format!(
            "invalid hex literal {}: unexpected trailing characters",
            reader.slice_from(start)
        ));
    }
    let bits = u64::from_str_radix(&digits, 16)
        .map_err(|e| format!("invalid hex literal {}: {}", reader.slice_from(start), e))?;

    let value = match suffix.to_ascii_lowercase().as_str() {
        "" => match digits.len() {
            1..=2 => Value::U8(bits as u8),
            3..=4 => Value::U16(bits as u16),
            5..=8 => Value::U32(bits as u32),
            _ => Value::U64(bits),
        },
        "u" => u32::try_from(bits)
            .map(Value::U32)
            .unwrap_or(Value::U64(bits)),
        "l" => Value::I64(bits as i64),
        _ => Value::U64(bits),
    };
    Ok(value)
}

/// Number after a numeric type prefix: decimal or hex, no suffix.
pub(crate) fn scan_typed_number(reader: &mut CharReader, target: NumericType) -> Scan<Value> {
    let start = reader.position();
    if hex_ahead(reader) {
        let digits = scan_hex_digits(reader)?;
        if !at_boundary(reader) {
            return Err(format!(
                "invalid {} literal {}: unexpected trailing characters",
                target.name(),
                reader.slice_from(start)
            ));
        }
        return hex_to_target(&digits, target)
            .map_err(|detail| format!("invalid {} literal {}: {}", target.name(), reader.slice_from(start), detail));
    }

    let m = scan_mantissa(reader);
    let lexeme = reader.slice_from(start);
    let m = match m {
        Some(m) if m.suffix.is_empty() => m,
        _ => {
            return Err(format!(
                "invalid {} literal '{}': expecting a number",
                target.name(),
                lexeme
            ));
        }
    };

    if m.real && target.bits().is_some() {
        return Err(format!(
            "invalid {} literal {}: expecting an integer",
            target.name(),
            lexeme
        ));
    }

    let name = target.name();
    let range = |_| out_of_range(&lexeme, name);
    match target {
        NumericType::I8 => i8::try_from(parse_integer(&m.text, &lexeme)?).map(Value::I8).map_err(range),
        NumericType::I16 => i16::try_from(parse_integer(&m.text, &lexeme)?).map(Value::I16).map_err(range),
        NumericType::I32 => i32::try_from(parse_integer(&m.text, &lexeme)?).map(Value::I32).map_err(range),
        NumericType::I64 => i64::try_from(parse_integer(&m.text, &lexeme)?).map(Value::I64).map_err(range),
        NumericType::U8 => u8::try_from(parse_integer(&m.text, &lexeme)?).map(Value::U8).map_err(range),
        NumericType::U16 => u16::try_from(parse_integer(&m.text, &lexeme)?).map(Value::U16).map_err(range),
        NumericType::U32 => u32::try_from(parse_integer(&m.text, &lexeme)?).map(Value::U32).map_err(range),
        NumericType::U64 => u64::try_from(parse_integer(&m.text, &lexeme)?).map(Value::U64).map_err(range),
        NumericType::Float => parse_float(&m.text, &lexeme).map(Value::Float),
        NumericType::Double => parse_double(&m.text, &lexeme).map(Value::Double),
        NumericType::Decimal => parse_decimal(&m.text, &lexeme).map(Value::Decimal),
    }
}

/// Reinterprets hex bits at the target width; signed targets wrap.
fn hex_to_target(digits: &str, target: NumericType) -> Result<Value, String> {
    let Some(bits) = target.bits() else {
        return Err("hex notation requires an integer type".to_string());
    };
    if digits.len() as u32 * 4 > bits {
        return Err(format!("more than {} hex digits for a {}-bit value", bits / 4, bits));
    }
    let raw = u64::from_str_radix(digits, 16).map_err(|e| e.to_string())?;
    let value = match target {
        NumericType::I8 => Value::I8(raw as u8 as i8),
        NumericType::I16 => Value::I16(raw as u16 as i16),
        NumericType::I32 => Value::I32(raw as u32 as i32),
        NumericType::I64 => Value::I64(raw as i64),
        NumericType::U8 => Value::U8(raw as u8),
        NumericType::U16 => Value::U16(raw as u16),
        NumericType::U32 => Value::U32(raw as u32),
        _ => Value::U64(raw),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(input: &str) -> Option<Value> {
        let mut reader = CharReader::new(input);
        scan_number(&mut reader).unwrap()
    }

    #[test]
    fn test_narrowest_integer() {
        assert_eq!(number("42"), Some(Value::I32(42)));
        assert_eq!(number("-42"), Some(Value::I32(-42)));
        assert_eq!(number("4294967296"), Some(Value::I64(4294967296)));
        assert_eq!(number("18446744073709551615"), Some(Value::U64(u64::MAX)));
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(number("7u"), Some(Value::U32(7)));
        assert_eq!(number("7L"), Some(Value::I64(7)));
        assert_eq!(number("7UL"), Some(Value::U64(7)));
        assert_eq!(number("7lu"), Some(Value::U64(7)));
        assert_eq!(number("1.5f"), Some(Value::Float(1.5)));
        assert_eq!(number("2D"), Some(Value::Double(2.0)));
        assert_eq!(number("2.50m"), Some(Value::Decimal(Decimal::new(250, 2))));
    }

    #[test]
    fn test_exponent() {
        assert_eq!(number("1.5e3"), Some(Value::Double(1500.0)));
        assert_eq!(number("2E-2"), Some(Value::Double(0.02)));
    }

    #[test]
    fn test_not_numeric() {
        assert_eq!(number("1-1"), None);
        assert_eq!(number("1.2.3"), None);
        assert_eq!(number("12abc"), None);
        assert_eq!(number("7ff"), None);
    }

    #[test]
    fn test_real_with_integer_suffix_fails() {
        let mut reader = CharReader::new("1.5u");
        assert!(scan_number(&mut reader).is_err());
    }

    #[test]
    fn test_hex_widths() {
        let hex = |s: &str| scan_hex(&mut CharReader::new(s)).unwrap();
        assert_eq!(hex("0xFF"), Value::U8(255));
        assert_eq!(hex("0x1234"), Value::U16(0x1234));
        assert_eq!(hex("0xDEADBEEF"), Value::U32(0xDEADBEEF));
        assert_eq!(hex("0x0123456789ABCDEF"), Value::U64(0x0123456789ABCDEF));
        assert_eq!(hex("0x10L"), Value::I64(16));
        assert!(scan_hex(&mut CharReader::new("0x")).is_err());
        assert!(scan_hex(&mut CharReader::new("0xZZ")).is_err());
    }

    #[test]
    fn test_typed_numbers() {
        let typed = |s: &str, t| scan_typed_number(&mut CharReader::new(s), t);
        assert_eq!(typed("-104", NumericType::I8).unwrap(), Value::I8(-104));
        assert_eq!(typed("0xFF", NumericType::I8).unwrap(), Value::I8(-1));
        assert_eq!(typed("300", NumericType::U8).unwrap_err(), "numeric literal 300 is out of range for uint8");
        assert!(typed("1.5", NumericType::I32).is_err());
        assert_eq!(typed("1.5", NumericType::Float).unwrap(), Value::Float(1.5));
        assert!(typed("0x1FF", NumericType::U8).is_err());
    }
}
