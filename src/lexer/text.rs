//! Quoted strings and chars, GUIDs, base64 payloads and URIs.

use base64::{Engine, engine::general_purpose::STANDARD};
use uuid::Uuid;

use super::{Scan, at_boundary};
use crate::reader::CharReader;

const GUID_GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// Reads a quoted literal body; the reader sits on the opening quote.
pub(crate) fn scan_quoted(reader: &mut CharReader, quote: char) -> Scan<String> {
    let start = reader.position();
    let mut result = String::new();
    reader.read();

    while let Some(ch) = reader.read() {
        match ch {
            c if c == quote => return Ok(result),
            '\\' => result.push(scan_escape(reader, start)?),
            _ => result.push(ch),
        }
    }

    Err(format!(
        "unterminated {} literal {}: expecting closing {}",
        if quote == '"' { "string" } else { "char" },
        reader.slice_from(start),
        quote
    ))
}

/// Decodes the escape after a consumed backslash.
fn scan_escape(reader: &mut CharReader, start: usize) -> Scan<char> {
    match reader.read() {
        Some('r') => Ok('\r'),
        Some('n') => Ok('\n'),
        Some('t') => Ok('\t'),
        Some('b') => Ok('\u{8}'),
        Some('\\') => Ok('\\'),
        Some('\'') => Ok('\''),
        Some('"') => Ok('"'),
        Some('u') => {
            let hex = reader.read_while_n(4, |c| c.is_ascii_hexdigit());
            if hex.len() != 4 {
                return Err(format!(
                    "invalid unicode escape in {}: expecting 4 hex digits",
                    reader.slice_from(start)
                ));
            }
            u32::from_str_radix(&hex, 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| format!("invalid unicode escape \\u{} in {}", hex, reader.slice_from(start)))
        }
        Some(ch) => Err(format!(
            "invalid escape sequence \\{} in {}",
            ch,
            reader.slice_from(start)
        )),
        None => Err(format!(
            "unexpected end of input after backslash in {}",
            reader.slice_from(start)
        )),
    }
}

/// Single-quoted character literal.
pub(crate) fn scan_char(reader: &mut CharReader) -> Scan<char> {
    let start = reader.position();
    let body = scan_quoted(reader, '\'')?;
    single_char(&body).ok_or_else(|| {
        format!(
            "invalid char literal {}: expecting exactly one character",
            reader.slice_from(start)
        )
    })
}

pub(crate) fn single_char(body: &str) -> Option<char> {
    let mut chars = body.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

/// A `-` after exactly eight hex characters commits to a GUID.
pub(crate) fn guid_ahead(reader: &CharReader) -> bool {
    reader.count_ahead(|c| c.is_ascii_hexdigit()) == 8 && reader.peek_ahead(8) == Some('-')
}

/// Bare `8-4-4-4-12` GUID.
pub(crate) fn scan_guid(reader: &mut CharReader) -> Scan<Uuid> {
    let start = reader.position();
    for (i, &width) in GUID_GROUPS.iter().enumerate() {
        if i > 0 && reader.read_if(|c| c == '-').is_none() {
            return Err(guid_error(reader, start, "expecting -"));
        }
        let group = reader.read_while_n(width, |c| c.is_ascii_hexdigit());
        if group.len() != width {
            return Err(guid_error(
                reader,
                start,
                &format!("expecting {} hex digits in group {}", width, i + 1),
            ));
        }
    }
    if !at_boundary(reader) {
        return Err(guid_error(reader, start, "unexpected trailing characters"));
    }
    parse_guid(&reader.slice_from(start))
}

fn guid_error(reader: &CharReader, start: usize, detail: &str) -> String {
    format!("invalid GUID {}: {}", reader.slice_from(start), detail)
}

pub(crate) fn parse_guid(text: &str) -> Scan<Uuid> {
    Uuid::parse_str(text.trim()).map_err(|e| format!("invalid GUID {}: {}", text, e))
}

pub(crate) fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

pub(crate) fn decode_base64(text: &str) -> Scan<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| format!("invalid base64 payload {}: {}", text, e))
}

/// URIs run until whitespace or a structural character.
pub(crate) fn is_uri_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | ',' | '&' | '|' | '"' | '\'' | '<' | '>')
}

pub(crate) fn scan_uri(reader: &mut CharReader) -> String {
    reader.read_while(is_uri_char)
}
