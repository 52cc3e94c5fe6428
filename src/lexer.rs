use log::{debug, trace};

use crate::{
    ast::{Function, Symbol, Token},
    error::{Result, RqlError},
    options::ParseOptions,
    queue::TokenQueue,
    reader::CharReader,
    value::{DateTimeKind, Value},
};

mod numeric;
mod temporal;
mod text;

use numeric::NumericType;

/// Outcome of a literal sub-scan; the message is wrapped into a lexical
/// error at the token's start position by the lexer.
pub(crate) type Scan<T> = std::result::Result<T, String>;

/// Characters that end a bare word or a literal.
pub(crate) fn is_terminator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '(' | ')' | ',' | '&' | '|' | '=' | '!' | '<' | '>' | '"' | '\'' | ':' | '/'
        )
}

pub(crate) fn is_word_char(c: char) -> bool {
    !is_terminator(c)
}

/// True at end of input or on a terminator.
pub(crate) fn at_boundary(reader: &CharReader) -> bool {
    reader.peek().is_none_or(is_terminator)
}

/// Type named by a `prefix:` in front of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralType {
    Numeric(NumericType),
    Bool,
    Char,
    String,
    Guid,
    Binary,
    Uri,
    DateTime(DateTimeKind),
    TimeSpan,
}

impl LiteralType {
    fn from_prefix(word: &str) -> Option<Self> {
        use LiteralType::*;
        let ty = match word.to_ascii_lowercase().as_str() {
            "byte" | "uint8" => Numeric(NumericType::U8),
            "sbyte" | "int8" => Numeric(NumericType::I8),
            "short" | "int16" => Numeric(NumericType::I16),
            "ushort" | "uint16" => Numeric(NumericType::U16),
            "int" | "int32" | "integer" => Numeric(NumericType::I32),
            "uint" | "uint32" => Numeric(NumericType::U32),
            "long" | "int64" => Numeric(NumericType::I64),
            "ulong" | "uint64" => Numeric(NumericType::U64),
            "float" | "single" => Numeric(NumericType::Float),
            "double" => Numeric(NumericType::Double),
            "decimal" => Numeric(NumericType::Decimal),
            "bool" | "boolean" => Bool,
            "char" => Char,
            "string" => String,
            "guid" | "uuid" => Guid,
            "bin" | "binary" => Binary,
            "uri" | "url" => Uri,
            "date" | "datetime" => DateTime(DateTimeKind::Local),
            "utc" => DateTime(DateTimeKind::Utc),
            "time" | "timespan" => TimeSpan,
            _ => return None,
        };
        Some(ty)
    }
}

fn parse_bool(word: &str) -> Option<bool> {
    match word.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Character-level scanner that turns an RQL string into tokens.
///
/// Literal types are decided here, not in the parser: `5` is an int32,
/// `5L` an int64, `2000-01-01` a date and `1-1` a bare word.
pub struct Lexer {
    reader: CharReader,
    options: ParseOptions,
    last: Option<Symbol>,
    /// Set after a sign split off a non-numeric run such as `-1abc`.
    word_follows_sign: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    pub fn with_options(input: &str, options: ParseOptions) -> Self {
        Lexer {
            reader: CharReader::new(input),
            options,
            last: None,
            word_follows_sign: false,
        }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    fn skip_whitespace(&mut self) {
        self.reader.read_while(char::is_whitespace);
    }

    fn punct(&mut self, symbol: Symbol, len: usize, start: usize) -> Token {
        for _ in 0..len {
            self.reader.read();
        }
        Token::new(symbol, self.reader.slice_from(start), start)
    }

    fn literal(&self, value: Value, start: usize) -> Token {
        Token::literal(value, self.reader.slice_from(start), start)
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let start = self.reader.position();

        let token = match self.reader.peek() {
            None => Token::eof(start),
            Some(ch) => self
                .scan_token(ch, start)
                .map_err(|message| RqlError::lex(start, message))?,
        };

        trace!("token {:?} {:?} at {}", token.symbol, token.text, token.position);
        self.last = Some(token.symbol);
        Ok(token)
    }

    fn scan_token(&mut self, ch: char, start: usize) -> Scan<Token> {
        if std::mem::take(&mut self.word_follows_sign) {
            let word = self.reader.read_while(is_word_char);
            return Ok(Token::new(Symbol::Property, word, start));
        }
        let next = self.reader.peek_ahead(1);
        let token = match ch {
            '(' => self.punct(Symbol::LParen, 1, start),
            ')' => self.punct(Symbol::RParen, 1, start),
            ',' => self.punct(Symbol::Comma, 1, start),
            '&' => self.punct(Symbol::Ampersand, 1, start),
            '|' => self.punct(Symbol::Pipe, 1, start),
            '=' => self.scan_equals(start),
            '!' if next == Some('=') => self.punct(Symbol::Ne, 2, start),
            '!' => return Err("unexpected '!': expecting !=".to_string()),
            '<' if next == Some('=') => self.punct(Symbol::Le, 2, start),
            '<' => self.punct(Symbol::Lt, 1, start),
            '>' if next == Some('=') => self.punct(Symbol::Ge, 2, start),
            '>' => self.punct(Symbol::Gt, 1, start),
            '"' => {
                let body = text::scan_quoted(&mut self.reader, '"')?;
                self.literal(Value::String(body), start)
            }
            '\'' => {
                let ch = text::scan_char(&mut self.reader)?;
                self.literal(Value::Char(ch), start)
            }
            '/' if self.follows_word() => self.punct(Symbol::Slash, 1, start),
            '/' => {
                let uri = text::scan_uri(&mut self.reader);
                self.literal(Value::Uri(uri), start)
            }
            '+' | '-' if next.is_some_and(|c| c.is_ascii_digit() || c == '.') => {
                self.scan_digits(start)?
            }
            '+' => self.punct(Symbol::Plus, 1, start),
            '-' => self.punct(Symbol::Minus, 1, start),
            '.' if next.is_some_and(|c| c.is_ascii_digit()) => self.scan_digits(start)?,
            c if c.is_ascii_digit() => self.scan_digits(start)?,
            ':' => return Err("unexpected ':': expecting a type prefix before it".to_string()),
            _ => self.scan_word(start)?,
        };
        Ok(token)
    }

    /// `/` right after a bare word or an unquoted literal separates path segments.
    fn follows_word(&self) -> bool {
        matches!(self.last, Some(Symbol::Property | Symbol::Literal))
            && self.reader.previous().is_some_and(is_word_char)
    }

    /// `=` or one of the FIQL forms `=eq=`, `=ne=`, `=lt=`, `=le=`, `=gt=`, `=ge=`.
    fn scan_equals(&mut self, start: usize) -> Token {
        self.reader.read();
        let mark = self.reader.position();
        let word = self.reader.read_while_n(2, |c| c.is_ascii_alphabetic());
        let symbol = match word.to_ascii_lowercase().as_str() {
            "eq" => Some(Symbol::Eq),
            "ne" => Some(Symbol::Ne),
            "lt" => Some(Symbol::Lt),
            "le" => Some(Symbol::Le),
            "gt" => Some(Symbol::Gt),
            "ge" => Some(Symbol::Ge),
            _ => None,
        };
        match symbol {
            Some(symbol) if self.reader.read_if(|c| c == '=').is_some() => {
                Token::new(symbol, self.reader.slice_from(start), start)
            }
            _ => {
                self.reader.set_position(mark);
                Token::new(Symbol::Eq, "=", start)
            }
        }
    }

    /// Digit-started runs, tried from the most to the least committed form.
    fn scan_digits(&mut self, start: usize) -> Scan<Token> {
        let local = self.options.local_offset;
        let reader = &mut self.reader;

        let value = if text::guid_ahead(reader) {
            Value::Guid(text::scan_guid(reader)?)
        } else if numeric::hex_ahead(reader) {
            numeric::scan_hex(reader)?
        } else if temporal::timespan_ahead(reader) {
            temporal::scan_timespan(reader)?
        } else if temporal::date_ahead(reader) {
            temporal::scan_datetime(reader, DateTimeKind::Local, local)?
        } else {
            match numeric::scan_number(reader)? {
                Some(value) => value,
                None => {
                    reader.set_position(start);
                    let sign = match reader.peek() {
                        Some('-') => Some(Symbol::Minus),
                        Some('+') => Some(Symbol::Plus),
                        _ => None,
                    };
                    if let Some(sign) = sign {
                        self.word_follows_sign = true;
                        return Ok(self.punct(sign, 1, start));
                    }
                    let word = reader.read_while(is_word_char);
                    return Ok(Token::new(Symbol::Property, word, start));
                }
            }
        };
        Ok(self.literal(value, start))
    }

    fn scan_word(&mut self, start: usize) -> Scan<Token> {
        if text::guid_ahead(&self.reader) {
            let guid = text::scan_guid(&mut self.reader)?;
            return Ok(self.literal(Value::Guid(guid), start));
        }

        let word = self.reader.read_while(is_word_char);
        if word.is_empty() {
            let ch = self.reader.peek().unwrap_or_default();
            return Err(format!("unexpected character '{}'", ch));
        }

        if self.reader.peek() == Some(':') {
            return self.scan_prefixed(&word, start);
        }

        if self.paren_follows() {
            if let Some(function) = Function::from_word(&word) {
                return Ok(Token::new(Symbol::Function(function), word, start));
            }
        }

        let token = match word.to_ascii_lowercase().as_str() {
            "null" => self.literal(Value::Null, start),
            "true" => self.literal(Value::Bool(true), start),
            "false" => self.literal(Value::Bool(false), start),
            _ => Token::new(Symbol::Property, word, start),
        };
        Ok(token)
    }

    /// `(` after optional spaces.
    fn paren_follows(&self) -> bool {
        let spaces = self.reader.count_ahead(char::is_whitespace);
        self.reader.peek_ahead(spaces) == Some('(')
    }

    /// Literal after `word:`; the reader sits on the colon.
    fn scan_prefixed(&mut self, word: &str, start: usize) -> Scan<Token> {
        let scheme = word.eq_ignore_ascii_case("http") || word.eq_ignore_ascii_case("https");
        if scheme && self.reader.peek_ahead(1) == Some('/') && self.reader.peek_ahead(2) == Some('/') {
            self.reader.set_position(start);
            let uri = text::scan_uri(&mut self.reader);
            return Ok(self.literal(Value::Uri(uri), start));
        }

        let ty = LiteralType::from_prefix(word)
            .ok_or_else(|| format!("unknown type prefix '{}:'", word))?;
        self.reader.read();

        let local = self.options.local_offset;
        let reader = &mut self.reader;
        let value = match ty {
            LiteralType::Numeric(target) => numeric::scan_typed_number(reader, target)?,
            LiteralType::Bool => {
                let body = quoted_or_word(reader)?;
                let flag = parse_bool(&body).ok_or_else(|| {
                    format!("invalid bool literal {}: expecting true, false, yes, no, y, n, 1 or 0", reader.slice_from(start))
                })?;
                Value::Bool(flag)
            }
            LiteralType::Char => {
                let body = match reader.peek() {
                    Some('\'') => text::scan_char(reader)?.to_string(),
                    _ => quoted_or_word(reader)?,
                };
                let ch = text::single_char(&body).ok_or_else(|| {
                    format!("invalid char literal {}: expecting exactly one character", reader.slice_from(start))
                })?;
                Value::Char(ch)
            }
            LiteralType::String => {
                let body = match reader.peek() {
                    Some('\'') => text::scan_quoted(reader, '\'')?,
                    _ => quoted_or_word(reader)?,
                };
                Value::String(body)
            }
            LiteralType::Guid => match reader.peek() {
                Some('"') => Value::Guid(text::parse_guid(&text::scan_quoted(reader, '"')?)?),
                _ => Value::Guid(text::scan_guid(reader)?),
            },
            LiteralType::Binary => {
                let body = match reader.peek() {
                    Some('"') => text::scan_quoted(reader, '"')?,
                    _ => reader.read_while(text::is_base64_char),
                };
                Value::Binary(text::decode_base64(&body)?)
            }
            LiteralType::Uri => match reader.peek() {
                Some('"') => Value::Uri(text::scan_quoted(reader, '"')?),
                _ => {
                    let uri = text::scan_uri(reader);
                    if uri.is_empty() {
                        return Err(format!("invalid uri literal {}: expecting a uri", reader.slice_from(start)));
                    }
                    Value::Uri(uri)
                }
            },
            LiteralType::DateTime(kind) => match reader.peek() {
                Some('"') => {
                    let body = text::scan_quoted(reader, '"')?;
                    rescan(&body, |sub| temporal::scan_datetime(sub, kind, local))?
                }
                _ => temporal::scan_datetime(reader, kind, local)?,
            },
            LiteralType::TimeSpan => match reader.peek() {
                Some('"') => {
                    let body = text::scan_quoted(reader, '"')?;
                    rescan(&body, temporal::scan_timespan)?
                }
                _ => temporal::scan_timespan(reader)?,
            },
        };
        Ok(self.literal(value, start))
    }

    /// Drains the input into a queue ending with an EOF token.
    pub fn scan(mut self) -> Result<TokenQueue> {
        let mut queue = TokenQueue::new();
        loop {
            let token = self.next_token()?;
            let done = token.is(Symbol::Eof);
            queue.enqueue(token);
            if done {
                break;
            }
        }
        debug!("scanned {} tokens", queue.len());
        Ok(queue)
    }
}

/// Quoted body, or a bare word up to the next terminator.
fn quoted_or_word(reader: &mut CharReader) -> Scan<String> {
    match reader.peek() {
        Some('"') => text::scan_quoted(reader, '"'),
        _ => {
            let word = reader.read_while(is_word_char);
            if word.is_empty() {
                Err("expecting a value after the type prefix".to_string())
            } else {
                Ok(word)
            }
        }
    }
}

/// Runs a scanner over the body of a quoted literal, which must consume it whole.
fn rescan(body: &str, scanner: impl FnOnce(&mut CharReader) -> Scan<Value>) -> Scan<Value> {
    let mut sub = CharReader::new(body.trim());
    let value = scanner(&mut sub)?;
    if !sub.at_end() {
        return Err(format!("unexpected trailing characters in \"{}\"", body));
    }
    Ok(value)
}

/// Tokenizes `input` in one pass.
pub fn scan(input: &str, options: &ParseOptions) -> Result<TokenQueue> {
    Lexer::with_options(input, *options).scan()
}

#[cfg(test)]
fn symbols(input: &str) -> Vec<Symbol> {
    scan(input, &ParseOptions::utc())
        .unwrap()
        .into_iter()
        .map(|t| t.symbol)
        .collect()
}

#[test]
fn test_infix_operators() {
    use Symbol::*;
    assert_eq!(
        symbols("A=1&B!=2|C<3 D<=4 E>5 F>=6"),
        vec![
            Property, Eq, Literal, Ampersand, Property, Ne, Literal, Pipe, Property, Lt, Literal,
            Property, Le, Literal, Property, Gt, Literal, Property, Ge, Literal, Eof
        ]
    );
}

#[test]
fn test_fiql_backtrack() {
    use Symbol::*;
    assert_eq!(symbols("A=ne=1"), vec![Property, Ne, Literal, Eof]);
    assert_eq!(symbols("A=GE=1"), vec![Property, Ge, Literal, Eof]);
    assert_eq!(symbols("A=new"), vec![Property, Eq, Property, Eof]);
}

#[test]
fn test_function_requires_paren() {
    assert_eq!(
        symbols("select (A)")[0],
        Symbol::Function(Function::Select)
    );
    assert_eq!(symbols("select=1")[0], Symbol::Property);
    assert_eq!(symbols("Sort(A)")[0], Symbol::Function(Function::Sort));
}

#[test]
fn test_slash_after_word() {
    use Symbol::*;
    assert_eq!(symbols("A/B=1"), vec![Property, Slash, Property, Eq, Literal, Eof]);
    let mut lexer = Lexer::new("A=/x/y");
    lexer.next_token().unwrap();
    lexer.next_token().unwrap();
    let uri = lexer.next_token().unwrap();
    assert_eq!(uri.value, Some(Value::Uri("/x/y".to_string())));
}

#[test]
fn test_sign_versus_sort_marker() {
    assert_eq!(
        symbols("sort(-A,+B)"),
        vec![
            Symbol::Function(Function::Sort),
            Symbol::LParen,
            Symbol::Minus,
            Symbol::Property,
            Symbol::Comma,
            Symbol::Plus,
            Symbol::Property,
            Symbol::RParen,
            Symbol::Eof
        ]
    );
    let mut lexer = Lexer::new("-5");
    assert_eq!(lexer.next_token().unwrap().value, Some(Value::I32(-5)));
}

#[test]
fn test_sign_splits_from_bare_word() {
    let mut lexer = Lexer::new("-1abc,+2x");
    let minus = lexer.next_token().unwrap();
    assert_eq!((minus.symbol, minus.position), (Symbol::Minus, 0));
    let word = lexer.next_token().unwrap();
    assert_eq!((word.symbol, word.text.as_str(), word.position), (Symbol::Property, "1abc", 1));
    assert_eq!(lexer.next_token().unwrap().symbol, Symbol::Comma);
    assert_eq!(lexer.next_token().unwrap().symbol, Symbol::Plus);
    assert_eq!(lexer.next_token().unwrap().text, "2x");
}

#[test]
fn test_unknown_prefix() {
    let err = scan("A=foo:1", &ParseOptions::utc()).unwrap_err();
    assert_eq!(err, RqlError::lex(2, "unknown type prefix 'foo:'"));
}

#[test]
fn test_bool_prefix() {
    let mut lexer = Lexer::new("bool:yes");
    assert_eq!(lexer.next_token().unwrap().value, Some(Value::Bool(true)));
    let mut lexer = Lexer::new("yes");
    assert_eq!(lexer.next_token().unwrap().symbol, Symbol::Property);
}
