use std::fmt;

use crate::value::Value;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    // Punctuation
    /// Opens an argument list or a group
    LParen,
    RParen,
    Comma,

    /// Top-level conjunction
    ///
    /// # Examples
    /// ```text
    /// Name=John&Age>30
    /// ```
    Ampersand,

    /// Top-level disjunction
    ///
    /// # Examples
    /// ```text
    /// Name=John|Name=Jane
    /// ```
    Pipe,

    /// Property path separator
    ///
    /// # Examples
    /// ```text
    /// Address/City=Boston
    /// ```
    Slash,

    /// Ascending sort marker
    Plus,

    /// Descending sort marker
    ///
    /// # Examples
    /// ```text
    /// sort(-LastName)
    /// ```
    Minus,

    // Infix comparison operators (`=` or `=eq=`, `!=` or `=ne=`, ...)
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    /// Reserved word immediately followed by `(`
    Function(Function),

    /// Bare member name, possibly dotted
    ///
    /// # Examples
    /// ```text
    /// LastName
    /// Address.City
    /// ```
    Property,

    /// Typed literal; the token carries the value
    Literal,

    /// End of input
    Eof,
}

/// Reserved function names of the functional syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Limit,
    Select,
    Sort,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    Contains,
    Excludes,
    In,
    Out,
    Distinct,
    First,
    One,
    Count,
    Values,
    Sum,
    Min,
    Max,
    Mean,
    Aggregate,
}

impl Function {
    /// Looks up a reserved word, ignoring case.
    pub fn from_word(word: &str) -> Option<Self> {
        use Function::*;
        let function = match word.to_ascii_lowercase().as_str() {
            "limit" => Limit,
            "select" => Select,
            "sort" => Sort,
            "and" => And,
            "or" => Or,
            "eq" => Eq,
            "ne" => Ne,
            "lt" => Lt,
            "le" => Le,
            "gt" => Gt,
            "ge" => Ge,
            "like" => Like,
            "contains" => Contains,
            "excludes" => Excludes,
            "in" => In,
            "out" => Out,
            "distinct" => Distinct,
            "first" => First,
            "one" => One,
            "count" => Count,
            "values" => Values,
            "sum" => Sum,
            "min" => Min,
            "max" => Max,
            "mean" => Mean,
            "aggregate" => Aggregate,
            _ => return None,
        };
        Some(function)
    }

    pub fn as_str(&self) -> &'static str {
        use Function::*;
        match self {
            Limit => "limit",
            Select => "select",
            Sort => "sort",
            And => "and",
            Or => "or",
            Eq => "eq",
            Ne => "ne",
            Lt => "lt",
            Le => "le",
            Gt => "gt",
            Ge => "ge",
            Like => "like",
            Contains => "contains",
            Excludes => "excludes",
            In => "in",
            Out => "out",
            Distinct => "distinct",
            First => "first",
            One => "one",
            Count => "count",
            Values => "values",
            Sum => "sum",
            Min => "min",
            Max => "max",
            Mean => "mean",
            Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Symbol::LParen => "(",
            Symbol::RParen => ")",
            Symbol::Comma => ",",
            Symbol::Ampersand => "&",
            Symbol::Pipe => "|",
            Symbol::Slash => "/",
            Symbol::Plus => "+",
            Symbol::Minus => "-",
            Symbol::Eq => "=",
            Symbol::Ne => "!=",
            Symbol::Lt => "<",
            Symbol::Le => "<=",
            Symbol::Gt => ">",
            Symbol::Ge => ">=",
            Symbol::Function(function) => function.as_str(),
            Symbol::Property => "PROPERTY",
            Symbol::Literal => "VALUE",
            Symbol::Eof => "end of input",
        };
        f.write_str(text)
    }
}

/// A token produced by the lexer: a symbol, its typed value for literals,
/// the lexeme as written and where it started.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub symbol: Symbol,
    pub value: Option<Value>,
    pub text: String,
    pub position: usize,
}

impl Token {
    pub fn new(symbol: Symbol, text: impl Into<String>, position: usize) -> Self {
        Token {
            symbol,
            value: None,
            text: text.into(),
            position,
        }
    }

    pub fn literal(value: Value, text: impl Into<String>, position: usize) -> Self {
        Token {
            symbol: Symbol::Literal,
            value: Some(value),
            text: text.into(),
            position,
        }
    }

    pub fn eof(position: usize) -> Self {
        Token::new(Symbol::Eof, "", position)
    }

    pub fn is(&self, symbol: Symbol) -> bool {
        self.symbol == symbol
    }

    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self.symbol {
            Symbol::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}
