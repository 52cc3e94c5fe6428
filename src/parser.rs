use log::debug;

use crate::{
    ast::{
        AggregateOp, CompareOp, Function, Limit, MatchOp, MembershipOp, Property, QueryNode,
        SortOrder, SortProperty, Symbol, Token, node::limit_argument,
    },
    error::{Result, RqlError},
    lexer::Lexer,
    options::ParseOptions,
    queue::TokenQueue,
    value::Value,
};

mod validate;

/// Recursive-descent parser over a scanned token queue.
///
/// Each grammar position is one method; the expected construct named in an
/// error is the one that method was looking for.
pub struct Parser {
    tokens: TokenQueue,
    options: ParseOptions,
    end: usize,
}

impl Parser {
    /// Scans the whole input up front; lexical errors surface here.
    pub fn new(lexer: Lexer) -> Result<Self> {
        let options = lexer.options();
        let tokens = lexer.scan()?;
        Ok(Self::from_tokens(tokens, options))
    }

    pub fn from_tokens(tokens: TokenQueue, options: ParseOptions) -> Self {
        let end = tokens.iter().last().map_or(0, |t| t.position);
        Parser {
            tokens,
            options,
            end,
        }
    }

    fn advance(&mut self) -> Token {
        self.tokens
            .dequeue()
            .unwrap_or_else(|| Token::eof(self.end))
    }

    fn peek_symbol(&self) -> Symbol {
        self.tokens.peek().map_or(Symbol::Eof, |t| t.symbol)
    }

    fn peek_symbol_at(&self, offset: usize) -> Symbol {
        self.tokens.peek_ahead(offset).map_or(Symbol::Eof, |t| t.symbol)
    }

    fn check(&self, symbol: Symbol) -> bool {
        self.peek_symbol() == symbol
    }

    fn unexpected(&self, token: &Token, expected: &str) -> RqlError {
        RqlError::syntax(
            token.position,
            format!("unexpected {} expecting {}", token.describe(), expected),
        )
    }

    fn expect(&mut self, symbol: Symbol, expected: &str) -> Result<Token> {
        let token = self.advance();
        if token.is(symbol) {
            Ok(token)
        } else {
            Err(self.unexpected(&token, expected))
        }
    }

    /// Parses a complete query and validates it.
    pub fn parse(&mut self) -> Result<QueryNode> {
        if self.check(Symbol::Eof) {
            return Ok(QueryNode::Noop);
        }
        let node = self.parse_clauses()?;
        self.expect(Symbol::Eof, "& or | or end of input")?;
        validate::finish(node, &self.options)
    }

    /// `term ('&' term)*` or `term ('|' term)*`
    fn parse_clauses(&mut self) -> Result<QueryNode> {
        let first = self.parse_term()?;
        let joiner = match self.peek_symbol() {
            joiner @ (Symbol::Ampersand | Symbol::Pipe) => joiner,
            _ => return Ok(first),
        };

        let mut nodes = vec![first];
        while self.check(joiner) {
            self.advance();
            nodes.push(self.parse_term()?);
        }

        if matches!(self.peek_symbol(), Symbol::Ampersand | Symbol::Pipe) {
            let token = self.advance();
            return Err(RqlError::syntax(
                token.position,
                format!(
                    "unexpected {} after {}: group mixed & and | with parentheses",
                    token.describe(),
                    joiner
                ),
            ));
        }

        Ok(match joiner {
            Symbol::Ampersand => QueryNode::And(nodes),
            _ => QueryNode::Or(nodes),
        })
    }

    fn parse_term(&mut self) -> Result<QueryNode> {
        match self.peek_symbol() {
            Symbol::LParen if self.compound_property_ahead() => {
                let property = self.parse_property()?;
                self.parse_infix(property)
            }
            Symbol::LParen => {
                self.advance();
                let node = self.parse_clauses()?;
                self.expect(Symbol::RParen, "closing )")?;
                Ok(node)
            }
            Symbol::Function(function) => self.parse_function(function),
            Symbol::Property => {
                let property = self.parse_property()?;
                self.parse_infix(property)
            }
            _ => {
                let token = self.advance();
                Err(self.unexpected(&token, "PROPERTY"))
            }
        }
    }

    /// `(` PROPERTY then `,` or `)` opens a compound property, not a group.
    /// The property may itself carry `/` segments.
    fn compound_property_ahead(&self) -> bool {
        if self.peek_symbol_at(1) != Symbol::Property {
            return false;
        }
        let mut offset = 2;
        while self.peek_symbol_at(offset) == Symbol::Slash
            && matches!(self.peek_symbol_at(offset + 1), Symbol::Property | Symbol::Literal)
        {
            offset += 2;
        }
        matches!(self.peek_symbol_at(offset), Symbol::Comma | Symbol::RParen)
    }

    /// `A.B`, `A/B` or `(A,B)`
    fn parse_property(&mut self) -> Result<Property> {
        if self.check(Symbol::LParen) {
            self.advance();
            let mut property = Property::new(Vec::<String>::new());
            loop {
                property.extend(self.parse_path()?);
                if self.check(Symbol::Comma) {
                    self.advance();
                } else {
                    self.expect(Symbol::RParen, "closing )")?;
                    return Ok(property);
                }
            }
        }

        self.parse_path()
    }

    /// PROPERTY with any `/` segments after it.
    fn parse_path(&mut self) -> Result<Property> {
        let token = self.expect(Symbol::Property, "PROPERTY")?;
        let mut property = Property::parse(&token.text);
        while self.check(Symbol::Slash) {
            self.advance();
            let segment = self.advance();
            match segment.symbol {
                Symbol::Property => property.extend(Property::parse(&segment.text)),
                Symbol::Literal if segment.value.as_ref().is_some_and(|v| v.as_integer().is_some()) => {
                    property.push(segment.text)
                }
                _ => return Err(self.unexpected(&segment, "PROPERTY")),
            }
        }
        Ok(property)
    }

    fn parse_infix(&mut self, property: Property) -> Result<QueryNode> {
        let token = self.advance();
        let op = match token.symbol {
            Symbol::Eq => CompareOp::Eq,
            Symbol::Ne => CompareOp::Ne,
            Symbol::Lt => CompareOp::Lt,
            Symbol::Le => CompareOp::Le,
            Symbol::Gt => CompareOp::Gt,
            Symbol::Ge => CompareOp::Ge,
            _ => return Err(self.unexpected(&token, "= != < <= > or >=")),
        };
        let value = self.parse_value()?;
        Ok(QueryNode::compare(op, property, value))
    }

    /// A literal, or a bare word read as a string.
    fn parse_value(&mut self) -> Result<Value> {
        let token = self.advance();
        match token.symbol {
            Symbol::Literal => Ok(token.value.unwrap_or(Value::Null)),
            Symbol::Property => Ok(Value::String(self.bare_string(token.text))),
            Symbol::Plus | Symbol::Minus if self.check(Symbol::Property) => {
                let word = self.advance();
                Ok(Value::String(self.bare_string(token.text + &word.text)))
            }
            _ => Err(self.unexpected(&token, "VALUE")),
        }
    }

    /// Rejoins `/`-separated words of a bare value.
    fn bare_string(&mut self, mut text: String) -> String {
        while self.check(Symbol::Slash) && self.peek_symbol_at(1) == Symbol::Property {
            self.advance();
            text.push('/');
            text.push_str(&self.advance().text);
        }
        text
    }

    /// Comma-separated, non-empty argument list; the caller consumes the parens.
    fn parse_list<T>(&mut self, mut item: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let mut items = vec![item(self)?];
        while self.check(Symbol::Comma) {
            self.advance();
            items.push(item(self)?);
        }
        Ok(items)
    }

    fn expect_comma(&mut self) -> Result<()> {
        self.expect(Symbol::Comma, ",").map(|_| ())
    }

    fn parse_function(&mut self, function: Function) -> Result<QueryNode> {
        let name = self.advance();
        self.expect(Symbol::LParen, "(")?;

        let node = match function {
            Function::Limit => self.parse_limit()?,
            Function::Select => QueryNode::Select(self.parse_list(Self::parse_property)?),
            Function::Sort => QueryNode::Sort(self.parse_list(Self::parse_sort_key)?),
            Function::And => QueryNode::And(self.parse_list(Self::parse_clauses)?),
            Function::Or => QueryNode::Or(self.parse_list(Self::parse_clauses)?),
            Function::Eq => self.parse_comparison(CompareOp::Eq)?,
            Function::Ne => self.parse_comparison(CompareOp::Ne)?,
            Function::Lt => self.parse_comparison(CompareOp::Lt)?,
            Function::Le => self.parse_comparison(CompareOp::Le)?,
            Function::Gt => self.parse_comparison(CompareOp::Gt)?,
            Function::Ge => self.parse_comparison(CompareOp::Ge)?,
            Function::Like => self.parse_match(MatchOp::Like)?,
            Function::Contains => self.parse_match(MatchOp::Contains)?,
            Function::Excludes => self.parse_match(MatchOp::Excludes)?,
            Function::In => self.parse_membership(MembershipOp::In)?,
            Function::Out => self.parse_membership(MembershipOp::Out)?,
            Function::Distinct => QueryNode::Distinct,
            Function::First => QueryNode::First,
            Function::One => QueryNode::One,
            Function::Count if self.check(Symbol::RParen) => QueryNode::Count(None),
            Function::Count => QueryNode::Count(Some(self.parse_property()?)),
            Function::Values => QueryNode::Values(self.parse_property()?),
            Function::Sum => QueryNode::function(AggregateOp::Sum, self.parse_property()?),
            Function::Min => QueryNode::function(AggregateOp::Min, self.parse_property()?),
            Function::Max => QueryNode::function(AggregateOp::Max, self.parse_property()?),
            Function::Mean => QueryNode::function(AggregateOp::Mean, self.parse_property()?),
            Function::Aggregate => self.parse_aggregate()?,
        };

        self.expect(Symbol::RParen, "closing )")?;
        debug!("parsed {} clause at {}", name.text, name.position);
        Ok(node)
    }

    fn parse_limit_argument(&mut self) -> Result<u64> {
        let token = self.advance();
        match &token.value {
            Some(value) if token.is(Symbol::Literal) => {
                limit_argument(value).map_err(|e| RqlError::syntax(token.position, e.message()))
            }
            _ => Err(self.unexpected(&token, "a non-negative integer")),
        }
    }

    fn parse_limit(&mut self) -> Result<QueryNode> {
        let first = self.parse_limit_argument()?;
        if !self.check(Symbol::Comma) {
            return Ok(QueryNode::Limit(Limit::new(first)));
        }
        self.advance();
        let count = self.parse_limit_argument()?;
        Ok(QueryNode::Limit(Limit::page(first, count)))
    }

    fn parse_sort_key(&mut self) -> Result<SortProperty> {
        let order = match self.peek_symbol() {
            Symbol::Minus => {
                self.advance();
                SortOrder::Descending
            }
            Symbol::Plus => {
                self.advance();
                SortOrder::Ascending
            }
            _ => SortOrder::Ascending,
        };
        Ok(SortProperty::new(order, self.parse_property()?))
    }

    fn parse_comparison(&mut self, op: CompareOp) -> Result<QueryNode> {
        let property = self.parse_property()?;
        self.expect_comma()?;
        let value = self.parse_value()?;
        Ok(QueryNode::compare(op, property, value))
    }

    fn parse_match(&mut self, op: MatchOp) -> Result<QueryNode> {
        let property = self.parse_property()?;
        self.expect_comma()?;
        let position = self.tokens.peek().map_or(self.end, |t| t.position);
        let pattern = self.parse_value()?;
        if op == MatchOp::Like && !matches!(pattern, Value::String(_) | Value::Char(_)) {
            return Err(RqlError::syntax(
                position,
                format!("like expects a string pattern, got {} value", pattern.type_name()),
            ));
        }
        Ok(QueryNode::matching(op, property, pattern))
    }

    fn parse_membership(&mut self, op: MembershipOp) -> Result<QueryNode> {
        let property = self.parse_property()?;
        self.expect_comma()?;
        let values = self.parse_list(Self::parse_value)?;
        Ok(QueryNode::membership(op, property, values))
    }

    /// Grouping properties first, then `sum min max mean count` calls.
    fn parse_aggregate(&mut self) -> Result<QueryNode> {
        let mut node = QueryNode::Aggregate {
            groups: Vec::new(),
            functions: Vec::new(),
        };
        loop {
            let position = self.tokens.peek().map_or(self.end, |t| t.position);
            match self.peek_symbol() {
                Symbol::Function(
                    function @ (Function::Sum
                    | Function::Min
                    | Function::Max
                    | Function::Mean
                    | Function::Count),
                ) => {
                    let function = self.parse_function(function)?;
                    node.add(function)
                        .map_err(|e| RqlError::syntax(position, e.message()))?;
                }
                Symbol::Property | Symbol::LParen => {
                    let property = self.parse_property()?;
                    node.add(property)
                        .map_err(|e| RqlError::syntax(position, e.message()))?;
                }
                _ => {
                    let token = self.advance();
                    return Err(self.unexpected(&token, "PROPERTY or an aggregate function"));
                }
            }
            if !self.check(Symbol::Comma) {
                return Ok(node);
            }
            self.advance();
        }
    }
}

/// Percent-decodes when enabled, then strips `?` and `RQL=`.
fn prepare(text: &str, options: &ParseOptions) -> Result<String> {
    let decoded = if options.url_decode {
        urlencoding::decode(text)
            .map_err(|e| RqlError::lex(0, format!("invalid percent-encoding: {}", e)))?
            .into_owned()
    } else {
        text.to_string()
    };

    let query = decoded.trim();
    let query = query.strip_prefix('?').unwrap_or(query);
    let query = match query.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("rql=") => &query[4..],
        _ => query,
    };
    Ok(query.to_string())
}

/// Compiles a query string with default options.
///
/// # Examples
///
/// ```
/// use rql_lang::{parse, QueryNode, Operation};
///
/// let node = parse("?Name=John&sort(-Age)").unwrap();
/// assert_eq!(node.operation(), Operation::And);
/// assert_eq!(parse("").unwrap(), QueryNode::Noop);
/// ```
pub fn parse(text: &str) -> Result<QueryNode> {
    parse_with(text, &ParseOptions::default())
}

pub fn parse_with(text: &str, options: &ParseOptions) -> Result<QueryNode> {
    let query = prepare(text, options)?;
    debug!("compiling query {:?}", query);
    let lexer = Lexer::with_options(&query, *options);
    Parser::new(lexer)?.parse()
}
