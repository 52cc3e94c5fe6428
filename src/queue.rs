use std::collections::VecDeque;

use crate::ast::Token;

/// FIFO buffer of tokens between the lexer and the parser.
///
/// `requeue` gives a token back so it becomes the very next one read, which
/// is how one-token lookahead is undone.
#[derive(Debug, Clone, Default)]
pub struct TokenQueue {
    tokens: VecDeque<Token>,
}

impl TokenQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, token: Token) {
        self.tokens.push_back(token);
    }

    pub fn dequeue(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    pub fn requeue(&mut self, token: Token) {
        self.tokens.push_front(token);
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// Token `offset` places from the front; `peek_ahead(0)` is `peek()`.
    pub fn peek_ahead(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(offset)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }
}

impl IntoIterator for TokenQueue {
    type Item = Token;
    type IntoIter = std::collections::vec_deque::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Symbol;

    fn token(symbol: Symbol, text: &str) -> Token {
        Token::new(symbol, text, 0)
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = TokenQueue::new();
        queue.enqueue(token(Symbol::LParen, "("));
        queue.enqueue(token(Symbol::Property, "Name"));
        queue.enqueue(token(Symbol::RParen, ")"));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek().map(|t| t.symbol), Some(Symbol::LParen));
        assert_eq!(queue.peek_ahead(2).map(|t| t.symbol), Some(Symbol::RParen));
        assert_eq!(queue.dequeue().map(|t| t.symbol), Some(Symbol::LParen));
        assert_eq!(queue.dequeue().map(|t| t.symbol), Some(Symbol::Property));
    }

    #[test]
    fn test_requeue_goes_to_front() {
        let mut queue = TokenQueue::new();
        queue.enqueue(token(Symbol::Comma, ","));
        queue.enqueue(token(Symbol::Eof, ""));

        let first = queue.dequeue().unwrap();
        queue.requeue(first);
        queue.requeue(token(Symbol::Minus, "-"));

        let order: Vec<Symbol> = queue.into_iter().map(|t| t.symbol).collect();
        assert_eq!(order, vec![Symbol::Minus, Symbol::Comma, Symbol::Eof]);
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = TokenQueue::new();
        assert!(queue.is_empty());
        assert!(queue.peek().is_none());
        assert!(queue.dequeue().is_none());
    }
}
