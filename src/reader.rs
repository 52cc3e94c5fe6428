/// Indexable, backtrackable cursor over the characters of a query string.
#[derive(Debug, Clone)]
pub struct CharReader {
    input: Vec<char>,
    position: usize,
}

impl CharReader {
    pub fn new(input: &str) -> Self {
        CharReader {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Character at the cursor, without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Character `offset` places past the cursor; `peek_ahead(0)` is `peek()`.
    pub fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    /// Consumes and returns the character at the cursor.
    pub fn read(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        Some(ch)
    }

    /// Consumes the next character only if it satisfies `pred`.
    pub fn read_if(&mut self, pred: impl Fn(char) -> bool) -> Option<char> {
        match self.peek() {
            Some(ch) if pred(ch) => self.read(),
            _ => None,
        }
    }

    /// Consumes characters while `pred` holds and returns them.
    pub fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut result = String::new();
        while let Some(ch) = self.read_if(&pred) {
            result.push(ch);
        }
        result
    }

    /// Like `read_while`, but stops after at most `limit` characters.
    pub fn read_while_n(&mut self, limit: usize, pred: impl Fn(char) -> bool) -> String {
        let mut result = String::new();
        while result.chars().count() < limit {
            match self.read_if(&pred) {
                Some(ch) => result.push(ch),
                None => break,
            }
        }
        result
    }

    /// Number of consecutive characters from the cursor satisfying `pred`.
    pub fn count_ahead(&self, pred: impl Fn(char) -> bool) -> usize {
        self.input[self.position.min(self.input.len())..]
            .iter()
            .take_while(|&&c| pred(c))
            .count()
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor, clamped to the end of input.
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.input.len());
    }

    /// Text between `start` and the cursor.
    pub fn slice_from(&self, start: usize) -> String {
        let start = start.min(self.position);
        self.input[start..self.position].iter().collect()
    }

    /// Character immediately before the cursor.
    pub fn previous(&self) -> Option<char> {
        self.position
            .checked_sub(1)
            .and_then(|i| self.input.get(i).copied())
    }
}
