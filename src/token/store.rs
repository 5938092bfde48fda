use crate::token::errors::TokenError;
use crate::token::kind::TokenKind;

/// The atomic unit of analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw lexeme, possibly empty
    pub text: String,
    /// 1-based line of the first character
    pub line: usize,
    /// 1-based column of the first character
    pub column: usize,
    /// Position of the paired opener/closer, if any
    pub matching: Option<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
            matching: None,
        }
    }

    /// Lexeme length in characters.
    pub fn length(&self) -> usize {
        self.text.chars().count()
    }

    /// True if the lexeme contains a line break.
    pub fn is_line_crossing(&self) -> bool {
        self.text.contains('\n') || self.text.contains('\r')
    }

    /// A whitespace token at column 1 that ends the line: an empty line.
    pub fn is_blank_line(&self) -> bool {
        self.kind.is_whitespace() && self.column == 1 && self.is_line_crossing()
    }
}

/// Ordered, position-indexed token sequence for one analysis pass.
///
/// Positions are array indices and never change while the store exists.
/// Construction validates bracket reciprocity and positional ordering.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: Vec<Token>,
}

impl TokenStore {
    pub fn new(tokens: Vec<Token>) -> Result<Self, TokenError> {
        validate(&tokens)?;
        Ok(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn has_position(&self, position: usize) -> bool {
        position < self.tokens.len()
    }

    pub fn get(&self, position: usize) -> Result<&Token, TokenError> {
        self.tokens.get(position).ok_or(TokenError::OutOfRange {
            position,
            len: self.tokens.len(),
        })
    }

    /// Kind at `position`, or `None` past the bounds.
    pub fn kind(&self, position: usize) -> Option<TokenKind> {
        self.tokens.get(position).map(|t| t.kind)
    }

    /// Text at `position`, or `None` past the bounds.
    pub fn text(&self, position: usize) -> Option<&str> {
        self.tokens.get(position).map(|t| t.text.as_str())
    }

    pub fn matching_bracket(&self, position: usize) -> Result<usize, TokenError> {
        self.get(position)?
            .matching
            .ok_or(TokenError::NoMatch { position })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Token)> {
        self.tokens.iter().enumerate()
    }

    /// Concatenated text of all tokens.
    pub fn source(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Concatenated text of the inclusive range `start..=end`.
    pub fn text_between(&self, start: usize, end: usize) -> String {
        if start > end {
            return String::new();
        }
        self.tokens
            .iter()
            .skip(start)
            .take(end - start + 1)
            .map(|t| t.text.as_str())
            .collect()
    }
}

fn validate(tokens: &[Token]) -> Result<(), TokenError> {
    for (position, token) in tokens.iter().enumerate() {
        if token.line == 0 || token.column == 0 {
            return Err(malformed(position, "line and column are 1-based"));
        }

        if token.kind.is_whitespace() && !token.text.chars().all(char::is_whitespace) {
            return Err(malformed(position, "whitespace token contains non-whitespace"));
        }

        if let Some(next) = tokens.get(position + 1) {
            let ordered = next.line > token.line
                || (next.line == token.line && next.column >= token.column);
            if !ordered {
                return Err(malformed(position + 1, "line/column decreases"));
            }
        }

        if let Some(other) = token.matching {
            let Some(partner) = tokens.get(other) else {
                return Err(malformed(position, "matching index out of range"));
            };
            if partner.matching != Some(position) {
                return Err(malformed(position, "matching index is not reciprocal"));
            }
            if !token.kind.pairs_with(partner.kind) {
                return Err(malformed(position, "matching index pairs incompatible kinds"));
            }
            let opener_first = token.kind.is_opener() == (position < other);
            if !opener_first {
                return Err(malformed(position, "closer precedes its opener"));
            }
        }
    }
    Ok(())
}

fn malformed(position: usize, reason: &str) -> TokenError {
    TokenError::Malformed {
        position,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paired(open: usize, close: usize, tokens: &mut [Token]) {
        tokens[open].matching = Some(close);
        tokens[close].matching = Some(open);
    }

    fn sample() -> Vec<Token> {
        let mut tokens = vec![
            Token::new(TokenKind::OpenCurly, "{", 1, 1),
            Token::new(TokenKind::Whitespace, "\n", 1, 2),
            Token::new(TokenKind::CloseCurly, "}", 2, 1),
        ];
        paired(0, 2, &mut tokens);
        tokens
    }

    #[test]
    fn test_get_out_of_range() {
        let store = TokenStore::new(sample()).unwrap();
        assert!(store.has_position(2));
        assert!(!store.has_position(3));
        assert!(matches!(
            store.get(3),
            Err(TokenError::OutOfRange { position: 3, len: 3 })
        ));
    }

    #[test]
    fn test_matching_bracket_is_symmetric() {
        let store = TokenStore::new(sample()).unwrap();
        assert_eq!(store.matching_bracket(0).unwrap(), 2);
        assert_eq!(store.matching_bracket(2).unwrap(), 0);
        assert!(matches!(
            store.matching_bracket(1),
            Err(TokenError::NoMatch { position: 1 })
        ));
    }

    #[test]
    fn test_rejects_one_sided_match() {
        let mut tokens = sample();
        tokens[2].matching = None;
        assert!(matches!(
            TokenStore::new(tokens),
            Err(TokenError::Malformed { position: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_decreasing_lines() {
        let tokens = vec![
            Token::new(TokenKind::Identifier, "a", 2, 1),
            Token::new(TokenKind::Identifier, "b", 1, 1),
        ];
        assert!(TokenStore::new(tokens).is_err());
    }

    #[test]
    fn test_rejects_text_in_whitespace() {
        let tokens = vec![Token::new(TokenKind::Whitespace, " x", 1, 1)];
        assert!(TokenStore::new(tokens).is_err());
    }

    #[test]
    fn test_blank_line_and_crossing() {
        let blank = Token::new(TokenKind::Whitespace, "\n", 3, 1);
        let trailing = Token::new(TokenKind::Whitespace, "\n", 3, 9);
        let indent = Token::new(TokenKind::Whitespace, "    ", 3, 1);
        assert!(blank.is_blank_line());
        assert!(trailing.is_line_crossing());
        assert!(!trailing.is_blank_line());
        assert!(!indent.is_line_crossing());
        assert_eq!(indent.length(), 4);
    }

    #[test]
    fn test_text_between() {
        let store = TokenStore::new(sample()).unwrap();
        assert_eq!(store.text_between(0, 2), "{\n}");
        assert_eq!(store.text_between(2, 0), "");
        assert_eq!(store.source(), "{\n}");
    }
}
