//! Reference tokenizer for PHP-like source.
//!
//! The engine only consumes [`TokenStore`]s; this tokenizer exists so the
//! engine can be driven end to end from source text. Conventions:
//!
//! - whitespace runs are split after every line break, so a whitespace token
//!   never spans two lines and an empty line is a column-1 whitespace token
//!   ending in a newline
//! - `//` and `#` comments include their terminating newline; `/* */`
//!   comments are split into one token per line
//! - doc comments are split into open/star/whitespace/tag/string/close parts
//! - the open tag absorbs exactly one following whitespace character

mod errors;

pub use errors::LexError;

use crate::token::kind::operators_by_length;
use crate::token::{Keyword, Operator, Token, TokenKind, TokenStore};

/// Tokenize `source` into a validated store with bracket links.
pub fn tokenize(source: &str) -> Result<TokenStore, LexError> {
    let mut lexer = Lexer::new(source);
    lexer.run();
    let tokens = lexer.finish();
    Ok(TokenStore::new(tokens)?)
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    brackets: Vec<usize>,
    operators: Vec<Operator>,
    in_code: bool,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            brackets: Vec::new(),
            operators: operators_by_length(),
            in_code: false,
        }
    }

    fn finish(self) -> Vec<Token> {
        self.tokens
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(c))
    }

    fn starts_with_ignore_case(&self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek(i).is_some_and(|p| p.eq_ignore_ascii_case(&c)))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.bump().is_none() {
                break;
            }
        }
    }

    /// Consume a line break (`\n` or `\r\n`) if one starts here.
    fn bump_newline(&mut self) -> bool {
        if self.starts_with("\r\n") {
            self.bump_n(2);
            true
        } else if self.peek(0) == Some('\n') {
            self.bump();
            true
        } else {
            false
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) -> usize {
        let text: String = self.chars[start..self.pos].iter().collect();
        self.tokens.push(Token::new(kind, text, line, column));
        self.tokens.len() - 1
    }

    fn run(&mut self) {
        while self.pos < self.chars.len() {
            if self.in_code {
                self.lex_code();
            } else {
                self.lex_inline();
            }
        }
    }

    fn lex_inline(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        while self.pos < self.chars.len() && !self.at_open_tag() {
            self.bump();
        }
        if self.pos > start {
            self.push(TokenKind::InlineHtml, start, line, column);
        }
        if self.pos < self.chars.len() {
            self.lex_open_tag();
        }
    }

    fn at_open_tag(&self) -> bool {
        self.starts_with_ignore_case("<?php") || self.starts_with("<?=")
    }

    fn lex_open_tag(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        if self.starts_with("<?=") {
            self.bump_n(3);
        } else {
            self.bump_n(5);
            if !self.bump_newline() && matches!(self.peek(0), Some(' ' | '\t')) {
                self.bump();
            }
        }
        self.push(TokenKind::OpenTag, start, line, column);
        self.in_code = true;
    }

    fn lex_code(&mut self) {
        let Some(c) = self.peek(0) else {
            return;
        };
        let (start, line, column) = (self.pos, self.line, self.column);

        if self.starts_with("?>") {
            self.bump_n(2);
            self.push(TokenKind::CloseTag, start, line, column);
            self.in_code = false;
            return;
        }

        if c.is_whitespace() {
            self.lex_whitespace();
            return;
        }

        if self.starts_with("/**") && self.peek(3).is_some_and(char::is_whitespace) {
            self.lex_doc_comment();
            return;
        }

        if self.starts_with("/*") {
            self.lex_block_comment();
            return;
        }

        if self.starts_with("//") || (c == '#' && self.peek(1) != Some('[')) {
            self.lex_line_comment();
            return;
        }

        if c == '$' && self.peek(1).is_some_and(is_word_start) {
            self.bump();
            while self.peek(0).is_some_and(is_word_char) {
                self.bump();
            }
            self.push(TokenKind::Variable, start, line, column);
            return;
        }

        if is_word_start(c) || c == '\\' {
            self.lex_word();
            return;
        }

        if c.is_ascii_digit() {
            self.lex_number();
            return;
        }

        if matches!(c, '\'' | '"' | '`') {
            self.lex_string(c);
            return;
        }

        match c {
            '(' | '{' | '[' => {
                self.bump();
                let kind = match c {
                    '(' => TokenKind::OpenParen,
                    '{' => TokenKind::OpenCurly,
                    _ => self.square_kind(),
                };
                let index = self.push(kind, start, line, column);
                self.brackets.push(index);
            }
            ')' | '}' | ']' => {
                self.bump();
                self.lex_closer(c, start, line, column);
            }
            ',' => {
                self.bump();
                self.push(TokenKind::Comma, start, line, column);
            }
            ';' => {
                self.bump();
                self.push(TokenKind::Semicolon, start, line, column);
            }
            _ => self.lex_operator(),
        }
    }

    fn lex_whitespace(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        while let Some(c) = self.peek(0) {
            if self.bump_newline() {
                break;
            }
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
        self.push(TokenKind::Whitespace, start, line, column);
    }

    fn lex_line_comment(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        while self.pos < self.chars.len() {
            if self.starts_with("?>") {
                break;
            }
            if self.bump_newline() {
                break;
            }
            self.bump();
        }
        self.push(TokenKind::Comment, start, line, column);
    }

    fn lex_block_comment(&mut self) {
        self.bump_n(2);
        let (mut start, mut line, mut column) = (self.pos - 2, self.line, self.column - 2);
        loop {
            if self.pos >= self.chars.len() {
                self.push(TokenKind::Comment, start, line, column);
                return;
            }
            if self.starts_with("*/") {
                self.bump_n(2);
                self.push(TokenKind::Comment, start, line, column);
                return;
            }
            if self.bump_newline() {
                self.push(TokenKind::Comment, start, line, column);
                start = self.pos;
                line = self.line;
                column = self.column;
                continue;
            }
            self.bump();
        }
    }

    fn lex_doc_comment(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        self.bump_n(3);
        let open = self.push(TokenKind::DocCommentOpen, start, line, column);
        // Tags and stars are only recognized before any text on a line.
        let mut line_start = false;
        let mut tag_allowed = true;

        while self.pos < self.chars.len() {
            let (start, line, column) = (self.pos, self.line, self.column);

            if self.starts_with("*/") {
                self.bump_n(2);
                let close = self.push(TokenKind::DocCommentClose, start, line, column);
                self.link(open, close);
                return;
            }

            if self.bump_newline() {
                self.push(TokenKind::DocCommentWhitespace, start, line, column);
                line_start = true;
                tag_allowed = true;
                continue;
            }

            let c = self.peek(0).unwrap_or(' ');
            if c == ' ' || c == '\t' {
                while matches!(self.peek(0), Some(' ' | '\t')) {
                    self.bump();
                }
                self.push(TokenKind::DocCommentWhitespace, start, line, column);
                continue;
            }

            if c == '*' && line_start {
                self.bump();
                self.push(TokenKind::DocCommentStar, start, line, column);
                line_start = false;
                continue;
            }

            if c == '@' && tag_allowed && self.peek(1).is_some_and(is_tag_char) {
                self.bump();
                while self.peek(0).is_some_and(is_tag_char) {
                    self.bump();
                }
                self.push(TokenKind::DocCommentTag, start, line, column);
                line_start = false;
                tag_allowed = false;
                continue;
            }

            // Free text up to the end of the line or the closing marker,
            // with trailing blanks left for a whitespace token.
            let mut end = self.pos;
            let mut cursor = self.pos;
            while cursor < self.chars.len() {
                let ch = self.chars[cursor];
                if ch == '\n' || (ch == '\r' && self.chars.get(cursor + 1) == Some(&'\n')) {
                    break;
                }
                if ch == '*' && self.chars.get(cursor + 1) == Some(&'/') {
                    break;
                }
                cursor += 1;
                if ch != ' ' && ch != '\t' {
                    end = cursor;
                }
            }
            while self.pos < end {
                self.bump();
            }
            self.push(TokenKind::DocCommentString, start, line, column);
            line_start = false;
            tag_allowed = false;
        }
    }

    fn lex_word(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        while self.peek(0).is_some_and(|c| is_word_char(c) || c == '\\') {
            self.bump();
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        let member = matches!(
            self.tokens.iter().rev().find(|t| !t.kind.is_trivia()).map(|t| t.kind),
            Some(TokenKind::Operator(
                Operator::ObjectOperator | Operator::NullsafeObjectOperator | Operator::DoubleColon
            ))
        );
        let kind = if member || word.contains('\\') {
            TokenKind::Identifier
        } else {
            Keyword::from_word(&word)
                .map(TokenKind::Keyword)
                .unwrap_or(TokenKind::Identifier)
        };
        self.push(kind, start, line, column);
    }

    fn lex_number(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        while let Some(c) = self.peek(0) {
            let fraction = c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit());
            if c.is_ascii_alphanumeric() || c == '_' || fraction {
                self.bump();
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start, line, column);
    }

    fn lex_string(&mut self, quote: char) {
        let (start, line, column) = (self.pos, self.line, self.column);
        self.bump();
        while let Some(c) = self.bump() {
            if c == '\\' {
                self.bump();
                continue;
            }
            if c == quote {
                break;
            }
        }
        self.push(TokenKind::StringLiteral, start, line, column);
    }

    fn lex_operator(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        let matched = self
            .operators
            .iter()
            .copied()
            .find(|op| self.starts_with(op.as_str()));
        match matched {
            Some(op) => {
                self.bump_n(op.as_str().chars().count());
                self.push(TokenKind::Operator(op), start, line, column);
            }
            None => {
                self.bump();
                self.push(TokenKind::Unknown, start, line, column);
            }
        }
    }

    /// `[` after a value is index access; anywhere else it opens an array.
    fn square_kind(&self) -> TokenKind {
        let previous = self
            .tokens
            .iter()
            .rev()
            .find(|t| !t.kind.is_trivia())
            .map(|t| t.kind);
        match previous {
            Some(
                TokenKind::Variable
                | TokenKind::Identifier
                | TokenKind::StringLiteral
                | TokenKind::CloseParen
                | TokenKind::CloseSquare
                | TokenKind::CloseShortArray,
            ) => TokenKind::OpenSquare,
            _ => TokenKind::OpenShortArray,
        }
    }

    fn lex_closer(&mut self, c: char, start: usize, line: usize, column: usize) {
        let opener = self
            .brackets
            .last()
            .copied()
            .filter(|&index| match (c, self.tokens[index].kind) {
                (')', TokenKind::OpenParen) | ('}', TokenKind::OpenCurly) => true,
                (']', TokenKind::OpenSquare | TokenKind::OpenShortArray) => true,
                _ => false,
            });

        let kind = match (c, opener.map(|index| self.tokens[index].kind)) {
            (')', _) => TokenKind::CloseParen,
            ('}', _) => TokenKind::CloseCurly,
            (_, Some(TokenKind::OpenShortArray)) => TokenKind::CloseShortArray,
            _ => TokenKind::CloseSquare,
        };
        let close = self.push(kind, start, line, column);

        if let Some(open) = opener {
            self.brackets.pop();
            self.link(open, close);
        }
    }

    fn link(&mut self, open: usize, close: usize) {
        self.tokens[open].matching = Some(close);
        self.tokens[close].matching = Some(open);
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || (!c.is_ascii() && !c.is_whitespace())
}

fn is_word_char(c: char) -> bool {
    is_word_start(c) || c.is_ascii_digit()
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .tokens()
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_round_trips_source() {
        let source = "<?php\n\n$a = [1, 2];\n/* one\n   two */\n// end\n";
        assert_eq!(tokenize(source).unwrap().source(), source);
    }

    #[test]
    fn test_open_tag_absorbs_newline() {
        let store = tokenize("<?php\n\necho 1;").unwrap();
        assert_eq!(store.get(0).unwrap().text, "<?php\n");
        assert!(store.get(1).unwrap().is_blank_line());
        assert_eq!(store.get(2).unwrap().line, 3);
    }

    #[test]
    fn test_whitespace_split_per_line() {
        let store = tokenize("<?php\n$a;\n\n    $b;").unwrap();
        let ws: Vec<&str> = store
            .tokens()
            .iter()
            .filter(|t| t.kind == TokenKind::Whitespace)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(ws, vec!["\n", "\n", "    "]);
    }

    #[test]
    fn test_brackets_are_linked() {
        let store = tokenize("<?php foo($a[0], [1]);").unwrap();
        for (position, token) in store.iter() {
            if let Some(other) = token.matching {
                assert_eq!(store.matching_bracket(other).unwrap(), position);
            }
        }
        let square = store
            .iter()
            .find(|(_, t)| t.kind == TokenKind::OpenSquare)
            .unwrap();
        let short = store
            .iter()
            .find(|(_, t)| t.kind == TokenKind::OpenShortArray)
            .unwrap();
        assert_eq!(square.1.text, "[");
        assert_eq!(store.get(short.1.matching.unwrap()).unwrap().kind, TokenKind::CloseShortArray);
    }

    #[test]
    fn test_unmatched_closer_has_no_link() {
        let store = tokenize("<?php )").unwrap();
        let close = store.len() - 1;
        assert!(store.matching_bracket(close).is_err());
    }

    #[test]
    fn test_doc_comment_parts() {
        let source = "<?php\n/**\n * @param int    $a Value\n */\n";
        let found = kinds(source);
        assert!(found.contains(&TokenKind::DocCommentOpen));
        assert!(found.contains(&TokenKind::DocCommentStar));
        assert!(found.contains(&TokenKind::DocCommentTag));
        assert!(found.contains(&TokenKind::DocCommentClose));

        let store = tokenize(source).unwrap();
        let tag = store
            .iter()
            .find(|(_, t)| t.kind == TokenKind::DocCommentTag)
            .unwrap()
            .0;
        assert_eq!(store.text(tag), Some("@param"));
        assert_eq!(store.text(tag + 1), Some(" "));
        assert_eq!(store.text(tag + 2), Some("int    $a Value"));
        let open = store.iter().find(|(_, t)| t.kind == TokenKind::DocCommentOpen).unwrap().0;
        let close = store.matching_bracket(open).unwrap();
        assert_eq!(store.kind(close), Some(TokenKind::DocCommentClose));
    }

    #[test]
    fn test_line_comment_includes_newline() {
        let store = tokenize("<?php\n// note\nreturn;").unwrap();
        let comment = store
            .iter()
            .find(|(_, t)| t.kind == TokenKind::Comment)
            .unwrap()
            .1;
        assert_eq!(comment.text, "// note\n");
    }

    #[test]
    fn test_block_comment_split_per_line() {
        let store = tokenize("<?php\n/* a\n b */").unwrap();
        let parts: Vec<&str> = store
            .tokens()
            .iter()
            .filter(|t| t.kind == TokenKind::Comment)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(parts, vec!["/* a\n", " b */"]);
    }

    #[test]
    fn test_keywords_and_operators() {
        let found = kinds("<?php if ($a === $b) { return $a->c ?? null; }");
        assert!(found.contains(&TokenKind::Keyword(Keyword::If)));
        assert!(found.contains(&TokenKind::Keyword(Keyword::Return)));
        assert!(found.contains(&TokenKind::Operator(Operator::Identical)));
        assert!(found.contains(&TokenKind::Operator(Operator::ObjectOperator)));
        assert!(found.contains(&TokenKind::Operator(Operator::Coalesce)));
    }

    #[test]
    fn test_inline_html_before_open_tag() {
        let found = kinds("<html>\n<?php echo 1; ?>\n");
        assert_eq!(found[0], TokenKind::InlineHtml);
        assert_eq!(found[1], TokenKind::OpenTag);
        assert!(found.contains(&TokenKind::CloseTag));
    }

    #[test]
    fn test_columns_are_one_based() {
        let store = tokenize("<?php\n  $a = 5;").unwrap();
        let var = store
            .iter()
            .find(|(_, t)| t.kind == TokenKind::Variable)
            .unwrap()
            .1;
        assert_eq!((var.line, var.column), (2, 3));
    }
}
