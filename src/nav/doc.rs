//! Navigation inside documentation comment blocks.

use crate::nav::budget::StepBudget;
use crate::nav::errors::NavError;
use crate::nav::{line_end, line_start};
use crate::token::{TokenKind, TokenStore};

/// Opener and closer positions of the doc comment containing `position`.
pub fn doc_block_bounds(store: &TokenStore, position: usize) -> Result<(usize, usize), NavError> {
    let mut cursor = position;
    loop {
        let token = store.get(cursor)?;
        if !token.kind.is_doc_comment() {
            return Err(NavError::NotFound { from: position });
        }
        if token.kind == TokenKind::DocCommentOpen {
            return Ok((cursor, store.matching_bracket(cursor)?));
        }
        if token.kind == TokenKind::DocCommentClose {
            return Ok((store.matching_bracket(cursor)?, cursor));
        }
        cursor = cursor
            .checked_sub(1)
            .ok_or(NavError::UnexpectedEndOfTokens { position: cursor })?;
    }
}

/// Every tag token strictly between `open` and `close`, in order.
pub fn doc_tags(store: &TokenStore, open: usize, close: usize) -> Vec<(usize, &str)> {
    store
        .iter()
        .skip(open + 1)
        .take(close.saturating_sub(open + 1))
        .filter(|(_, t)| t.kind == TokenKind::DocCommentTag)
        .map(|(p, t)| (p, t.text.as_str()))
        .collect()
}

/// A run of whole lines inside a doc block, from the first token of its
/// first line through the line break ending its last line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSegment {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl DocSegment {
    fn new(store: &TokenStore, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            text: store.text_between(start, end),
        }
    }

    /// The line holding `position`. A line that opens a parenthesis without
    /// closing it is merged with the following lines up to the one that
    /// closes it, at most `limit` lines.
    pub fn at(store: &TokenStore, position: usize, limit: usize) -> Result<Self, NavError> {
        let start = line_start(store, position)?;
        let mut end = line_end(store, position)?;
        let mut depth = paren_balance(&store.text_between(start, end));
        let mut budget = StepBudget::new("doc line merge", limit);

        while depth > 0 {
            budget.tick(end)?;
            let next = end + 1;
            match store.kind(next) {
                Some(kind) if kind.is_doc_comment() && kind != TokenKind::DocCommentClose => {}
                _ => return Err(NavError::NotFound { from: position }),
            }
            end = line_end(store, next)?;
            depth += paren_balance(&store.text_between(next, end));
        }

        Ok(Self::new(store, start, end))
    }

    /// Extend the segment upwards over lines holding nothing but a `*`.
    pub fn absorb_blank_lines_above(self, store: &TokenStore, limit: usize) -> Result<Self, NavError> {
        let mut start = self.start;
        let mut budget = StepBudget::new("doc line merge", limit);
        while let Some(previous_end) = start.checked_sub(1) {
            let previous_start = line_start(store, previous_end)?;
            if !is_lone_star_line(store, previous_start, previous_end) {
                break;
            }
            budget.tick(previous_start)?;
            start = previous_start;
        }
        Ok(Self::new(store, start, self.end))
    }

    /// Text of the lines this segment absorbed above `line_start`.
    pub fn lines_before(&self, store: &TokenStore, line_start: usize) -> String {
        if line_start <= self.start {
            return String::new();
        }
        store.text_between(self.start, line_start - 1)
    }
}

/// True when `start..=end` is a doc line whose only content is a `*`.
pub fn is_lone_star_line(store: &TokenStore, start: usize, end: usize) -> bool {
    let mut stars = 0;
    for position in start..=end {
        match store.kind(position) {
            Some(TokenKind::DocCommentStar) => stars += 1,
            Some(TokenKind::DocCommentWhitespace) => {}
            _ => return false,
        }
    }
    stars == 1
}

fn paren_balance(text: &str) -> i64 {
    text.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    const DOC: &str = "<?php\n/**\n * Summary\n *\n * @param int $a\n *\n * @Route(\"/x\",\n *   name=\"y\")\n * @return void\n */\n";

    fn tag(store: &TokenStore, text: &str) -> usize {
        store
            .iter()
            .find(|(_, t)| t.kind == TokenKind::DocCommentTag && t.text == text)
            .unwrap()
            .0
    }

    #[test]
    fn test_doc_block_bounds_from_inside() {
        let store = tokenize(DOC).unwrap();
        let (open, close) = doc_block_bounds(&store, tag(&store, "@param")).unwrap();
        assert_eq!(store.kind(open), Some(TokenKind::DocCommentOpen));
        assert_eq!(store.kind(close), Some(TokenKind::DocCommentClose));
        assert_eq!(doc_block_bounds(&store, open).unwrap(), (open, close));
    }

    #[test]
    fn test_doc_block_bounds_outside_doc() {
        let store = tokenize("<?php $a;").unwrap();
        assert!(doc_block_bounds(&store, 1).is_err());
    }

    #[test]
    fn test_doc_tags_in_order() {
        let store = tokenize(DOC).unwrap();
        let (open, close) = doc_block_bounds(&store, 2).unwrap();
        let tags: Vec<&str> = doc_tags(&store, open, close).into_iter().map(|(_, t)| t).collect();
        assert_eq!(tags, vec!["@param", "@Route", "@return"]);
    }

    #[test]
    fn test_segment_is_one_line() {
        let store = tokenize(DOC).unwrap();
        let segment = DocSegment::at(&store, tag(&store, "@param"), 10).unwrap();
        assert_eq!(segment.text, " * @param int $a\n");
    }

    #[test]
    fn test_segment_merges_open_parenthesis() {
        let store = tokenize(DOC).unwrap();
        let segment = DocSegment::at(&store, tag(&store, "@Route"), 10).unwrap();
        assert_eq!(segment.text, " * @Route(\"/x\",\n *   name=\"y\")\n");
    }

    #[test]
    fn test_segment_merge_limit() {
        let store = tokenize("<?php\n/**\n * @Route(\n * a\n * b\n */\n").unwrap();
        let result = DocSegment::at(&store, tag(&store, "@Route"), 1);
        assert!(matches!(result, Err(NavError::RecursionCeilingExceeded { .. })));
    }

    #[test]
    fn test_absorb_blank_lines_above() {
        let store = tokenize(DOC).unwrap();
        let route = tag(&store, "@Route");
        let segment = DocSegment::at(&store, route, 10).unwrap();
        let line = segment.start;
        let widened = segment.absorb_blank_lines_above(&store, 10).unwrap();
        assert_eq!(widened.lines_before(&store, line), " *\n");
        assert!(widened.text.starts_with(" *\n * @Route"));
    }
}
