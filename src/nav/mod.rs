//! Stateless traversal primitives over a [`TokenStore`].
//!
//! Every function takes the store and a position explicitly and returns a
//! position or a [`NavError`]. Running off either end of the store is never
//! a panic: scans report [`NavError::NotFound`], single steps report
//! [`NavError::UnexpectedEndOfTokens`]. Detectors treat both as "cannot judge".

pub mod blocks;
pub mod budget;
pub mod doc;
pub mod errors;

pub use blocks::{find_block_start, find_enclosing_block_end};
pub use budget::{StepBudget, DEFAULT_BLOCK_SEARCH_LIMIT, DEFAULT_LINE_MERGE_LIMIT};
pub use doc::{doc_block_bounds, DocSegment};
pub use errors::NavError;

use crate::token::{Token, TokenKind, TokenStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Neighbouring position, or `None` below zero.
    fn advance(self, position: usize) -> Option<usize> {
        match self {
            Direction::Forward => position.checked_add(1),
            Direction::Backward => position.checked_sub(1),
        }
    }
}

/// One step in `direction`.
pub fn step(store: &TokenStore, position: usize, direction: Direction) -> Result<usize, NavError> {
    direction
        .advance(position)
        .filter(|&next| store.has_position(next))
        .ok_or(NavError::UnexpectedEndOfTokens { position })
}

/// Move one token at a time from `from` (exclusive) until `stop` holds.
///
/// `stop` is tested before `abort` on each token. Returns `NotFound` when
/// `abort` holds first or the scan leaves the store.
pub fn scan<S, A>(
    store: &TokenStore,
    from: usize,
    direction: Direction,
    mut stop: S,
    mut abort: A,
) -> Result<usize, NavError>
where
    S: FnMut(usize, &Token) -> bool,
    A: FnMut(usize, &Token) -> bool,
{
    let mut cursor = from;
    loop {
        cursor = match direction.advance(cursor) {
            Some(next) if store.has_position(next) => next,
            _ => return Err(NavError::NotFound { from }),
        };
        let token = store.get(cursor)?;
        if stop(cursor, token) {
            return Ok(cursor);
        }
        if abort(cursor, token) {
            return Err(NavError::NotFound { from });
        }
    }
}

/// Advance from `position` (inclusive) past a contiguous run of kinds in the set.
///
/// Returns the first position whose kind is not in the set.
pub fn skip_kinds<K>(
    store: &TokenStore,
    position: usize,
    direction: Direction,
    kinds: K,
) -> Result<usize, NavError>
where
    K: Fn(TokenKind) -> bool,
{
    let mut cursor = position;
    loop {
        let token = store
            .get(cursor)
            .map_err(|_| NavError::UnexpectedEndOfTokens { position: cursor })?;
        if !kinds(token.kind) {
            return Ok(cursor);
        }
        cursor = step(store, cursor, direction)?;
    }
}

/// True if the token's text contains a line break.
pub fn is_line_crossing(token: &Token) -> bool {
    token.is_line_crossing()
}

/// Nearest non-whitespace, non-comment token strictly before/after `position`.
pub fn next_significant(
    store: &TokenStore,
    position: usize,
    direction: Direction,
) -> Result<usize, NavError> {
    scan(store, position, direction, |_, t| !t.kind.is_trivia(), |_, _| false)
}

/// Nearest non-whitespace token strictly before/after `position`.
pub fn next_non_whitespace(
    store: &TokenStore,
    position: usize,
    direction: Direction,
) -> Result<usize, NavError> {
    scan(
        store,
        position,
        direction,
        |_, t| !t.kind.is_whitespace(),
        |_, _| false,
    )
}

/// First token of the line `position` is on.
pub fn line_start(store: &TokenStore, position: usize) -> Result<usize, NavError> {
    let mut cursor = position;
    let line = store.get(position)?.line;
    while cursor > 0 {
        let previous = store.get(cursor - 1)?;
        if previous.line != line || previous.is_line_crossing() {
            break;
        }
        cursor -= 1;
    }
    Ok(cursor)
}

/// Last token of the line `position` is on: the line-crossing token that
/// ends it, or the final token of the store.
pub fn line_end(store: &TokenStore, position: usize) -> Result<usize, NavError> {
    let mut cursor = position;
    loop {
        if store.get(cursor)?.is_line_crossing() || !store.has_position(cursor + 1) {
            return Ok(cursor);
        }
        cursor += 1;
    }
}

/// Leading indentation text of the line `position` is on.
pub fn line_indent(store: &TokenStore, position: usize) -> Result<String, NavError> {
    let start = line_start(store, position)?;
    let token = store.get(start)?;
    if token.kind == TokenKind::Whitespace && !token.is_line_crossing() {
        Ok(token.text.clone())
    } else {
        Ok(String::new())
    }
}

/// The keyword or name that owns the parenthesis opened at `open`.
pub fn parenthesis_owner(store: &TokenStore, open: usize) -> Result<usize, NavError> {
    if store.get(open)?.kind != TokenKind::OpenParen {
        return Err(NavError::NotFound { from: open });
    }
    next_significant(store, open, Direction::Backward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::token::Keyword;

    fn position_of(store: &TokenStore, text: &str) -> usize {
        store.iter().find(|(_, t)| t.text == text).unwrap().0
    }

    #[test]
    fn test_scan_forward_finds_stop() {
        let store = tokenize("<?php $a = 5; $b = 6;").unwrap();
        let found = scan(
            &store,
            0,
            Direction::Forward,
            |_, t| t.kind == TokenKind::Semicolon,
            |_, _| false,
        )
        .unwrap();
        assert_eq!(store.text(found), Some(";"));
        assert!(found < position_of(&store, "$b"));
    }

    #[test]
    fn test_scan_abort_wins_when_first() {
        let store = tokenize("<?php $a = 5; $b = 6;").unwrap();
        let result = scan(
            &store,
            0,
            Direction::Forward,
            |_, t| t.text == "$b",
            |_, t| t.kind == TokenKind::Semicolon,
        );
        assert_eq!(result, Err(NavError::NotFound { from: 0 }));
    }

    #[test]
    fn test_scan_off_the_end_is_not_found() {
        let store = tokenize("<?php $a;").unwrap();
        let back = scan(&store, 0, Direction::Backward, |_, _| true, |_, _| false);
        assert_eq!(back, Err(NavError::NotFound { from: 0 }));
        let last = store.len() - 1;
        let forward = scan(&store, last, Direction::Forward, |_, _| true, |_, _| false);
        assert!(matches!(forward, Err(NavError::NotFound { .. })));
    }

    #[test]
    fn test_step_bounds() {
        let store = tokenize("<?php $a;").unwrap();
        assert_eq!(
            step(&store, 0, Direction::Backward),
            Err(NavError::UnexpectedEndOfTokens { position: 0 })
        );
        assert_eq!(step(&store, 0, Direction::Forward), Ok(1));
    }

    #[test]
    fn test_skip_kinds() {
        let store = tokenize("<?php\n$a   /* c */  ;").unwrap();
        let var = position_of(&store, "$a");
        let after = skip_kinds(&store, var + 1, Direction::Forward, TokenKind::is_trivia).unwrap();
        assert_eq!(store.kind(after), Some(TokenKind::Semicolon));
        let same = skip_kinds(&store, var, Direction::Forward, TokenKind::is_trivia).unwrap();
        assert_eq!(same, var);
    }

    #[test]
    fn test_skip_kinds_runs_off_end() {
        let store = tokenize("<?php $a   ").unwrap();
        let last = store.len() - 1;
        assert!(matches!(
            skip_kinds(&store, last, Direction::Forward, TokenKind::is_whitespace),
            Err(NavError::UnexpectedEndOfTokens { .. })
        ));
    }

    #[test]
    fn test_line_helpers() {
        let store = tokenize("<?php\n    $a = 1;\n$b = 2;\n").unwrap();
        let eq = position_of(&store, "=");
        let start = line_start(&store, eq).unwrap();
        assert_eq!(store.text(start), Some("    "));
        assert_eq!(line_indent(&store, eq).unwrap(), "    ");
        let end = line_end(&store, eq).unwrap();
        assert_eq!(store.text(end), Some("\n"));
        let b = position_of(&store, "$b");
        assert_eq!(line_start(&store, b).unwrap(), b);
        assert_eq!(line_indent(&store, b).unwrap(), "");
    }

    #[test]
    fn test_parenthesis_owner() {
        let store = tokenize("<?php if ($a) {}").unwrap();
        let open = store
            .iter()
            .find(|(_, t)| t.kind == TokenKind::OpenParen)
            .unwrap()
            .0;
        let owner = parenthesis_owner(&store, open).unwrap();
        assert_eq!(store.kind(owner), Some(TokenKind::Keyword(Keyword::If)));
    }

    #[test]
    fn test_is_line_crossing() {
        let store = tokenize("<?php\n$a;  \n").unwrap();
        let crossing: Vec<bool> = store.tokens().iter().map(is_line_crossing).collect();
        assert_eq!(crossing.iter().filter(|c| **c).count(), 2);
    }
}
