//! Block boundary navigation: braces of control structures and the comments
//! that lead into a statement.

use crate::nav::budget::StepBudget;
use crate::nav::errors::NavError;
use crate::nav::{line_start, scan, Direction};
use crate::token::{TokenKind, TokenStore};

/// Locate the closing brace of the block introduced at `position`.
///
/// The opening brace is searched on the header line, jumping over
/// parenthesized conditions through their matching closers. Blocks chained on
/// the same line as a closing brace (`} else {`, `} catch (E $e) {`) are
/// followed until the chain ends. Every block visited consumes one step of a
/// budget of `limit` steps.
pub fn find_enclosing_block_end(
    store: &TokenStore,
    position: usize,
    limit: usize,
) -> Result<usize, NavError> {
    let mut budget = StepBudget::new("block search", limit);
    let open = find_header_brace(store, position)?;
    budget.tick(open)?;
    let mut close = store.matching_bracket(open)?;

    while let Some(next_open) = chained_block(store, close)? {
        budget.tick(next_open)?;
        close = store.matching_bracket(next_open)?;
    }

    Ok(close)
}

/// The `{` opening the block of the statement at `position`, on the line the
/// header ends on.
fn find_header_brace(store: &TokenStore, position: usize) -> Result<usize, NavError> {
    let mut cursor = position;
    let mut line = store.get(position)?.line;
    loop {
        cursor += 1;
        let token = store
            .get(cursor)
            .map_err(|_| NavError::NotFound { from: position })?;
        match token.kind {
            TokenKind::OpenCurly => return Ok(cursor),
            TokenKind::OpenParen => {
                cursor = store.matching_bracket(cursor)?;
                line = store.get(cursor)?.line;
            }
            TokenKind::Semicolon | TokenKind::CloseCurly | TokenKind::CloseParen => {
                return Err(NavError::NotFound { from: position });
            }
            _ if token.line != line => return Err(NavError::NotFound { from: position }),
            _ => {}
        }
    }
}

/// A `{` that opens another block on the same line as the brace at `close`.
fn chained_block(store: &TokenStore, close: usize) -> Result<Option<usize>, NavError> {
    let line = store.get(close)?.line;
    let mut cursor = close;
    loop {
        cursor += 1;
        let Ok(token) = store.get(cursor) else {
            return Ok(None);
        };
        if token.line != line {
            return Ok(None);
        }
        match token.kind {
            TokenKind::OpenCurly => return Ok(Some(cursor)),
            TokenKind::OpenParen => cursor = store.matching_bracket(cursor)?,
            TokenKind::Semicolon | TokenKind::CloseCurly | TokenKind::CloseTag => return Ok(None),
            _ if token.is_line_crossing() => return Ok(None),
            _ => {}
        }
    }
}

/// Walk back from the statement at `position` over the comments directly
/// above it and return the first position of the whole construct.
///
/// Stacked single-line comments, multi-line block comments (back to their
/// `/*`) and doc comments (back to their opener) are absorbed while no blank
/// line separates them from what follows. A trailing comment of a code line
/// is never absorbed.
pub fn find_block_start(store: &TokenStore, position: usize) -> Result<usize, NavError> {
    store.get(position)?;
    let mut start = line_start(store, position)?;
    let mut first = position;

    loop {
        let previous = match scan(
            store,
            start,
            Direction::Backward,
            |_, t| !t.kind.is_whitespace(),
            |_, t| t.is_blank_line(),
        ) {
            Ok(previous) => previous,
            Err(NavError::NotFound { .. }) => return Ok(first),
            Err(other) => return Err(other),
        };

        let candidate = match store.get(previous)?.kind {
            TokenKind::DocCommentClose => store.matching_bracket(previous)?,
            TokenKind::Comment => comment_opening(store, previous)?,
            _ => return Ok(first),
        };

        let candidate_line = line_start(store, candidate)?;
        if !only_whitespace_before(store, candidate_line, candidate) {
            return Ok(first);
        }

        first = candidate;
        start = candidate_line;
    }
}

/// First token of the comment ending at `position`: itself for line
/// comments, the `/*` part for multi-line block comments.
fn comment_opening(store: &TokenStore, position: usize) -> Result<usize, NavError> {
    let mut cursor = position;
    loop {
        let text = store.get(cursor)?.text.trim_start();
        if text.starts_with("/*") || text.starts_with("//") || text.starts_with('#') {
            return Ok(cursor);
        }
        match cursor.checked_sub(1) {
            Some(previous) if store.kind(previous) == Some(TokenKind::Comment) => cursor = previous,
            _ => return Err(NavError::NotFound { from: position }),
        }
    }
}

fn only_whitespace_before(store: &TokenStore, from: usize, to: usize) -> bool {
    (from..to).all(|p| store.kind(p).is_some_and(TokenKind::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::nav::DEFAULT_BLOCK_SEARCH_LIMIT;
    use crate::token::Keyword;

    fn keyword(store: &TokenStore, keyword: Keyword) -> usize {
        store
            .iter()
            .find(|(_, t)| t.kind == TokenKind::Keyword(keyword))
            .unwrap()
            .0
    }

    #[test]
    fn test_block_end_simple() {
        let store = tokenize("<?php\nif ($a) {\n    $b;\n}\n$c;\n").unwrap();
        let end = find_enclosing_block_end(&store, keyword(&store, Keyword::If), 500).unwrap();
        assert_eq!(store.text(end), Some("}"));
        assert_eq!(store.get(end).unwrap().line, 4);
    }

    #[test]
    fn test_block_end_follows_else_chain() {
        let source = "<?php\nif ($a) {\n} elseif ($b) {\n} else {\n    $c;\n}\n";
        let store = tokenize(source).unwrap();
        let end = find_enclosing_block_end(&store, keyword(&store, Keyword::If), 500).unwrap();
        assert_eq!(store.get(end).unwrap().line, 6);
    }

    #[test]
    fn test_block_end_stops_at_line_end() {
        let source = "<?php\nwhile ($a) {\n    $b;\n} \n$c;\n";
        let store = tokenize(source).unwrap();
        let end = find_enclosing_block_end(&store, keyword(&store, Keyword::While), 500).unwrap();
        assert_eq!(store.get(end).unwrap().line, 4);
    }

    #[test]
    fn test_block_end_without_brace_is_not_found() {
        let store = tokenize("<?php\nwhile ($a);\n").unwrap();
        let result = find_enclosing_block_end(&store, keyword(&store, Keyword::While), 500);
        assert!(matches!(result, Err(NavError::NotFound { .. })));
    }

    #[test]
    fn test_block_end_hits_ceiling() {
        let mut source = String::from("<?php\nif ($a) {}");
        for _ in 0..600 {
            source.push_str(" else {}");
        }
        source.push('\n');
        let store = tokenize(&source).unwrap();
        let result = find_enclosing_block_end(
            &store,
            keyword(&store, Keyword::If),
            DEFAULT_BLOCK_SEARCH_LIMIT,
        );
        assert!(matches!(
            result,
            Err(NavError::RecursionCeilingExceeded { limit: 500, .. })
        ));
    }

    #[test]
    fn test_block_start_absorbs_line_comments() {
        let source = "<?php\n$a;\n// one\n// two\nif ($a) {}\n";
        let store = tokenize(source).unwrap();
        let start = find_block_start(&store, keyword(&store, Keyword::If)).unwrap();
        assert_eq!(store.text(start), Some("// one\n"));
    }

    #[test]
    fn test_block_start_absorbs_block_and_doc_comments() {
        let source = "<?php\n/* a\n   b */\nif ($a) {}\n";
        let store = tokenize(source).unwrap();
        let start = find_block_start(&store, keyword(&store, Keyword::If)).unwrap();
        assert_eq!(store.text(start), Some("/* a\n"));

        let source = "<?php\n    /**\n     * Doc\n     */\n    if ($a) {}\n";
        let store = tokenize(source).unwrap();
        let start = find_block_start(&store, keyword(&store, Keyword::If)).unwrap();
        assert_eq!(store.kind(start), Some(TokenKind::DocCommentOpen));
    }

    #[test]
    fn test_block_start_ignores_trailing_and_detached_comments() {
        let source = "<?php\n$a; // trailing\nif ($a) {}\n";
        let store = tokenize(source).unwrap();
        let if_pos = keyword(&store, Keyword::If);
        assert_eq!(find_block_start(&store, if_pos).unwrap(), if_pos);

        let source = "<?php\n// detached\n\nif ($a) {}\n";
        let store = tokenize(source).unwrap();
        let if_pos = keyword(&store, Keyword::If);
        assert_eq!(find_block_start(&store, if_pos).unwrap(), if_pos);
    }
}
