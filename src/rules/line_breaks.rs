//! Rules about empty lines and line breaks between statements.
//!
//! Blank lines are counted as whitespace tokens that start at column 1 and
//! end with a line break; every fix inserts or removes whole line breaks
//! inside existing tokens.

use crate::fixer::Edit;
use crate::nav::{
    find_block_start, find_enclosing_block_end, line_end, line_indent, line_start,
    next_non_whitespace, next_significant, parenthesis_owner, scan, skip_kinds, Direction, NavError,
};
use crate::rules::{starts_line, Rule, RuleSettings, Verdict, Violation};
use crate::token::{Keyword, Operator, TokenKind, TokenStore};

pub const EMPTY_LINE_BEFORE_RETURN: &str = "LineBreaks.EmptyLineBeforeReturn";
pub const CONSECUTIVE_BLANK_LINES: &str = "LineBreaks.ConsecutiveBlankLines";
pub const CHAINED_CALL: &str = "LineBreaks.ChainedCall";
pub const BLANK_AFTER_DECLARATION_BRACE: &str = "LineBreaks.BlankAfterDeclarationBrace";
pub const CONTROL_STRUCTURE_SPACING: &str = "LineBreaks.ControlStructureSpacing";

/// Previous non-whitespace token before the line holding `start`, with the
/// blank lines in between. `None` at the top of the file.
fn preceding_code(
    store: &TokenStore,
    start: usize,
) -> Result<Option<(usize, Vec<usize>)>, NavError> {
    let begin = line_start(store, start)?;
    let previous = match next_non_whitespace(store, begin, Direction::Backward) {
        Ok(previous) => previous,
        Err(NavError::NotFound { .. }) => return Ok(None),
        Err(other) => return Err(other),
    };
    let blanks = (previous + 1..begin)
        .filter(|&p| store.get(p).is_ok_and(|t| t.is_blank_line()))
        .collect();
    Ok(Some((previous, blanks)))
}

/// Exactly one empty line before `return`, `yield` and `throw`, none when
/// the statement opens its block.
pub struct EmptyLineBeforeReturn {
    line_ending: &'static str,
}

impl EmptyLineBeforeReturn {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            line_ending: settings.line_ending.as_str(),
        }
    }
}

impl Rule for EmptyLineBeforeReturn {
    fn code(&self) -> &'static str {
        EMPTY_LINE_BEFORE_RETURN
    }

    fn description(&self) -> &'static str {
        "one empty line before return, yield and throw; none directly after `{`"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        [Keyword::Return, Keyword::Yield, Keyword::Throw]
            .into_iter()
            .map(TokenKind::Keyword)
            .collect()
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        if !starts_line(store, position)? {
            return Ok(Verdict::Compliant);
        }
        let keyword = &store.get(position)?.text;
        let start = find_block_start(store, position)?;
        let Some((previous, blanks)) = preceding_code(store, start)? else {
            return Ok(Verdict::Compliant);
        };

        let opens_block = store.kind(previous) == Some(TokenKind::OpenCurly);
        if opens_block && !blanks.is_empty() {
            let edits = blanks
                .iter()
                .map(|&p| Edit::clear(store, p))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Verdict::single(Violation::fixable(
                position,
                format!("excess empty line found before `{keyword}`"),
                edits,
            )));
        }
        if !opens_block && blanks.is_empty() {
            let begin = line_start(store, start)?;
            return Ok(Verdict::single(Violation::fixable(
                position,
                format!("missing empty line found before `{keyword}`"),
                vec![Edit::prepend(store, begin, self.line_ending)?],
            )));
        }
        Ok(Verdict::Compliant)
    }
}

/// At most one empty line in a row.
pub struct ConsecutiveBlankLines;

impl Rule for ConsecutiveBlankLines {
    fn code(&self) -> &'static str {
        CONSECUTIVE_BLANK_LINES
    }

    fn description(&self) -> &'static str {
        "no more than one consecutive empty line"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::Whitespace]
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        if !store.get(position)?.is_blank_line() {
            return Ok(Verdict::Compliant);
        }
        let continues_run = position
            .checked_sub(1)
            .is_some_and(|p| store.get(p).is_ok_and(|t| t.is_blank_line()));
        if continues_run {
            return Ok(Verdict::Compliant);
        }

        let mut last = position;
        while store.get(last + 1).is_ok_and(|t| t.is_blank_line()) {
            last += 1;
        }
        if last == position {
            return Ok(Verdict::Compliant);
        }

        Ok(Verdict::single(Violation::fixable(
            position,
            format!("{} consecutive empty lines found", last - position + 1),
            Edit::clear_range(store, position + 1, last)?,
        )))
    }
}

/// A chained call after a call starts on its own line.
pub struct ChainedCall {
    line_ending: &'static str,
    indent_unit: String,
}

impl ChainedCall {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            line_ending: settings.line_ending.as_str(),
            indent_unit: settings.indent_unit.clone(),
        }
    }

    fn is_member_access(kind: Option<TokenKind>) -> bool {
        matches!(
            kind,
            Some(TokenKind::Operator(
                Operator::ObjectOperator | Operator::NullsafeObjectOperator
            ))
        )
    }
}

impl Rule for ChainedCall {
    fn code(&self) -> &'static str {
        CHAINED_CALL
    }

    fn description(&self) -> &'static str {
        "chained method calls start on their own line"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![
            TokenKind::Operator(Operator::ObjectOperator),
            TokenKind::Operator(Operator::NullsafeObjectOperator),
        ]
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let Some(previous) = position.checked_sub(1) else {
            return Ok(Verdict::Compliant);
        };
        if store.kind(previous) != Some(TokenKind::CloseParen) {
            return Ok(Verdict::Compliant);
        }

        let start = line_start(store, position)?;
        let first = skip_kinds(store, start, Direction::Forward, TokenKind::is_trivia).unwrap_or(start);
        let mut indent = line_indent(store, position)?;
        if !Self::is_member_access(store.kind(first)) {
            indent.push_str(&self.indent_unit);
        }

        let member = store.text(position + 1).unwrap_or_default();
        Ok(Verdict::single(Violation::fixable(
            position,
            format!("chained call `{}{member}` must start on its own line", store.get(position)?.text),
            vec![Edit::prepend(
                store,
                position,
                &format!("{}{indent}", self.line_ending),
            )?],
        )))
    }
}

/// No empty line directly after the brace opening a class or function body.
pub struct BlankAfterDeclarationBrace;

impl BlankAfterDeclarationBrace {
    fn is_declaration(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Keyword(
                Keyword::Class
                    | Keyword::Interface
                    | Keyword::Trait
                    | Keyword::Function
                    | Keyword::Public
                    | Keyword::Protected
                    | Keyword::Private
            )
        )
    }
}

impl Rule for BlankAfterDeclarationBrace {
    fn code(&self) -> &'static str {
        BLANK_AFTER_DECLARATION_BRACE
    }

    fn description(&self) -> &'static str {
        "no empty line at the beginning of a class or function body"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::OpenCurly]
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let ends_line = store.get(position + 1).is_ok_and(|t| t.is_line_crossing());
        let blank = position + 2;
        if !ends_line || !store.get(blank).is_ok_and(|t| t.is_blank_line()) {
            return Ok(Verdict::Compliant);
        }

        let keyword = match scan(
            store,
            position,
            Direction::Backward,
            |_, t| Self::is_declaration(t.kind),
            |_, t| {
                matches!(
                    t.kind,
                    TokenKind::Semicolon | TokenKind::OpenCurly | TokenKind::CloseCurly
                )
            },
        ) {
            Ok(keyword) => keyword,
            Err(NavError::NotFound { .. }) => return Ok(Verdict::Compliant),
            Err(other) => return Err(other),
        };
        if store.get(position)?.line - store.get(keyword)?.line > 1 {
            return Ok(Verdict::Compliant);
        }

        Ok(Verdict::single(Violation::fixable(
            blank,
            "extra empty line at the beginning of the body",
            vec![Edit::clear(store, blank)?],
        )))
    }
}

/// Control structures are separated from surrounding code by empty lines.
pub struct ControlStructureSpacing {
    line_ending: &'static str,
    block_search_limit: usize,
}

impl ControlStructureSpacing {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            line_ending: settings.line_ending.as_str(),
            block_search_limit: settings.block_search_limit,
        }
    }

    fn owns_block(kind: Option<TokenKind>) -> bool {
        match kind {
            Some(TokenKind::Keyword(keyword)) => {
                keyword.is_control_structure()
                    || matches!(keyword, Keyword::Catch | Keyword::Finally)
            }
            _ => false,
        }
    }

    /// Whether the `}` at `close` ends a control structure's block.
    fn closes_control_structure(store: &TokenStore, close: usize) -> Result<bool, NavError> {
        let open = store.matching_bracket(close)?;
        let header = next_significant(store, open, Direction::Backward)?;
        if store.kind(header) == Some(TokenKind::CloseParen) {
            let owner = parenthesis_owner(store, store.matching_bracket(header)?)?;
            return Ok(Self::owns_block(store.kind(owner)));
        }
        Ok(Self::owns_block(store.kind(header)))
    }

    fn check_before(&self, store: &TokenStore, position: usize) -> Result<Option<Violation>, NavError> {
        let start = find_block_start(store, position)?;
        let Some((previous, blanks)) = preceding_code(store, start)? else {
            return Ok(None);
        };
        if !blanks.is_empty() || store.kind(previous) == Some(TokenKind::OpenCurly) {
            return Ok(None);
        }
        if store.kind(previous) == Some(TokenKind::CloseCurly)
            && Self::closes_control_structure(store, previous)?
        {
            return Ok(None);
        }

        let begin = line_start(store, start)?;
        Ok(Some(Violation::fixable(
            start,
            format!(
                "missing empty line found before line {}",
                store.get(start)?.line
            ),
            vec![Edit::prepend(store, begin, self.line_ending)?],
        )))
    }

    fn check_after(&self, store: &TokenStore, end: usize) -> Result<Option<Violation>, NavError> {
        let last = line_end(store, end)?;
        if (end + 1..=last).any(|p| store.kind(p).is_some_and(|k| !k.is_trivia())) {
            return Ok(None);
        }
        let next = last + 1;
        let Ok(token) = store.get(next) else {
            return Ok(None);
        };
        if token.is_blank_line() {
            return Ok(None);
        }

        let first = match skip_indent(store, next) {
            Some(first) => first,
            None => return Ok(None),
        };
        let continues = matches!(
            store.kind(first),
            Some(
                TokenKind::CloseCurly
                    | TokenKind::CloseTag
                    | TokenKind::Keyword(
                        Keyword::Else | Keyword::ElseIf | Keyword::Catch | Keyword::Finally
                    )
            )
        );
        if continues {
            return Ok(None);
        }

        Ok(Some(Violation::fixable(
            end,
            format!(
                "missing empty line found after line {}",
                store.get(end)?.line
            ),
            vec![Edit::append(store, last, self.line_ending)?],
        )))
    }
}

/// First token of the line starting at `position` after its indentation.
fn skip_indent(store: &TokenStore, position: usize) -> Option<usize> {
    let mut cursor = position;
    loop {
        let token = store.tokens().get(cursor)?;
        if token.kind != TokenKind::Whitespace || token.is_line_crossing() {
            return Some(cursor);
        }
        cursor += 1;
    }
}

impl Rule for ControlStructureSpacing {
    fn code(&self) -> &'static str {
        CONTROL_STRUCTURE_SPACING
    }

    fn description(&self) -> &'static str {
        "empty lines before and after control structures"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        [
            Keyword::If,
            Keyword::Switch,
            Keyword::While,
            Keyword::For,
            Keyword::Foreach,
        ]
        .into_iter()
        .map(TokenKind::Keyword)
        .collect()
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        if !starts_line(store, position)? {
            return Ok(Verdict::Compliant);
        }

        let mut violations = Vec::new();
        if let Some(violation) = self.check_before(store, position)? {
            violations.push(violation);
        }

        match find_enclosing_block_end(store, position, self.block_search_limit) {
            Ok(end) => {
                if let Some(violation) = self.check_after(store, end)? {
                    violations.push(violation);
                }
            }
            Err(err) if err.is_inconclusive() => {}
            Err(err) => return Err(err),
        }

        Ok(Verdict::from_violations(violations))
    }
}
