use crate::fixer::Edit;
use crate::nav::doc::is_lone_star_line;
use crate::nav::{line_end, line_start, scan, Direction, NavError};
use crate::rules::comments::{BRACKET_LINE_COMMENT, FORBIDDEN_TAG, TRAILING_BLANK_LINE};
use crate::rules::{Rule, RuleSettings, Verdict, Violation};
use crate::token::{TokenKind, TokenStore};

/// No blank ` *` lines right before `*/`.
pub struct TrailingBlankLine;

impl Rule for TrailingBlankLine {
    fn code(&self) -> &'static str {
        TRAILING_BLANK_LINE
    }

    fn description(&self) -> &'static str {
        "no blank lines at the end of a documentation block"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::DocCommentClose]
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let close_line = line_start(store, position)?;
        let bare = (close_line..position)
            .all(|p| store.kind(p) == Some(TokenKind::DocCommentWhitespace));
        if !bare {
            return Ok(Verdict::Compliant);
        }

        let mut first_blank = None;
        let mut cursor = close_line;
        while let Some(previous_end) = cursor.checked_sub(1) {
            let previous_start = line_start(store, previous_end)?;
            if !is_lone_star_line(store, previous_start, previous_end) {
                break;
            }
            first_blank = Some(previous_start);
            cursor = previous_start;
        }

        let Some(first_blank) = first_blank else {
            return Ok(Verdict::Compliant);
        };
        Ok(Verdict::single(Violation::fixable(
            first_blank,
            "there should be no blank lines at the end of the block",
            Edit::clear_range(store, first_blank, close_line - 1)?,
        )))
    }
}

/// Tags from the forbidden list are removed with their line.
pub struct ForbiddenTag {
    forbidden_tags: Vec<String>,
}

impl ForbiddenTag {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            forbidden_tags: settings.forbidden_tags.clone(),
        }
    }

    /// A doc line carrying only free text: the continuation of the tag above.
    fn is_continuation(store: &TokenStore, start: usize, end: usize) -> bool {
        let mut text = false;
        for position in start..=end {
            match store.kind(position) {
                Some(TokenKind::DocCommentString) => text = true,
                Some(TokenKind::DocCommentStar | TokenKind::DocCommentWhitespace) => {}
                _ => return false,
            }
        }
        text
    }
}

impl Rule for ForbiddenTag {
    fn code(&self) -> &'static str {
        FORBIDDEN_TAG
    }

    fn description(&self) -> &'static str {
        "forbidden documentation tags"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::DocCommentTag]
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let tag = &store.get(position)?.text;
        if !self.forbidden_tags.iter().any(|t| t == tag) {
            return Ok(Verdict::Compliant);
        }
        let message = format!("forbidden tag {tag} in documentation block");

        let start = line_start(store, position)?;
        let mut end = line_end(store, position)?;
        while store.has_position(end + 1) {
            let next_end = line_end(store, end + 1)?;
            if !Self::is_continuation(store, end + 1, next_end) {
                break;
            }
            end = next_end;
        }

        let touches_markers = (start..=end).any(|p| {
            matches!(
                store.kind(p),
                Some(TokenKind::DocCommentOpen | TokenKind::DocCommentClose)
            )
        });
        if touches_markers {
            return Ok(Verdict::single(Violation::report(position, message)));
        }

        Ok(Verdict::single(Violation::fixable(
            position,
            message,
            Edit::clear_range(store, start, end)?,
        )))
    }
}

/// Brackets do not share their line with a trailing comment.
pub struct BracketLineComment;

impl Rule for BracketLineComment {
    fn code(&self) -> &'static str {
        BRACKET_LINE_COMMENT
    }

    fn description(&self) -> &'static str {
        "no comment after a bracket on the same line"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenSquare,
            TokenKind::CloseSquare,
            TokenKind::OpenShortArray,
            TokenKind::CloseShortArray,
        ]
    }

    fn fixable(&self) -> bool {
        false
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let line = store.get(position)?.line;
        let comment = scan(
            store,
            position,
            Direction::Forward,
            |_, t| t.kind.is_comment() && t.line == line,
            |_, t| t.line != line || t.kind.is_bracket() || t.is_line_crossing(),
        );
        match comment {
            Ok(comment) => Ok(Verdict::single(Violation::report(
                comment,
                "comment found on a bracket line",
            ))),
            Err(NavError::NotFound { .. }) => Ok(Verdict::Compliant),
            Err(other) => Err(other),
        }
    }
}
