use crate::fixer::Edit;
use crate::nav::{line_start, next_significant, Direction, NavError};
use crate::rules::{Rule, Verdict, Violation};
use crate::token::{Keyword, Operator, TokenKind, TokenStore};

pub const OPERATOR_SPACING: &str = "Whitespace.OperatorSpacing";
pub const BEFORE_SEMICOLON: &str = "Whitespace.BeforeSemicolon";

/// At most one space on either side of a binary operator.
pub struct OperatorSpacing;

impl OperatorSpacing {
    /// Same-line whitespace next to the operator that is not indentation.
    fn gap(store: &TokenStore, position: usize) -> Result<Option<usize>, NavError> {
        let Some(token) = store.tokens().get(position) else {
            return Ok(None);
        };
        if token.kind != TokenKind::Whitespace || line_start(store, position)? == position {
            return Ok(None);
        }
        Ok(Some(position))
    }

    fn crosses_line(store: &TokenStore, position: usize) -> bool {
        store
            .tokens()
            .get(position)
            .is_some_and(|t| t.kind == TokenKind::Whitespace && t.is_line_crossing())
    }
}

impl Rule for OperatorSpacing {
    fn code(&self) -> &'static str {
        OPERATOR_SPACING
    }

    fn description(&self) -> &'static str {
        "operators are surrounded by single spaces"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        let operators = Operator::ALL
            .iter()
            .copied()
            .filter(|op| op.is_spaced())
            .map(TokenKind::Operator);
        let keywords = [Keyword::InstanceOf, Keyword::And, Keyword::Or, Keyword::Xor]
            .into_iter()
            .map(TokenKind::Keyword);
        operators.chain(keywords).collect()
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let operator = store.get(position)?;
        let before = position.checked_sub(1);
        let after = position + 1;

        if before.is_some_and(|p| Self::crosses_line(store, p)) || Self::crosses_line(store, after) {
            return Ok(Verdict::Compliant);
        }

        let mut violations = Vec::new();
        let sides = [("before", before), ("after", Some(after))];
        for (side, neighbour) in sides {
            let Some(neighbour) = neighbour else {
                continue;
            };
            let Some(gap) = Self::gap(store, neighbour)? else {
                continue;
            };
            let width = store.get(gap)?.length();
            if width > 1 {
                violations.push(Violation::fixable(
                    position,
                    format!(
                        "expected 1 space {side} `{}`; found {width}",
                        operator.text
                    ),
                    vec![Edit::replace(store, gap, " ")?],
                ));
            }
        }

        Ok(Verdict::from_violations(violations))
    }
}

/// No whitespace between a statement and its terminating `;`.
pub struct BeforeSemicolon;

impl Rule for BeforeSemicolon {
    fn code(&self) -> &'static str {
        BEFORE_SEMICOLON
    }

    fn description(&self) -> &'static str {
        "whitespace before a semicolon is forbidden"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::Semicolon]
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let Some(previous) = position.checked_sub(1) else {
            return Ok(Verdict::Compliant);
        };
        if !store.kind(previous).is_some_and(TokenKind::is_trivia) {
            return Ok(Verdict::Compliant);
        }

        let code = next_significant(store, position, Direction::Backward)?;
        if matches!(
            store.kind(code),
            Some(TokenKind::OpenParen | TokenKind::Semicolon | TokenKind::OpenTag)
        ) {
            // Empty clauses of `for (;;)`.
            return Ok(Verdict::Compliant);
        }

        let between = code + 1..position;
        if between.clone().any(|p| store.kind(p).is_some_and(TokenKind::is_comment)) {
            return Ok(Verdict::single(Violation::report(
                position,
                "comment found between statement and semicolon",
            )));
        }

        let edits = between
            .map(|p| Edit::clear(store, p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Verdict::single(Violation::fixable(
            position,
            "whitespace found before semicolon",
            edits,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{fix, violations};

    #[test]
    fn test_double_spaces_around_assignment() {
        let source = "<?php $a  =  5;";
        let found = violations(&OperatorSpacing, source);
        assert_eq!(found.len(), 2);
        assert!(found[0].message.contains("before"));
        assert!(found[1].message.contains("after"));
        assert_eq!(fix(&OperatorSpacing, source), "<?php $a = 5;");
    }

    #[test]
    fn test_single_spaces_and_no_spaces_are_compliant() {
        assert!(violations(&OperatorSpacing, "<?php $a = 5 + $b;").is_empty());
        assert!(violations(&OperatorSpacing, "<?php $a=5;").is_empty());
    }

    #[test]
    fn test_line_crossing_gap_is_skipped() {
        let indented = "<?php\n$a = $b\n        && $c;\n";
        assert!(violations(&OperatorSpacing, indented).is_empty());
        let trailing = "<?php\n$a = $b &&  \n    $c;\n";
        assert!(violations(&OperatorSpacing, trailing).is_empty());
    }

    #[test]
    fn test_keyword_operators() {
        let found = violations(&OperatorSpacing, "<?php $a = $b  instanceof Foo;");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_member_access_is_not_spaced() {
        assert!(violations(&OperatorSpacing, "<?php $a->b;").is_empty());
    }

    #[test]
    fn test_whitespace_before_semicolon() {
        let source = "<?php $a = 5  ;";
        assert_eq!(violations(&BeforeSemicolon, source).len(), 1);
        assert_eq!(fix(&BeforeSemicolon, source), "<?php $a = 5;");
    }

    #[test]
    fn test_semicolon_on_next_line() {
        let source = "<?php\nfoo()\n    ;\n";
        assert_eq!(fix(&BeforeSemicolon, source), "<?php\nfoo();\n");
    }

    #[test]
    fn test_comment_before_semicolon_is_reported_only() {
        let found = violations(&BeforeSemicolon, "<?php $a = 5 /* x */ ;");
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_fixable());
    }

    #[test]
    fn test_for_clauses_are_compliant() {
        assert!(violations(&BeforeSemicolon, "<?php for (; ; ) {}").is_empty());
        assert!(violations(&BeforeSemicolon, "<?php $a = 5;").is_empty());
    }
}
