use crate::fixer::Edit;
use crate::nav::{next_significant, Direction, NavError};
use crate::rules::{Rule, Verdict, Violation};
use crate::token::{Keyword, Operator, TokenKind, TokenStore};

pub const ASSIGNMENT: &str = "Conditions.Assignment";
pub const SINGLE_LINE: &str = "Conditions.SingleLine";

/// The parenthesized condition following the keyword at `position`.
fn condition(store: &TokenStore, position: usize) -> Result<Option<(usize, usize)>, NavError> {
    let open = next_significant(store, position, Direction::Forward)?;
    if store.kind(open) != Some(TokenKind::OpenParen) {
        return Ok(None);
    }
    Ok(Some((open, store.matching_bracket(open)?)))
}

/// No plain assignment inside an `if` condition.
pub struct Assignment;

impl Rule for Assignment {
    fn code(&self) -> &'static str {
        ASSIGNMENT
    }

    fn description(&self) -> &'static str {
        "assignment inside an if condition"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::Keyword(Keyword::If)]
    }

    fn fixable(&self) -> bool {
        false
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let Some((open, close)) = condition(store, position)? else {
            return Ok(Verdict::Compliant);
        };
        let violations = (open + 1..close)
            .filter(|&p| store.kind(p) == Some(TokenKind::Operator(Operator::Assign)))
            .map(|p| Violation::report(p, "assignment found in condition"))
            .collect();
        Ok(Verdict::from_violations(violations))
    }
}

/// Conditions of control structures fit on one line.
pub struct SingleLine;

impl SingleLine {
    /// Edits joining `open..=close` onto one line: every whitespace run that
    /// breaks a line becomes one space (none next to the parentheses) and
    /// longer same-line runs shrink to one space.
    fn join(store: &TokenStore, open: usize, close: usize) -> Result<Vec<Edit>, NavError> {
        let mut edits = Vec::new();
        let mut cursor = open + 1;
        while cursor < close {
            if store.kind(cursor) != Some(TokenKind::Whitespace) {
                cursor += 1;
                continue;
            }
            let start = cursor;
            while cursor < close && store.kind(cursor) == Some(TokenKind::Whitespace) {
                cursor += 1;
            }
            let end = cursor - 1;

            let run: Vec<_> = (start..=end).map(|p| store.get(p)).collect::<Result<_, _>>()?;
            let breaks = run.iter().any(|t| t.is_line_crossing());
            let width: usize = run.iter().map(|t| t.length()).sum();
            let replacement = if breaks && (start == open + 1 || end + 1 == close) {
                ""
            } else if breaks || width > 1 {
                " "
            } else {
                continue;
            };

            edits.push(Edit::replace(store, start, replacement)?);
            edits.extend(Edit::clear_range(store, start + 1, end)?);
        }
        Ok(edits)
    }
}

impl Rule for SingleLine {
    fn code(&self) -> &'static str {
        SINGLE_LINE
    }

    fn description(&self) -> &'static str {
        "control structure conditions fit on one line"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        [
            Keyword::If,
            Keyword::ElseIf,
            Keyword::While,
            Keyword::For,
            Keyword::Foreach,
        ]
        .into_iter()
        .map(TokenKind::Keyword)
        .collect()
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let Some((open, close)) = condition(store, position)? else {
            return Ok(Verdict::Compliant);
        };
        if store.get(close)?.line <= store.get(position)?.line {
            return Ok(Verdict::Compliant);
        }

        let message = "condition spans several lines";
        let mut blocked = false;
        for p in open + 1..close {
            let token = store.get(p)?;
            // A multi-line string cannot be joined without changing its value.
            if token.kind.is_comment()
                || token.kind == TokenKind::OpenCurly
                || (token.kind == TokenKind::StringLiteral && token.is_line_crossing())
            {
                blocked = true;
                break;
            }
        }
        if blocked {
            return Ok(Verdict::single(Violation::report(position, message)));
        }

        Ok(Verdict::single(Violation::fixable(
            position,
            message,
            Self::join(store, open, close)?,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{fix, violations};

    #[test]
    fn test_assignment_in_if() {
        let found = violations(&Assignment, "<?php if ($a = foo()) {}");
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_fixable());
    }

    #[test]
    fn test_comparison_in_if_is_compliant() {
        assert!(violations(&Assignment, "<?php if ($a == foo()) {}").is_empty());
        assert!(violations(&Assignment, "<?php $a = 1; if ($a) {}").is_empty());
    }

    #[test]
    fn test_multi_line_condition_is_joined() {
        let source = "<?php\nif (\n    $a\n    &&   $b\n) {\n}\n";
        assert_eq!(violations(&SingleLine, source).len(), 1);
        assert_eq!(fix(&SingleLine, source), "<?php\nif ($a && $b) {\n}\n");
    }

    #[test]
    fn test_single_line_condition_is_compliant() {
        assert!(violations(&SingleLine, "<?php\nwhile ($a  &&  $b) {\n}\n").is_empty());
    }

    #[test]
    fn test_comment_in_condition_blocks_fix() {
        let source = "<?php\nif ($a // first\n    && $b) {\n}\n";
        let found = violations(&SingleLine, source);
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_fixable());
    }

    #[test]
    fn test_closure_in_condition_blocks_fix() {
        let source = "<?php\nif (array_filter($a, function ($x) {\n    return $x;\n})) {\n}\n";
        let found = violations(&SingleLine, source);
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_fixable());
    }

    #[test]
    fn test_multi_line_string_in_condition_blocks_fix() {
        let source = "<?php\n\nif ($a == 'x\ny') {\n}\n";
        let found = violations(&SingleLine, source);
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_fixable());
        assert_eq!(fix(&SingleLine, source), source);

        // Line breaks around the string are still joined.
        let source = "<?php\nif ($a ==\n    'x y') {\n}\n";
        assert_eq!(fix(&SingleLine, source), "<?php\nif ($a == 'x y') {\n}\n");
    }
}
