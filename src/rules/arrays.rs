use crate::fixer::Edit;
use crate::nav::{next_significant, skip_kinds, Direction, NavError};
use crate::rules::{Rule, Verdict, Violation};
use crate::token::{Keyword, TokenKind, TokenStore};

pub const TRAILING_COMMA: &str = "Arrays.TrailingComma";
pub const SHORT_SYNTAX: &str = "Arrays.ShortSyntax";
pub const UNDEFINED_ACCESS: &str = "Arrays.UndefinedAccess";

/// Multi-line array literals end with a comma; single-line ones do not.
pub struct TrailingComma;

impl Rule for TrailingComma {
    fn code(&self) -> &'static str {
        TRAILING_COMMA
    }

    fn description(&self) -> &'static str {
        "trailing comma required in multi-line arrays, forbidden in single-line arrays"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::OpenShortArray]
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let close = store.matching_bracket(position)?;
        let last = next_significant(store, close, Direction::Backward)?;
        if last == position {
            return Ok(Verdict::Compliant);
        }

        let multi_line = store.get(close)?.line > store.get(position)?.line;
        let has_comma = store.kind(last) == Some(TokenKind::Comma);

        match (multi_line, has_comma) {
            (true, false) => Ok(Verdict::single(Violation::fixable(
                position,
                "multi-line array must end with a comma",
                vec![Edit::append(store, last, ",")?],
            ))),
            (false, true) => {
                let mut edits = vec![Edit::clear(store, last)?];
                for between in last + 1..close {
                    if store.kind(between) == Some(TokenKind::Whitespace) {
                        edits.push(Edit::clear(store, between)?);
                    }
                }
                Ok(Verdict::single(Violation::fixable(
                    position,
                    "single-line array must not end with a comma",
                    edits,
                )))
            }
            _ => Ok(Verdict::Compliant),
        }
    }
}

/// `array(...)` is written `[...]`.
pub struct ShortSyntax;

impl Rule for ShortSyntax {
    fn code(&self) -> &'static str {
        SHORT_SYNTAX
    }

    fn description(&self) -> &'static str {
        "long array syntax is forbidden"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::Keyword(Keyword::Array)]
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let open = skip_kinds(store, position + 1, Direction::Forward, TokenKind::is_whitespace)?;
        if store.kind(open) != Some(TokenKind::OpenParen) {
            // Type declaration such as `array $items`.
            return Ok(Verdict::Compliant);
        }
        let close = store.matching_bracket(open)?;

        let mut edits = Edit::clear_range(store, position, open - 1)?;
        edits.push(Edit::replace(store, open, "[")?);
        edits.push(Edit::replace(store, close, "]")?);

        Ok(Verdict::single(Violation::fixable(
            position,
            "use short array syntax",
            edits,
        )))
    }
}

/// Index access on a variable the file never mentioned before.
pub struct UndefinedAccess;

impl UndefinedAccess {
    fn is_exempt(name: &str) -> bool {
        name == "$this" || name == "$GLOBALS" || name.starts_with("$_")
    }
}

impl Rule for UndefinedAccess {
    fn code(&self) -> &'static str {
        UNDEFINED_ACCESS
    }

    fn description(&self) -> &'static str {
        "index access on a variable that was not defined earlier"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::OpenSquare]
    }

    fn fixable(&self) -> bool {
        false
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let variable = next_significant(store, position, Direction::Backward)?;
        let token = store.get(variable)?;
        if token.kind != TokenKind::Variable || Self::is_exempt(&token.text) {
            return Ok(Verdict::Compliant);
        }

        let seen = store
            .tokens()
            .iter()
            .take(variable)
            .any(|t| t.kind == TokenKind::Variable && t.text == token.text);
        if seen {
            return Ok(Verdict::Compliant);
        }

        Ok(Verdict::single(Violation::report(
            variable,
            format!("index access on undefined array {}", token.text),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{fix, violations};

    #[test]
    fn test_multi_line_array_needs_comma() {
        let source = "<?php\n$a = [\n    1,\n    2\n];\n";
        let found = violations(&TrailingComma, source);
        assert_eq!(found.len(), 1);
        assert!(found[0].is_fixable());
        assert_eq!(fix(&TrailingComma, source), "<?php\n$a = [\n    1,\n    2,\n];\n");
    }

    #[test]
    fn test_single_line_array_forbids_comma() {
        let source = "<?php $a = [1, 2, ];";
        assert_eq!(violations(&TrailingComma, source).len(), 1);
        assert_eq!(fix(&TrailingComma, source), "<?php $a = [1, 2];");
    }

    #[test]
    fn test_single_line_without_comma_is_compliant() {
        assert!(violations(&TrailingComma, "<?php $a = [1, 2];").is_empty());
    }

    #[test]
    fn test_empty_arrays_are_compliant() {
        assert!(violations(&TrailingComma, "<?php $a = [];").is_empty());
        assert!(violations(&TrailingComma, "<?php $a = [\n];").is_empty());
    }

    #[test]
    fn test_comment_before_closer_is_skipped() {
        let source = "<?php\n$a = [\n    1, // one\n];\n";
        assert!(violations(&TrailingComma, source).is_empty());
        let missing = "<?php\n$a = [\n    1 // one\n];\n";
        assert_eq!(fix(&TrailingComma, missing), "<?php\n$a = [\n    1, // one\n];\n");
    }

    #[test]
    fn test_long_array_syntax() {
        let source = "<?php $a = array (1, array(2));";
        assert_eq!(violations(&ShortSyntax, source).len(), 2);
        assert_eq!(fix(&ShortSyntax, source), "<?php $a = [1, [2]];");
    }

    #[test]
    fn test_array_type_hint_is_compliant() {
        assert!(violations(&ShortSyntax, "<?php function f(array $a) {}").is_empty());
    }

    #[test]
    fn test_undefined_access() {
        let found = violations(&UndefinedAccess, "<?php echo $rows[0];");
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_fixable());
        assert!(found[0].message.contains("$rows"));
    }

    #[test]
    fn test_defined_and_exempt_access() {
        let source = "<?php $rows = f(); echo $rows[0]; echo $_GET['a']; echo $this->x[1];";
        assert!(violations(&UndefinedAccess, source).is_empty());
    }
}
