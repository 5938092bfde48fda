use crate::fixer::Edit;
use crate::nav::NavError;
use crate::rules::{Rule, RuleSettings, Verdict, Violation};
use crate::token::{TokenKind, TokenStore};

pub const START_OF_FILE: &str = "Structure.StartOfFile";

/// A file opens with `<?php`, one empty line, then an unindented statement.
pub struct StartOfFile {
    line_ending: &'static str,
}

impl StartOfFile {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            line_ending: settings.line_ending.as_str(),
        }
    }

    fn not_first(&self, store: &TokenStore, position: usize) -> Result<Violation, NavError> {
        let message = "the open tag must be the first token of the file";
        let leading_space = (0..position).all(|p| {
            store.get(p).is_ok_and(|t| {
                t.kind == TokenKind::InlineHtml && t.text.chars().all(char::is_whitespace)
            })
        });
        if !leading_space {
            return Ok(Violation::report(position, message));
        }
        Ok(Violation::fixable(
            position,
            message,
            Edit::clear_range(store, 0, position - 1)?,
        ))
    }
}

impl Rule for StartOfFile {
    fn code(&self) -> &'static str {
        START_OF_FILE
    }

    fn description(&self) -> &'static str {
        "open tag first, followed by exactly one empty line"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::OpenTag]
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let tag = store.get(position)?;
        let earlier_tag = store
            .tokens()
            .iter()
            .take(position)
            .any(|t| t.kind == TokenKind::OpenTag);
        if earlier_tag || !tag.text.to_ascii_lowercase().starts_with("<?php") {
            return Ok(Verdict::Compliant);
        }

        if position != 0 {
            return Ok(Verdict::single(self.not_first(store, position)?));
        }

        let statement = position + 2;
        if !store.has_position(statement) {
            return Ok(Verdict::Compliant);
        }

        let blank_follows = tag.is_line_crossing()
            && store.get(position + 1).is_ok_and(|t| t.is_blank_line());
        if !blank_follows {
            let fixed = format!("{}{}{}", tag.text.trim_end(), self.line_ending, self.line_ending);
            return Ok(Verdict::single(Violation::fixable(
                position,
                "expected exactly one empty line after the open tag",
                vec![Edit::replace(store, position, fixed)?],
            )));
        }

        let first = store.get(statement)?;
        if first.kind == TokenKind::Whitespace && first.column == 1 {
            let message = if first.is_line_crossing() {
                "expected exactly one empty line after the open tag"
            } else {
                "the first statement must not be indented"
            };
            return Ok(Verdict::single(Violation::fixable(
                statement,
                message,
                vec![Edit::clear(store, statement)?],
            )));
        }

        Ok(Verdict::Compliant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{fix, violations};

    fn rule() -> StartOfFile {
        StartOfFile::new(&RuleSettings::default())
    }

    #[test]
    fn test_canonical_start_is_compliant() {
        assert!(violations(&rule(), "<?php\n\nnamespace App;\n").is_empty());
    }

    #[test]
    fn test_missing_blank_line() {
        assert_eq!(fix(&rule(), "<?php\nnamespace App;\n"), "<?php\n\nnamespace App;\n");
        assert_eq!(fix(&rule(), "<?php namespace App;\n"), "<?php\n\nnamespace App;\n");
    }

    #[test]
    fn test_extra_blank_lines_and_indent() {
        assert_eq!(
            fix(&rule(), "<?php\n\n\n\n    namespace App;\n"),
            "<?php\n\nnamespace App;\n"
        );
    }

    #[test]
    fn test_leading_whitespace_before_tag() {
        let found = violations(&rule(), "  \n<?php\n\n$a;\n");
        assert_eq!(found.len(), 1);
        assert!(found[0].is_fixable());
        assert_eq!(fix(&rule(), "  \n<?php\n\n$a;\n"), "<?php\n\n$a;\n");
    }

    #[test]
    fn test_html_before_tag_is_reported_only() {
        let found = violations(&rule(), "<p>hi</p>\n<?php\n\n$a;\n");
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_fixable());
    }

    #[test]
    fn test_only_first_tag_is_checked() {
        let source = "<?php\n\n$a; ?>\n<p></p>\n<?php $b;\n";
        assert!(violations(&rule(), source).is_empty());
    }
}
