use crate::fixer::Edit;
use crate::nav::doc::doc_tags;
use crate::nav::{doc_block_bounds, NavError};
use crate::rules::comments::PARAM_ALIGNMENT;
use crate::rules::{Rule, Verdict, Violation};
use crate::token::{TokenKind, TokenStore};

const PARAM: &str = "@param";

/// Types of a group of `@param` lines are padded so the names line up.
pub struct ParamAlignment;

impl ParamAlignment {
    /// Position of the description string right after the tag, if the tag
    /// carries one on its own line.
    fn description(store: &TokenStore, tag: usize) -> Option<usize> {
        let gap = store.tokens().get(tag + 1)?;
        if gap.kind != TokenKind::DocCommentWhitespace || gap.is_line_crossing() {
            return None;
        }
        (store.kind(tag + 2) == Some(TokenKind::DocCommentString)).then_some(tag + 2)
    }

    /// `text` with the type ending at byte `split` padded to `column`
    /// characters.
    fn aligned(text: &str, split: usize, column: usize) -> String {
        let (ty, rest) = text.split_at(split);
        format!(
            "{ty}{}{}",
            " ".repeat(column - ty.chars().count()),
            rest.trim_start()
        )
    }
}

impl Rule for ParamAlignment {
    fn code(&self) -> &'static str {
        PARAM_ALIGNMENT
    }

    fn description(&self) -> &'static str {
        "@param types carry a type and are aligned within their group"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::DocCommentTag]
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        if store.get(position)?.text != PARAM {
            return Ok(Verdict::Compliant);
        }
        let (open, close) = doc_block_bounds(store, position)?;
        let tags = doc_tags(store, open, close);
        let Some(index) = tags.iter().position(|&(p, _)| p == position) else {
            return Ok(Verdict::Compliant);
        };
        if index > 0 && tags[index - 1].1 == PARAM {
            return Ok(Verdict::Compliant);
        }

        let mut violations = Vec::new();
        let mut entries = Vec::new();
        for &(tag, _) in tags[index..].iter().take_while(|(_, t)| *t == PARAM) {
            let Some(string) = Self::description(store, tag) else {
                violations.push(Violation::report(tag, "data type not specified for @param"));
                continue;
            };
            let text = store.get(string)?.text.as_str();
            if let Some(split) = text.find(' ') {
                entries.push((string, text, split, text[..split].chars().count()));
            }
        }

        let Some(widest) = entries.iter().map(|&(_, _, _, width)| width).max() else {
            return Ok(Verdict::from_violations(violations));
        };
        let column = widest + 1;

        let mut edits = Vec::new();
        for &(string, text, split, _) in &entries {
            let expected = Self::aligned(text, split, column);
            if expected != text {
                edits.push(Edit::replace(store, string, expected)?);
            }
        }
        if !edits.is_empty() {
            violations.push(Violation::fixable(
                position,
                format!("incorrect @param alignment; types are padded to {column} characters"),
                edits,
            ));
        }

        Ok(Verdict::from_violations(violations))
    }
}
