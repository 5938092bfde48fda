use crate::fixer::Edit;
use crate::nav::doc::doc_tags;
use crate::nav::{DocSegment, NavError};
use crate::rules::comments::TAG_ORDER;
use crate::rules::{Rule, RuleSettings, Verdict, Violation};
use crate::token::{TokenKind, TokenStore};

/// Ordered tags appear sorted, and every other tag sits above them.
///
/// Tags are moved as whole doc segments: the tag's line plus any lines
/// merged into it by an open parenthesis, so a multi-line annotation moves
/// with its arguments.
pub struct TagOrder {
    ordered_tags: Vec<String>,
    line_merge_limit: usize,
}

impl TagOrder {
    pub fn new(settings: &RuleSettings) -> Self {
        Self {
            ordered_tags: settings.ordered_tags.clone(),
            line_merge_limit: settings.line_merge_limit,
        }
    }

    fn is_ordered(&self, tag: &str) -> bool {
        self.ordered_tags.iter().any(|t| t == tag)
    }

    /// Whether `segment` shares a line with the block's opener or closer.
    fn touches_markers(segment: &DocSegment, open: usize, close: usize) -> bool {
        (segment.start..=segment.end).contains(&open) || (segment.start..=segment.end).contains(&close)
    }

    /// Move the tag at `tag` (with the blank ` *` lines above it) in front of
    /// the segment `anchor`.
    fn lift(
        &self,
        store: &TokenStore,
        tag: usize,
        anchor: &DocSegment,
        bounds: (usize, usize),
    ) -> Result<Violation, NavError> {
        let message = format!("tag {} must be located above the ordered tags", store.get(tag)?.text);
        let own = DocSegment::at(store, tag, self.line_merge_limit)?;
        if Self::touches_markers(&own, bounds.0, bounds.1)
            || Self::touches_markers(anchor, bounds.0, bounds.1)
        {
            return Ok(Violation::report(tag, message));
        }

        let widened = own.clone().absorb_blank_lines_above(store, self.line_merge_limit)?;
        let moved = format!("{}{}", own.text, widened.lines_before(store, own.start));

        let mut edits = Edit::clear_range(store, widened.start, widened.end)?;
        edits.push(Edit::prepend(store, anchor.start, &moved)?);
        Ok(Violation::fixable(tag, message, edits))
    }

    /// Rewrite the ordered segments so their tags read in sorted order.
    fn reorder(
        &self,
        store: &TokenStore,
        open: usize,
        ordered: &[(usize, &str)],
        bounds: (usize, usize),
    ) -> Result<Option<Violation>, NavError> {
        let mut sorted: Vec<usize> = (0..ordered.len()).collect();
        sorted.sort_by(|&a, &b| ordered[a].1.cmp(ordered[b].1));
        if sorted.iter().enumerate().all(|(slot, &index)| slot == index) {
            return Ok(None);
        }

        let expected: Vec<&str> = sorted.iter().map(|&i| ordered[i].1).collect();
        let message = format!("disorder in annotation block; expected {}", expected.join(", "));

        let segments = ordered
            .iter()
            .map(|&(tag, _)| DocSegment::at(store, tag, self.line_merge_limit))
            .collect::<Result<Vec<_>, _>>()?;
        let overlapping = segments.windows(2).any(|pair| pair[0].end >= pair[1].start);
        let touching = segments
            .iter()
            .any(|segment| Self::touches_markers(segment, bounds.0, bounds.1));
        if overlapping || touching {
            return Ok(Some(Violation::report(open, message)));
        }

        let mut edits = Vec::new();
        for (slot, &index) in sorted.iter().enumerate() {
            if slot == index {
                continue;
            }
            let target = &segments[slot];
            edits.push(Edit::replace(store, target.start, segments[index].text.clone())?);
            edits.extend(Edit::clear_range(store, target.start + 1, target.end)?);
        }
        Ok(Some(Violation::fixable(open, message, edits)))
    }
}

impl Rule for TagOrder {
    fn code(&self) -> &'static str {
        TAG_ORDER
    }

    fn description(&self) -> &'static str {
        "documentation tags in sorted order, other tags above them"
    }

    fn interested_kinds(&self) -> Vec<TokenKind> {
        vec![TokenKind::DocCommentOpen]
    }

    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError> {
        let close = store.matching_bracket(position)?;
        let bounds = (position, close);
        let tags = doc_tags(store, position, close);
        let Some(first) = tags.iter().position(|(_, t)| self.is_ordered(t)) else {
            return Ok(Verdict::Compliant);
        };

        let mut violations = Vec::new();
        let anchor = DocSegment::at(store, tags[first].0, self.line_merge_limit)?;
        for &(tag, text) in &tags[first + 1..] {
            if !self.is_ordered(text) {
                violations.push(self.lift(store, tag, &anchor, bounds)?);
            }
        }

        let ordered: Vec<(usize, &str)> = tags
            .iter()
            .copied()
            .filter(|(_, t)| self.is_ordered(t))
            .collect();
        if let Some(violation) = self.reorder(store, position, &ordered, bounds)? {
            violations.push(violation);
        }

        Ok(Verdict::from_violations(violations))
    }
}
