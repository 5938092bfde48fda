use crate::token::TokenStore;
use serde::Serialize;

/// Terminal state of one judged violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The fix was committed.
    Fixed,
    /// Reported without a fix: not fixable, refused by the policy, or
    /// deferred to the next pass after a conflict.
    ReportedOnly,
    /// The engine could not judge the position; not a style violation.
    InternalError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule: &'static str,
    pub position: usize,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub fixable: bool,
    pub outcome: Outcome,
}

impl Diagnostic {
    pub fn new(
        store: &TokenStore,
        rule: &'static str,
        position: usize,
        message: impl Into<String>,
        fixable: bool,
        outcome: Outcome,
    ) -> Self {
        let (line, column) = store
            .get(position)
            .map(|token| (token.line, token.column))
            .unwrap_or((0, 0));
        Self {
            rule,
            position,
            line,
            column,
            message: message.into(),
            fixable,
            outcome,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.outcome == Outcome::InternalError
    }
}

/// Diagnostics of one file, in dispatch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Style violations, internal diagnostics excluded.
    pub fn violations(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_internal())
    }

    pub fn internal_errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_internal())
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.outcome == outcome)
            .count()
    }

    /// Violations that would be fixed by a fix run.
    pub fn fixable_count(&self) -> usize {
        self.violations().filter(|d| d.fixable).count()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Whether anything is left that should fail a check: a violation that
    /// was not fixed, or an internal diagnostic.
    pub fn has_findings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.outcome != Outcome::Fixed)
    }
}
