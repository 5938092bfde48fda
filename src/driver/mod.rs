//! Rule dispatch over a token store.
//!
//! For every position the driver looks up the rules registered for the
//! token's kind, evaluates them and settles each violation: a fixable one
//! goes through the fixer as one changeset when the policy accepts it.
//! Navigation failures other than a ceiling hit mean "cannot judge" and are
//! dropped; ceiling hits and fixer misuse become internal diagnostics so a
//! run always covers the whole file.

pub mod report;
pub mod session;

pub use report::{Diagnostic, FileReport, Outcome};
pub use session::{check_source, fix_source, FixOutcome};

use crate::config::Config;
use crate::fixer::{FixError, Fixer};
use crate::nav::NavError;
use crate::rules::{registry, Rule, Verdict, Violation};
use crate::token::{TokenKind, TokenStore};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Which fixes the driver may apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixPolicy {
    ReportOnly,
    FixAll,
    /// Fix every rule except the listed codes.
    Except(Vec<String>),
}

impl FixPolicy {
    pub fn from_config(config: &Config) -> Self {
        if config.rules.report_only.is_empty() {
            FixPolicy::FixAll
        } else {
            FixPolicy::Except(config.rules.report_only.clone())
        }
    }

    pub fn accepts(&self, code: &str) -> bool {
        match self {
            FixPolicy::ReportOnly => false,
            FixPolicy::FixAll => true,
            FixPolicy::Except(codes) => !codes.iter().any(|c| c == code),
        }
    }
}

pub struct Driver {
    rules: Vec<Box<dyn Rule>>,
    dispatch: HashMap<TokenKind, Vec<usize>>,
    policy: FixPolicy,
}

impl Driver {
    pub fn new(rules: Vec<Box<dyn Rule>>, policy: FixPolicy) -> Self {
        let mut dispatch: HashMap<TokenKind, Vec<usize>> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            for kind in rule.interested_kinds() {
                let entry = dispatch.entry(kind).or_default();
                if !entry.contains(&index) {
                    entry.push(index);
                }
            }
        }
        debug!(rules = rules.len(), kinds = dispatch.len(), "driver ready");
        Self {
            rules,
            dispatch,
            policy,
        }
    }

    /// Driver over the rules `config` enables.
    pub fn from_config(config: &Config, policy: FixPolicy) -> Self {
        Self::new(registry(config), policy)
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Evaluate every registered rule over `store`. With a fixer, accepted
    /// fixes are committed into it as they are found.
    pub fn run(&self, store: &TokenStore, mut fixer: Option<&mut Fixer<'_>>) -> FileReport {
        let mut report = FileReport::default();
        for (position, token) in store.iter() {
            let Some(indices) = self.dispatch.get(&token.kind) else {
                continue;
            };
            for &index in indices {
                let rule = self.rules[index].as_ref();
                trace!(rule = rule.code(), position, "evaluating");
                match rule.evaluate(store, position) {
                    Ok(Verdict::Compliant) => {}
                    Ok(Verdict::Violations(violations)) => {
                        for violation in violations {
                            let diagnostic =
                                self.settle(store, rule, violation, fixer.as_deref_mut());
                            report.push(diagnostic);
                        }
                    }
                    Err(err) if err.is_inconclusive() => {
                        trace!(rule = rule.code(), position, error = %err, "cannot judge");
                    }
                    Err(err) => report.push(Self::internal(store, rule, position, &err)),
                }
            }
        }
        debug!(
            diagnostics = report.diagnostics.len(),
            fixed = report.count(Outcome::Fixed),
            "run finished"
        );
        report
    }

    fn settle(
        &self,
        store: &TokenStore,
        rule: &dyn Rule,
        violation: Violation,
        fixer: Option<&mut Fixer<'_>>,
    ) -> Diagnostic {
        let fixable = violation.is_fixable();
        let outcome = match (violation.fix.as_deref(), fixer) {
            (Some(edits), Some(fixer)) if fixable && self.policy.accepts(rule.code()) => {
                match fixer.apply(edits) {
                    Ok(_) => Outcome::Fixed,
                    Err(err @ FixError::Conflict { .. }) => {
                        debug!(
                            rule = rule.code(),
                            position = violation.position,
                            error = %err,
                            "fix deferred to the next pass"
                        );
                        Outcome::ReportedOnly
                    }
                    Err(err) => {
                        warn!(rule = rule.code(), position = violation.position, error = %err, "fixer rejected changeset");
                        return Diagnostic::new(
                            store,
                            rule.code(),
                            violation.position,
                            format!("internal error: {err}"),
                            false,
                            Outcome::InternalError,
                        );
                    }
                }
            }
            _ => Outcome::ReportedOnly,
        };
        Diagnostic::new(
            store,
            rule.code(),
            violation.position,
            violation.message,
            fixable,
            outcome,
        )
    }

    fn internal(store: &TokenStore, rule: &dyn Rule, position: usize, err: &NavError) -> Diagnostic {
        warn!(rule = rule.code(), position, error = %err, "navigation ceiling hit");
        Diagnostic::new(
            store,
            rule.code(),
            position,
            format!("internal error: {err}"),
            false,
            Outcome::InternalError,
        )
    }
}
