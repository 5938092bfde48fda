//! Rule catalog. Every rule is a thin client of the navigator: it registers
//! the token kinds it wants to see, judges one position at a time and plans
//! its fix as a list of verified edits.

pub mod arrays;
pub mod comments;
pub mod conditions;
pub mod line_breaks;
pub mod structure;
pub mod whitespace;

use crate::config::Config;
use crate::fixer::{Edit, LineEnding};
use crate::nav::NavError;
use crate::token::{TokenKind, TokenStore};

/// Codes of every rule in the catalog, in registry order.
pub const RULE_CODES: &[&str] = &[
    arrays::TRAILING_COMMA,
    arrays::SHORT_SYNTAX,
    arrays::UNDEFINED_ACCESS,
    whitespace::OPERATOR_SPACING,
    whitespace::BEFORE_SEMICOLON,
    line_breaks::EMPTY_LINE_BEFORE_RETURN,
    line_breaks::CONSECUTIVE_BLANK_LINES,
    line_breaks::CHAINED_CALL,
    line_breaks::BLANK_AFTER_DECLARATION_BRACE,
    line_breaks::CONTROL_STRUCTURE_SPACING,
    comments::TAG_ORDER,
    comments::PARAM_ALIGNMENT,
    comments::TRAILING_BLANK_LINE,
    comments::FORBIDDEN_TAG,
    comments::BRACKET_LINE_COMMENT,
    conditions::ASSIGNMENT,
    conditions::SINGLE_LINE,
    structure::START_OF_FILE,
];

/// A style rule: what it looks at and how it judges one position.
pub trait Rule: Send + Sync {
    /// Stable `Category.Name` code.
    fn code(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Token kinds that trigger an evaluation.
    fn interested_kinds(&self) -> Vec<TokenKind>;

    /// Whether violations of this rule can carry a fix.
    fn fixable(&self) -> bool {
        true
    }

    /// Judge the token at `position`.
    ///
    /// Navigation failures are returned as errors; the driver treats all of
    /// them except a ceiling hit as "cannot judge".
    fn evaluate(&self, store: &TokenStore, position: usize) -> Result<Verdict, NavError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Compliant,
    Violations(Vec<Violation>),
}

impl Verdict {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            Verdict::Compliant
        } else {
            Verdict::Violations(violations)
        }
    }

    pub fn single(violation: Violation) -> Self {
        Verdict::Violations(vec![violation])
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Verdict::Compliant => &[],
            Verdict::Violations(violations) => violations,
        }
    }
}

/// One judged violation with its planned fix, if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub position: usize,
    pub message: String,
    pub fix: Option<Vec<Edit>>,
}

impl Violation {
    pub fn report(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
            fix: None,
        }
    }

    /// Violation with a planned fix. An empty edit list changes nothing, so
    /// it leaves the violation report-only.
    pub fn fixable(position: usize, message: impl Into<String>, edits: Vec<Edit>) -> Self {
        Self {
            position,
            message: message.into(),
            fix: (!edits.is_empty()).then_some(edits),
        }
    }

    pub fn is_fixable(&self) -> bool {
        self.fix.as_ref().is_some_and(|edits| !edits.is_empty())
    }
}

/// Settings shared by the rules, resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct RuleSettings {
    pub block_search_limit: usize,
    pub line_merge_limit: usize,
    pub line_ending: LineEnding,
    pub indent_unit: String,
    pub ordered_tags: Vec<String>,
    pub forbidden_tags: Vec<String>,
}

impl From<&Config> for RuleSettings {
    fn from(config: &Config) -> Self {
        Self {
            block_search_limit: config.engine.block_search_limit,
            line_merge_limit: config.engine.line_merge_limit,
            line_ending: config.engine.line_ending,
            indent_unit: config.layout.indent_unit.clone(),
            ordered_tags: config.comments.ordered_tags.clone(),
            forbidden_tags: config.comments.forbidden_tags.clone(),
        }
    }
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Every rule of the catalog.
pub fn catalog(settings: &RuleSettings) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(arrays::TrailingComma),
        Box::new(arrays::ShortSyntax),
        Box::new(arrays::UndefinedAccess),
        Box::new(whitespace::OperatorSpacing),
        Box::new(whitespace::BeforeSemicolon),
        Box::new(line_breaks::EmptyLineBeforeReturn::new(settings)),
        Box::new(line_breaks::ConsecutiveBlankLines),
        Box::new(line_breaks::ChainedCall::new(settings)),
        Box::new(line_breaks::BlankAfterDeclarationBrace),
        Box::new(line_breaks::ControlStructureSpacing::new(settings)),
        Box::new(comments::TagOrder::new(settings)),
        Box::new(comments::ParamAlignment),
        Box::new(comments::TrailingBlankLine),
        Box::new(comments::ForbiddenTag::new(settings)),
        Box::new(comments::BracketLineComment),
        Box::new(conditions::Assignment),
        Box::new(conditions::SingleLine),
        Box::new(structure::StartOfFile::new(settings)),
    ]
}

/// The rules enabled by `config`.
pub fn registry(config: &Config) -> Vec<Box<dyn Rule>> {
    catalog(&RuleSettings::from(config))
        .into_iter()
        .filter(|rule| config.is_enabled(rule.code()))
        .collect()
}

/// Whether only whitespace precedes `position` on its line.
pub(crate) fn starts_line(store: &TokenStore, position: usize) -> Result<bool, NavError> {
    let start = crate::nav::line_start(store, position)?;
    Ok((start..position).all(|p| store.kind(p).is_some_and(TokenKind::is_whitespace)))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_codes() {
        let codes: Vec<&str> = catalog(&RuleSettings::default())
            .iter()
            .map(|r| r.code())
            .collect();
        assert_eq!(codes, RULE_CODES);
    }

    #[test]
    fn test_registry_filters() {
        let mut config = Config::default();
        config.rules.select = vec![arrays::TRAILING_COMMA.into(), arrays::SHORT_SYNTAX.into()];
        config.rules.ignore = vec![arrays::SHORT_SYNTAX.into()];
        let codes: Vec<&str> = registry(&config).iter().map(|r| r.code()).collect();
        assert_eq!(codes, vec![arrays::TRAILING_COMMA]);
    }

    #[test]
    fn test_verdict_from_empty_is_compliant() {
        assert_eq!(Verdict::from_violations(Vec::new()), Verdict::Compliant);
        assert!(Verdict::Compliant.violations().is_empty());
    }

    #[test]
    fn test_empty_fix_is_report_only() {
        let violation = Violation::fixable(3, "nothing to change", Vec::new());
        assert!(!violation.is_fixable());
        assert_eq!(violation.fix, None);

        let planned = Violation::fixable(3, "one edit", vec![Edit::new(3, " ", "  ")]);
        assert!(planned.is_fixable());
    }
}
