use crate::fixer::LineEnding;
use crate::nav::{DEFAULT_BLOCK_SEARCH_LIMIT, DEFAULT_LINE_MERGE_LIMIT};
use crate::rules::RULE_CODES;
use serde::Deserialize;
use std::fmt;

/// Upper bound for fix passes over one file.
pub const DEFAULT_MAX_PASSES: usize = 8;

pub const DEFAULT_ORDERED_TAGS: &[&str] = &["@param", "@return", "@throws", "@var"];

pub const DEFAULT_FORBIDDEN_TAGS: &[&str] = &[
    "@api",
    "@author",
    "@category",
    "@copyright",
    "@example",
    "@filesource",
    "@global",
    "@ignore",
    "@internal",
    "@license",
    "@link",
    "@method",
    "@package",
    "@since",
    "@source",
    "@subpackage",
    "@uses",
    "@used-by",
    "@version",
];

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub rules: RuleSelection,
    #[serde(default)]
    pub comments: CommentSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        let limits = [
            ("engine.max_passes", self.engine.max_passes),
            ("engine.block_search_limit", self.engine.block_search_limit),
            ("engine.line_merge_limit", self.engine.line_merge_limit),
        ];
        for (field, value) in limits {
            if value == 0 {
                issues.push(ValidationIssue::OutOfRange {
                    field,
                    message: "must be at least 1".to_string(),
                });
            }
        }

        let lists = [
            ("rules.select", &self.rules.select),
            ("rules.ignore", &self.rules.ignore),
            ("rules.report_only", &self.rules.report_only),
        ];
        for (field, codes) in lists {
            for code in codes {
                if !RULE_CODES.contains(&code.as_str()) {
                    issues.push(ValidationIssue::UnknownRule {
                        field,
                        code: code.clone(),
                        suggestion: suggest_rule(code),
                    });
                }
            }
        }

        let tag_lists = [
            ("comments.ordered_tags", &self.comments.ordered_tags),
            ("comments.forbidden_tags", &self.comments.forbidden_tags),
        ];
        for (field, tags) in tag_lists {
            for tag in tags {
                if !tag.starts_with('@') || tag.len() < 2 {
                    issues.push(ValidationIssue::InvalidTag {
                        field,
                        tag: tag.clone(),
                    });
                }
            }
        }

        for tag in &self.comments.ordered_tags {
            if self.comments.forbidden_tags.contains(tag) {
                issues.push(ValidationIssue::TagConflict { tag: tag.clone() });
            }
        }

        let unit = &self.layout.indent_unit;
        if unit.is_empty() || !unit.chars().all(|c| c == ' ' || c == '\t') {
            issues.push(ValidationIssue::OutOfRange {
                field: "layout.indent_unit",
                message: "must be a non-empty run of spaces or tabs".to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Whether `code` runs under this configuration.
    pub fn is_enabled(&self, code: &str) -> bool {
        let selected =
            self.rules.select.is_empty() || self.rules.select.iter().any(|c| c == code);
        selected && !self.rules.ignore.iter().any(|c| c == code)
    }

    /// Whether fixes of `code` may be applied.
    pub fn is_fix_allowed(&self, code: &str) -> bool {
        !self.rules.report_only.iter().any(|c| c == code)
    }
}

/// Closest known rule code, if any is reasonably similar.
fn suggest_rule(code: &str) -> Option<&'static str> {
    RULE_CODES
        .iter()
        .map(|known| (*known, strsim::jaro_winkler(code, known)))
        .filter(|(_, score)| *score > 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(known, _)| known)
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
    #[serde(default = "default_block_search_limit")]
    pub block_search_limit: usize,
    #[serde(default = "default_line_merge_limit")]
    pub line_merge_limit: usize,
    #[serde(default)]
    pub line_ending: LineEnding,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            block_search_limit: DEFAULT_BLOCK_SEARCH_LIMIT,
            line_merge_limit: DEFAULT_LINE_MERGE_LIMIT,
            line_ending: LineEnding::default(),
        }
    }
}

fn default_max_passes() -> usize {
    DEFAULT_MAX_PASSES
}

fn default_block_search_limit() -> usize {
    DEFAULT_BLOCK_SEARCH_LIMIT
}

fn default_line_merge_limit() -> usize {
    DEFAULT_LINE_MERGE_LIMIT
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RuleSelection {
    /// Rule codes to run; empty runs every rule
    #[serde(default)]
    pub select: Vec<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Rule codes reported but never fixed
    #[serde(default)]
    pub report_only: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommentSettings {
    #[serde(default = "default_ordered_tags")]
    pub ordered_tags: Vec<String>,
    #[serde(default = "default_forbidden_tags")]
    pub forbidden_tags: Vec<String>,
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            ordered_tags: default_ordered_tags(),
            forbidden_tags: default_forbidden_tags(),
        }
    }
}

fn default_ordered_tags() -> Vec<String> {
    DEFAULT_ORDERED_TAGS.iter().map(|t| t.to_string()).collect()
}

fn default_forbidden_tags() -> Vec<String> {
    DEFAULT_FORBIDDEN_TAGS.iter().map(|t| t.to_string()).collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutSettings {
    #[serde(default = "default_indent_unit")]
    pub indent_unit: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            indent_unit: default_indent_unit(),
        }
    }
}

fn default_indent_unit() -> String {
    "    ".to_string()
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [issue] = self.issues.as_slice() {
            return write!(f, "{issue}");
        }
        write!(f, "{} issues", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    OutOfRange {
        field: &'static str,
        message: String,
    },
    UnknownRule {
        field: &'static str,
        code: String,
        suggestion: Option<&'static str>,
    },
    InvalidTag {
        field: &'static str,
        tag: String,
    },
    /// A tag both ordered by `Comments.TagOrder` and removed by
    /// `Comments.ForbiddenTag`.
    TagConflict {
        tag: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::OutOfRange { field, message } => {
                write!(f, "'{field}' {message}")
            }
            ValidationIssue::UnknownRule {
                field,
                code,
                suggestion,
            } => match suggestion {
                Some(known) => write!(
                    f,
                    "'{field}' names unknown rule '{code}' (did you mean '{known}'?)"
                ),
                None => write!(f, "'{field}' names unknown rule '{code}'"),
            },
            ValidationIssue::InvalidTag { field, tag } => {
                write!(f, "'{field}' entry '{tag}' must start with '@' followed by a name")
            }
            ValidationIssue::TagConflict { tag } => write!(
                f,
                "tag '{tag}' is listed in both 'comments.ordered_tags' and 'comments.forbidden_tags'"
            ),
        }
    }
}
