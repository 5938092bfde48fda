pub mod loader;
pub mod schema;

pub use loader::{
    candidate_paths, discover, load_from_path, load_from_str, ConfigError, CONFIG_FILE_NAME,
    USER_CONFIG_FILE_NAME,
};
pub use schema::{
    CommentSettings, Config, EngineSettings, LayoutSettings, RuleSelection, ValidationError,
    ValidationIssue, DEFAULT_FORBIDDEN_TAGS, DEFAULT_MAX_PASSES, DEFAULT_ORDERED_TAGS,
};
