//! Rules over documentation comment blocks.

mod alignment;
mod cleanup;
mod order;

pub use alignment::ParamAlignment;
pub use cleanup::{BracketLineComment, ForbiddenTag, TrailingBlankLine};
pub use order::TagOrder;

pub const TAG_ORDER: &str = "Comments.TagOrder";
pub const PARAM_ALIGNMENT: &str = "Comments.ParamAlignment";
pub const TRAILING_BLANK_LINE: &str = "Comments.TrailingBlankLine";
pub const FORBIDDEN_TAG: &str = "Comments.ForbiddenTag";
pub const BRACKET_LINE_COMMENT: &str = "Comments.BracketLineComment";
