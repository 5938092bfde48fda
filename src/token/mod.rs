//! Token model and the position-indexed token store.
//!
//! The store is immutable once built. Rewrites never touch it; they go
//! through [`crate::fixer::Fixer`], which replaces text per position and
//! keeps the token count (and therefore every position and bracket link)
//! stable for the rest of the pass.

pub mod errors;
pub mod kind;
pub mod store;

pub use errors::TokenError;
pub use kind::{Keyword, Operator, TokenKind};
pub use store::{Token, TokenStore};
