use crate::token::TokenError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    #[error("no matching token found scanning from position {from}")]
    NotFound { from: usize },

    #[error("ran off the token stream at position {position}")]
    UnexpectedEndOfTokens { position: usize },

    #[error("{what} exceeded its ceiling of {limit} steps at position {position}")]
    RecursionCeilingExceeded {
        what: &'static str,
        limit: usize,
        position: usize,
    },

    #[error("token store error: {0}")]
    Token(#[from] TokenError),
}

impl NavError {
    /// Whether the failure only means "cannot judge this occurrence".
    ///
    /// Everything except a ceiling hit is swallowed by detectors.
    pub fn is_inconclusive(&self) -> bool {
        !matches!(self, NavError::RecursionCeilingExceeded { .. })
    }
}
