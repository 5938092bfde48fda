use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("position {position} is out of range for {len} tokens")]
    OutOfRange { position: usize, len: usize },

    #[error("token at {position} has no matching bracket")]
    NoMatch { position: usize },

    #[error("malformed token at {position}: {reason}")]
    Malformed { position: usize, reason: String },
}
