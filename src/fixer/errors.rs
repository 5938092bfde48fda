use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixError {
    #[error("a changeset is already open")]
    ChangesetAlreadyOpen,

    #[error("no changeset is open")]
    NoOpenChangeset,

    #[error("position {position} is out of range (token count {len})")]
    OutOfRange { position: usize, len: usize },

    #[error("before-text verification failed at position {position}: expected {expected}, found {found:?}")]
    Conflict {
        position: usize,
        expected: String,
        found: String,
    },
}

impl FixError {
    /// Contract violations by the caller, as opposed to stale edits.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            FixError::ChangesetAlreadyOpen | FixError::NoOpenChangeset | FixError::OutOfRange { .. }
        )
    }
}
