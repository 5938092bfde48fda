use crate::fixer::errors::FixError;
use crate::nav::NavError;
use crate::token::TokenStore;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental fix primitive: replace the text of one position, with
/// verification of what the detector saw there.
///
/// Rules plan their fixes as lists of edits at detection time. The fixer
/// replays them later in the pass, by which point an earlier changeset may
/// have rewritten the same position; the before-text check catches that.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until staged on a Fixer"]
pub struct Edit {
    /// Token position whose text is replaced
    pub position: usize,
    /// Replacement text (empty to delete)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large spans)
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

/// Result of staging an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/already-applied"]
pub enum EditResult {
    Applied { position: usize },
    /// Current text already equals the replacement
    AlreadyApplied { position: usize },
}

impl EditResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditResult::Applied { .. })
    }
}

impl Edit {
    pub fn new(position: usize, new_text: impl Into<String>, expected_before: impl Into<String>) -> Self {
        let expected = expected_before.into();
        Self {
            position,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(&expected),
        }
    }

    /// Replace the text at `position`, expecting the store's current text.
    pub fn replace(store: &TokenStore, position: usize, new_text: impl Into<String>) -> Result<Self, NavError> {
        let current = &store.get(position)?.text;
        Ok(Self::new(position, new_text, current.as_str()))
    }

    /// Replace the text at `position` with nothing.
    pub fn clear(store: &TokenStore, position: usize) -> Result<Self, NavError> {
        Self::replace(store, position, "")
    }

    /// Clear every position in `start..=end`.
    pub fn clear_range(store: &TokenStore, start: usize, end: usize) -> Result<Vec<Self>, NavError> {
        (start..=end).map(|p| Self::clear(store, p)).collect()
    }

    /// Append `suffix` to the text at `position`.
    pub fn append(store: &TokenStore, position: usize, suffix: &str) -> Result<Self, NavError> {
        let current = &store.get(position)?.text;
        Ok(Self::new(position, format!("{current}{suffix}"), current.as_str()))
    }

    /// Prepend `prefix` to the text at `position`.
    pub fn prepend(store: &TokenStore, position: usize, prefix: &str) -> Result<Self, NavError> {
        let current = &store.get(position)?.text;
        Ok(Self::new(position, format!("{prefix}{current}"), current.as_str()))
    }

    /// Check the edit against `current`, the text the fixer holds for the
    /// position right now.
    pub(crate) fn verify(&self, current: &str) -> Result<EditResult, FixError> {
        if current == self.new_text {
            return Ok(EditResult::AlreadyApplied {
                position: self.position,
            });
        }

        if !self.expected_before.matches(current) {
            return Err(FixError::Conflict {
                position: self.position,
                expected: format!("{:?}", self.expected_before),
                found: current.to_string(),
            });
        }

        Ok(EditResult::Applied {
            position: self.position,
        })
    }
}
