//! Transactional edit buffer over an immutable [`TokenStore`].
//!
//! The fixer holds the current text of every position. Edits are grouped in
//! changesets: at most one is open at a time, its edits stay pending until
//! [`Fixer::end`], and a changeset whose before-text checks fail is dropped
//! whole. Deletion is replacement with an empty string and insertion enriches
//! the text of an existing position, so positions and bracket links of the
//! store stay valid for the whole pass.

pub mod edit;
pub mod errors;
mod write;

pub use edit::{Edit, EditResult, EditVerification};
pub use errors::FixError;
pub use write::atomic_write;

use crate::token::TokenStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Line-break sequence used by newline insertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

#[derive(Debug, Default)]
struct Changeset {
    edits: BTreeMap<usize, String>,
}

#[derive(Debug)]
pub struct Fixer<'s> {
    store: &'s TokenStore,
    content: Vec<String>,
    open: Option<Changeset>,
    line_ending: LineEnding,
    committed: usize,
    edits_applied: usize,
}

impl<'s> Fixer<'s> {
    pub fn new(store: &'s TokenStore) -> Self {
        Self::with_line_ending(store, LineEnding::default())
    }

    pub fn with_line_ending(store: &'s TokenStore, line_ending: LineEnding) -> Self {
        Self {
            store,
            content: store.tokens().iter().map(|t| t.text.clone()).collect(),
            open: None,
            line_ending,
            committed: 0,
            edits_applied: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Number of changesets committed with at least one effective edit.
    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn edits_applied(&self) -> usize {
        self.edits_applied
    }

    pub fn begin(&mut self) -> Result<(), FixError> {
        if self.open.is_some() {
            return Err(FixError::ChangesetAlreadyOpen);
        }
        self.open = Some(Changeset::default());
        Ok(())
    }

    /// Record (or overwrite) the pending text of `position`.
    pub fn replace(&mut self, position: usize, text: impl Into<String>) -> Result<(), FixError> {
        self.check_position(position)?;
        let changeset = self.open.as_mut().ok_or(FixError::NoOpenChangeset)?;
        changeset.edits.insert(position, text.into());
        Ok(())
    }

    /// Verify `edit` against the text the position holds now (pending text
    /// included) and record it.
    pub fn stage(&mut self, edit: &Edit) -> Result<EditResult, FixError> {
        let current = self.pending_or_current(edit.position)?.to_string();
        let result = edit.verify(&current)?;
        if result.is_applied() {
            self.replace(edit.position, edit.new_text.clone())?;
        }
        Ok(result)
    }

    /// Append `text` to the pending text of `position`.
    pub fn add_content(&mut self, position: usize, text: &str) -> Result<(), FixError> {
        let current = self.pending_or_current(position)?;
        let updated = format!("{current}{text}");
        self.replace(position, updated)
    }

    /// Prepend `text` to the pending text of `position`.
    pub fn add_content_before(&mut self, position: usize, text: &str) -> Result<(), FixError> {
        let current = self.pending_or_current(position)?;
        let updated = format!("{text}{current}");
        self.replace(position, updated)
    }

    pub fn add_newline(&mut self, position: usize) -> Result<(), FixError> {
        self.add_content(position, self.line_ending.as_str())
    }

    pub fn add_newline_before(&mut self, position: usize) -> Result<(), FixError> {
        self.add_content_before(position, self.line_ending.as_str())
    }

    /// Commit the open changeset. Returns the number of positions whose
    /// text actually changed.
    pub fn end(&mut self) -> Result<usize, FixError> {
        let changeset = self.open.take().ok_or(FixError::NoOpenChangeset)?;
        let mut changed = 0;
        for (position, text) in changeset.edits {
            if self.content[position] != text {
                self.content[position] = text;
                changed += 1;
            }
        }
        if changed > 0 {
            self.committed += 1;
            self.edits_applied += changed;
        }
        debug!(changed, "changeset committed");
        Ok(changed)
    }

    /// Drop the open changeset without touching committed content.
    pub fn rollback(&mut self) -> Result<(), FixError> {
        let changeset = self.open.take().ok_or(FixError::NoOpenChangeset)?;
        debug!(pending = changeset.edits.len(), "changeset rolled back");
        Ok(())
    }

    /// Apply `edits` as one changeset. On a conflict the changeset is
    /// rolled back and the error returned; nothing is committed.
    pub fn apply(&mut self, edits: &[Edit]) -> Result<Vec<EditResult>, FixError> {
        self.begin()?;
        let mut results = Vec::with_capacity(edits.len());
        for edit in edits {
            match self.stage(edit) {
                Ok(result) => results.push(result),
                Err(err) => {
                    trace!(position = edit.position, error = %err, "edit rejected");
                    self.rollback()?;
                    return Err(err);
                }
            }
        }
        self.end()?;
        Ok(results)
    }

    /// Committed text of `position`.
    pub fn content(&self, position: usize) -> Option<&str> {
        self.content.get(position).map(String::as_str)
    }

    /// Whether any committed text differs from the store.
    pub fn is_dirty(&self) -> bool {
        self.content
            .iter()
            .zip(self.store.tokens())
            .any(|(content, token)| *content != token.text)
    }

    /// Regenerate the source text from committed content.
    pub fn materialize(&self) -> String {
        self.content.concat()
    }

    fn check_position(&self, position: usize) -> Result<(), FixError> {
        if position < self.content.len() {
            Ok(())
        } else {
            Err(FixError::OutOfRange {
                position,
                len: self.content.len(),
            })
        }
    }

    fn pending_or_current(&self, position: usize) -> Result<&str, FixError> {
        self.check_position(position)?;
        let changeset = self.open.as_ref().ok_or(FixError::NoOpenChangeset)?;
        Ok(changeset
            .edits
            .get(&position)
            .map(String::as_str)
            .unwrap_or(self.content[position].as_str()))
    }
}
