//! The scenario deck.
//!
//! A deck is an ordered, non-empty, read-only sequence of code review
//! flashcards. The built-in deck is embedded in the binary at compile time.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Raw JSON for the built-in deck.
const BUILTIN_DECK: &str = include_str!("../data/scenarios.json");

/// One flashcard: a flawed snippet and its audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Display identifier. Not required to be unique.
    pub id: u32,
    /// Topic label, e.g. "Time Complexity".
    pub category: String,
    /// The task the flawed code was meant to solve.
    pub prompt: String,
    /// The flawed snippet, shown verbatim.
    pub bad_code: String,
    /// What is wrong with the snippet.
    pub critique: String,
    /// The corrected snippet, shown verbatim.
    pub good_code: String,
    /// Why the correction works.
    pub reasoning: String,
}

/// An ordered, non-empty collection of scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<ScenarioRecord>,
}

impl Dataset {
    /// Build a deck from the given records, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDataset`] if `records` is empty.
    pub fn new(records: Vec<ScenarioRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::EmptyDataset);
        }
        Ok(Self { records })
    }

    /// Parse the deck embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded JSON is malformed or empty.
    pub fn builtin() -> Result<Self> {
        let records: Vec<ScenarioRecord> = serde_json::from_str(BUILTIN_DECK)?;
        Self::new(records)
    }

    /// Get the scenario at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`. Callers derive indices from the
    /// deck length, so an out-of-range index is a bug.
    #[must_use]
    pub fn get(&self, index: usize) -> &ScenarioRecord {
        assert!(
            index < self.records.len(),
            "scenario index {index} out of range for deck of {}",
            self.records.len()
        );
        &self.records[index]
    }

    /// Number of scenarios. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over scenarios in deck order.
    pub fn iter(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.records.iter()
    }

    /// Find the first scenario carrying `id`.
    #[must_use]
    pub fn find_by_id(&self, id: u32) -> Option<&ScenarioRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Like [`Dataset::find_by_id`], but an absent id is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScenarioNotFound`] if no scenario has `id`.
    pub fn require(&self, id: u32) -> Result<&ScenarioRecord> {
        self.find_by_id(id).ok_or(Error::ScenarioNotFound { id })
    }
}

#[cfg(test)]
pub(crate) fn sample(id: u32) -> ScenarioRecord {
    ScenarioRecord {
        id,
        category: format!("Category {id}"),
        prompt: format!("Prompt {id}"),
        bad_code: format!("bad({id})"),
        critique: format!("Critique {id}"),
        good_code: format!("good({id})"),
        reasoning: format!("Reasoning {id}"),
    }
}
