//! Hunt state: the root aggregate persisted in the hunt file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};

/// One puzzle in the hunt.
///
/// `solve_code` is the secret printed out-of-band; views shown to
/// participants must never include it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clue {
    // ── Identity ──
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub solve_code: String,

    // ── Progression ──
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default, with = "crate::stamp", skip_serializing_if = "Option::is_none")]
    pub solved: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hint_shown: bool,

    // ── Organizer fields we do not interpret ──
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Clue {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        solve_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            solve_code: solve_code.into(),
            unlocked: false,
            solved: None,
            hint_shown: false,
            extra: BTreeMap::new(),
        }
    }

    pub fn is_solved(&self) -> bool {
        self.solved.is_some()
    }

    /// Participants may open the clue's content.
    pub fn accessible(&self) -> bool {
        self.unlocked || self.is_solved()
    }

    /// Whether the hint is displayed, independent of the remaining pool.
    pub fn hint_visible(&self) -> bool {
        self.hint_shown || self.is_solved()
    }
}

/// The whole hunt: ordered clues, the shared hint pool and the play window.
///
/// Clue order is significant. It drives the default unlock progression
/// and the display rank of clues.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HuntState {
    #[serde(default)]
    pub clues: Vec<Clue>,
    #[serde(default)]
    pub hints: u32,
    #[serde(default, with = "crate::stamp", skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::stamp", skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Structural problems that make a hunt file unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("duplicate clue id: {0}")]
    DuplicateClueId(String),

    #[error("clues {first} and {second} share a solve code")]
    DuplicateSolveCode { first: String, second: String },

    #[error("clue {0} has an empty solve code")]
    EmptySolveCode(String),

    #[error("clue at position {0} has an empty id")]
    EmptyClueId(usize),
}

impl HuntState {
    pub fn new(clues: Vec<Clue>, hints: u32) -> Self {
        Self {
            clues,
            hints,
            ..Self::default()
        }
    }

    /// Check the identity invariants every clue set must satisfy.
    ///
    /// Ids and solve codes must be non-empty and unique. Codes are authored
    /// by hand, so a clash is reported with the two clue ids rather than
    /// the code itself.
    pub fn validate(&self) -> Result<(), StateError> {
        let mut ids: HashSet<&str> = HashSet::new();
        let mut codes: HashMap<&str, &str> = HashMap::new();

        for (position, clue) in self.clues.iter().enumerate() {
            if clue.id.is_empty() {
                return Err(StateError::EmptyClueId(position));
            }
            if !ids.insert(clue.id.as_str()) {
                return Err(StateError::DuplicateClueId(clue.id.clone()));
            }
            if clue.solve_code.is_empty() {
                return Err(StateError::EmptySolveCode(clue.id.clone()));
            }
            if let Some(first) = codes.insert(clue.solve_code.as_str(), clue.id.as_str()) {
                return Err(StateError::DuplicateSolveCode {
                    first: first.to_string(),
                    second: clue.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn started(&self) -> bool {
        self.start.is_some()
    }

    /// True once every clue carries a solve stamp.
    pub fn complete(&self) -> bool {
        !self.clues.is_empty() && self.clues.iter().all(Clue::is_solved)
    }
}
