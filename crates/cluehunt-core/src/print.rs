//! Print sheet projection: every clue with its solve code and solve URL.
//!
//! This is the only view that carries solve codes. Entries are copies, so
//! building a sheet never touches the canonical clues.

use crate::state::{Clue, HuntState};
use serde::Serialize;
use std::collections::BTreeSet;

/// Which clues are marked for printing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PrintFilter {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl PrintFilter {
    /// Build from `(key, value)` form pairs: no pairs prints everything,
    /// otherwise a clue is shown when its id maps to `on`.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut any = false;
        let mut selected = BTreeSet::new();
        for (key, value) in pairs {
            any = true;
            if value == "on" {
                selected.insert(key.to_string());
            }
        }
        if any { Self::Only(selected) } else { Self::All }
    }

    pub fn shows(&self, clue_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(clue_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintEntry {
    pub id: String,
    pub name: String,
    pub solve_code: String,
    pub solve_url: String,
    pub show: bool,
}

impl PrintEntry {
    fn from_clue(clue: &Clue, hostname: &str, show: bool) -> Self {
        Self {
            id: clue.id.clone(),
            name: clue.name.clone(),
            solve_code: clue.solve_code.clone(),
            solve_url: solve_url(hostname, &clue.solve_code),
            show,
        }
    }
}

/// The URL a participant lands on when scanning a clue's printed code.
pub fn solve_url(hostname: &str, solve_code: &str) -> String {
    format!("{}/solve?id={}", hostname.trim_end_matches('/'), solve_code)
}

/// Project every clue, regardless of state, in stored order.
pub fn print_view(state: &HuntState, hostname: &str, filter: &PrintFilter) -> Vec<PrintEntry> {
    state
        .clues
        .iter()
        .map(|clue| PrintEntry::from_clue(clue, hostname, filter.shows(&clue.id)))
        .collect()
}
