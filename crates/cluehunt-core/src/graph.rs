//! Clue progression: lookup, the participant view, begin and solve.
//!
//! Each clue moves `locked → unlocked → solved`. Solved is terminal: the
//! solve stamp is written once and never cleared. The only ways a clue
//! becomes unlocked are `begin_hunt` (first clue) and successor selection
//! inside `solve`.

use crate::state::{Clue, HuntState};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// What a submitted solve code did.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// No clue carries this code. Nothing was changed.
    Invalid { code: String },
    Solved(SolveReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub clue_id: String,
    pub name: String,
    /// The clue already had a solve stamp before this submission.
    pub already_solved: bool,
    /// The clue unlocked as a result, absent when the hunt is finished.
    pub next: Option<Clue>,
}

impl SolveReport {
    pub fn hunt_complete(&self) -> bool {
        self.next.is_none()
    }
}

impl SolveOutcome {
    pub fn matched(&self) -> bool {
        matches!(self, Self::Solved(_))
    }

    pub fn report(&self) -> Option<&SolveReport> {
        match self {
            Self::Solved(report) => Some(report),
            Self::Invalid { .. } => None,
        }
    }
}

impl HuntState {
    /// Lookup one clue by id.
    pub fn find_by_id(&self, id: &str) -> Option<&Clue> {
        self.clues.iter().find(|clue| clue.id == id)
    }

    /// Lookup one clue by id (mutable).
    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Clue> {
        self.clues.iter_mut().find(|clue| clue.id == id)
    }

    /// Clues a participant can see: unlocked ones first in stored order,
    /// then solved ones, most recently solved first.
    ///
    /// Locked unsolved clues are left out entirely.
    pub fn visible_clues(&self) -> Vec<&Clue> {
        let mut visible: Vec<&Clue> = self
            .clues
            .iter()
            .filter(|clue| clue.is_solved() || clue.unlocked)
            .collect();
        // Stable sort keeps stored order among unlocked clues.
        visible.sort_by(|a, b| rank(a, b));
        visible
    }

    /// Start the clock and unlock the first clue.
    ///
    /// Returns `false` without touching anything when the hunt has already
    /// begun.
    pub fn begin_hunt(&mut self, now: DateTime<Utc>) -> bool {
        if self.start.is_some() {
            return false;
        }
        self.start = Some(now);
        if let Some(first) = self.clues.first_mut() {
            first.unlocked = true;
        }
        true
    }

    /// Apply a submitted solve code.
    ///
    /// Re-submitting an already solved clue's code is accepted: the clue is
    /// re-locked, its stamp is kept, and when no clue is unlocked at that
    /// point the first unsolved clue is unlocked so a hunt left with an
    /// empty active set can recover.
    pub fn solve(&mut self, code: &str, now: DateTime<Utc>) -> SolveOutcome {
        let Some(index) = self.clues.iter().position(|clue| clue.solve_code == code) else {
            return SolveOutcome::Invalid {
                code: code.to_string(),
            };
        };

        if self.start.is_none() {
            self.start = Some(now);
        }

        self.clues[index].unlocked = false;
        let mut next = self.clues.iter().position(|clue| clue.unlocked);

        let already_solved = self.clues[index].is_solved();
        if !already_solved {
            self.clues[index].solved = Some(now);
        }

        // Computed after stamping so a first solve never selects itself.
        if next.is_none() {
            next = self.clues.iter().position(|clue| !clue.is_solved());
        }

        if let Some(next_index) = next {
            self.clues[next_index].unlocked = true;
        }

        let solved = &self.clues[index];
        SolveOutcome::Solved(SolveReport {
            clue_id: solved.id.clone(),
            name: solved.name.clone(),
            already_solved,
            next: next.map(|i| self.clues[i].clone()),
        })
    }
}

fn rank(a: &Clue, b: &Clue) -> Ordering {
    b.unlocked
        .cmp(&a.unlocked)
        .then_with(|| b.solved.cmp(&a.solved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 10, minute, 0)
            .single()
            .expect("valid fixture time")
    }

    fn hunt() -> HuntState {
        HuntState::new(
            vec![
                Clue::new("c1", "Fountain", "A"),
                Clue::new("c2", "Library", "B"),
                Clue::new("c3", "Clock tower", "C"),
            ],
            2,
        )
    }

    #[test]
    fn begin_is_idempotent() {
        let mut state = hunt();
        assert!(state.begin_hunt(at(0)));
        let once = state.clone();

        assert!(!state.begin_hunt(at(5)));
        assert_eq!(state, once);
        assert_eq!(state.start, Some(at(0)));
        assert!(state.clues[0].unlocked);
        assert!(!state.clues[1].unlocked);
    }

    #[test]
    fn begin_with_no_clues_only_starts_the_clock() {
        let mut state = HuntState::default();
        assert!(state.begin_hunt(at(0)));
        assert_eq!(state.start, Some(at(0)));
    }

    #[test]
    fn solve_advances_to_next_clue() {
        let mut state = hunt();
        state.begin_hunt(at(0));

        let outcome = state.solve("A", at(3));
        let report = outcome.report().expect("code A should match");
        assert_eq!(report.name, "Fountain");
        assert!(!report.already_solved);
        assert!(!report.hunt_complete());
        assert_eq!(report.next.as_ref().map(|c| c.id.as_str()), Some("c2"));

        assert_eq!(state.clues[0].solved, Some(at(3)));
        assert!(!state.clues[0].unlocked);
        assert!(state.clues[1].unlocked);
    }

    #[test]
    fn unknown_code_changes_nothing() {
        let mut state = hunt();
        let before = state.clone();

        let outcome = state.solve("Z", at(1));
        assert_eq!(
            outcome,
            SolveOutcome::Invalid {
                code: "Z".to_string()
            }
        );
        assert!(!outcome.matched());
        assert_eq!(state, before);
    }

    #[test]
    fn solve_before_begin_starts_the_clock() {
        let mut state = hunt();
        let outcome = state.solve("B", at(7));
        assert!(outcome.matched());
        assert_eq!(state.start, Some(at(7)));
        assert!(state.start <= state.clues[1].solved);
        // Nothing else was unlocked, so the first unsolved clue takes over.
        assert!(state.clues[0].unlocked);
    }

    #[test]
    fn resolving_keeps_the_first_stamp() {
        let mut state = hunt();
        state.begin_hunt(at(0));
        state.solve("A", at(2));

        let outcome = state.solve("A", at(9));
        let report = outcome.report().expect("code A should still match");
        assert!(report.already_solved);
        assert_eq!(state.clues[0].solved, Some(at(2)));
        assert_eq!(report.next.as_ref().map(|c| c.id.as_str()), Some("c2"));
    }

    #[test]
    fn resolving_recovers_an_empty_active_set() {
        let mut state = hunt();
        state.begin_hunt(at(0));
        state.solve("A", at(2));
        // Organizer hand-edit left nothing unlocked.
        state.clues[1].unlocked = false;

        let outcome = state.solve("A", at(4));
        let report = outcome.report().expect("code A should match");
        assert_eq!(report.next.as_ref().map(|c| c.id.as_str()), Some("c2"));
        assert!(state.clues[1].unlocked);
    }

    #[test]
    fn last_solve_completes_the_hunt() {
        let mut state = hunt();
        state.begin_hunt(at(0));
        state.solve("A", at(1));
        state.solve("B", at(2));
        let outcome = state.solve("C", at(3));

        let report = outcome.report().expect("code C should match");
        assert!(report.hunt_complete());
        assert!(state.complete());
        assert!(state.clues.iter().all(|c| !c.unlocked));
    }

    #[test]
    fn visible_clues_rank_unlocked_then_recent_solves() {
        let mut state = hunt();
        state.clues.push(Clue::new("c4", "Bridge", "D"));
        state.begin_hunt(at(0));
        state.solve("A", at(1));
        state.solve("B", at(2));

        let ids: Vec<&str> = state
            .visible_clues()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c3", "c2", "c1"]);
    }

    #[test]
    fn visible_clues_keep_stored_order_among_unlocked() {
        let mut state = hunt();
        state.clues[2].unlocked = true;
        state.clues[0].unlocked = true;

        let ids: Vec<&str> = state
            .visible_clues()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c1", "c3"]);
    }
}
