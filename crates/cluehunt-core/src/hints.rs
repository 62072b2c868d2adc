//! Shared hint pool and per-clue reveal state.
//!
//! The ledger only governs the first reveal of a clue's hint, which is the
//! one transition that consumes from the pool. Whether a hint is displayed
//! afterwards is `Clue::hint_visible`, independent of the pool.

use crate::state::HuntState;

/// Result of asking for a clue's hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintReveal {
    /// First reveal: one hint was taken from the pool.
    Revealed,
    /// Hint already shown or clue solved; nothing consumed.
    AlreadyVisible,
    /// Pool is empty; hint stays hidden.
    PoolExhausted,
}

impl HintReveal {
    /// The hint is visible after this call.
    pub fn revealed(self) -> bool {
        !matches!(self, Self::PoolExhausted)
    }

    /// The call mutated hunt state and must be persisted.
    pub fn changed(self) -> bool {
        matches!(self, Self::Revealed)
    }
}

/// Parse an administrative pool override.
///
/// Surrounding whitespace is ignored. Anything that is not a non-negative
/// integer is rejected.
pub fn parse_hint_pool(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

impl HuntState {
    /// Override the remaining pool. Returns whether the value changed.
    pub fn set_hint_pool(&mut self, hints: u32) -> bool {
        let changed = self.hints != hints;
        self.hints = hints;
        changed
    }

    /// Reveal the hint for clue `id`, charging the shared pool on first reveal.
    ///
    /// Returns `None` when no clue has that id.
    pub fn reveal_hint(&mut self, id: &str) -> Option<HintReveal> {
        let pool = self.hints;
        let clue = self.find_by_id_mut(id)?;

        if clue.hint_shown || clue.is_solved() {
            return Some(HintReveal::AlreadyVisible);
        }
        if pool == 0 {
            return Some(HintReveal::PoolExhausted);
        }

        clue.hint_shown = true;
        self.hints = pool - 1;
        Some(HintReveal::Revealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Clue;
    use chrono::Utc;

    fn hunt(hints: u32) -> HuntState {
        HuntState::new(
            vec![Clue::new("a", "A", "1"), Clue::new("b", "B", "2")],
            hints,
        )
    }

    #[test]
    fn first_reveal_charges_once() {
        let mut state = hunt(2);
        assert_eq!(state.reveal_hint("a"), Some(HintReveal::Revealed));
        assert_eq!(state.hints, 1);
        assert!(state.clues[0].hint_shown);

        assert_eq!(state.reveal_hint("a"), Some(HintReveal::AlreadyVisible));
        assert_eq!(state.hints, 1);
    }

    #[test]
    fn empty_pool_never_goes_negative() {
        let mut state = hunt(1);
        assert_eq!(state.reveal_hint("a"), Some(HintReveal::Revealed));
        assert_eq!(state.reveal_hint("b"), Some(HintReveal::PoolExhausted));
        assert_eq!(state.hints, 0);
        assert!(!state.clues[1].hint_shown);
        assert!(!HintReveal::PoolExhausted.revealed());
    }

    #[test]
    fn shown_hint_stays_visible_after_pool_runs_out() {
        let mut state = hunt(1);
        state.reveal_hint("a");
        assert_eq!(state.hints, 0);
        assert_eq!(state.reveal_hint("a"), Some(HintReveal::AlreadyVisible));
        assert!(state.clues[0].hint_visible());
    }

    #[test]
    fn solved_clue_hint_is_free() {
        let mut state = hunt(3);
        state.clues[1].solved = Some(Utc::now());
        assert_eq!(state.reveal_hint("b"), Some(HintReveal::AlreadyVisible));
        assert_eq!(state.hints, 3);
        assert!(!state.clues[1].hint_shown);
    }

    #[test]
    fn unknown_clue_is_reported() {
        let mut state = hunt(3);
        assert_eq!(state.reveal_hint("missing"), None);
        assert_eq!(state.hints, 3);
    }

    #[test]
    fn pool_override_parsing() {
        assert_eq!(parse_hint_pool("5"), Some(5));
        assert_eq!(parse_hint_pool(" 0 "), Some(0));
        assert_eq!(parse_hint_pool("five"), None);
        assert_eq!(parse_hint_pool("-1"), None);
        assert_eq!(parse_hint_pool(""), None);

        let mut state = hunt(3);
        assert!(state.set_hint_pool(10));
        assert!(!state.set_hint_pool(10));
        assert_eq!(state.hints, 10);
    }
}
