//! Solve-code entry point used by the solve route.

use crate::graph::SolveOutcome;
use crate::store::{Store, StoreError};
use tracing::info;

/// Maps a submitted code onto the clue it solves. Holds no state of its own.
#[derive(Debug, Clone, Copy)]
pub struct SolveCodeResolver<'a> {
    store: &'a Store,
}

impl<'a> SolveCodeResolver<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn resolve(&self, code: &str) -> Result<SolveOutcome, StoreError> {
        let outcome = self.store.solve(code)?;
        match &outcome {
            SolveOutcome::Solved(report) => info!(
                clue = %report.clue_id,
                name = %report.name,
                repeat = report.already_solved,
                complete = report.hunt_complete(),
                "clue solved"
            ),
            SolveOutcome::Invalid { .. } => info!("rejected unknown solve code"),
        }
        Ok(outcome)
    }
}
