//! The single owner of hunt state and of the hunt file.
//!
//! Every mutation runs under the state lock and is persisted before the
//! lock is released, so callers get read-after-write durability. Only the
//! store writes the hunt file.

use crate::graph::SolveOutcome;
use crate::hints::HintReveal;
use crate::snapshot::{SnapshotError, read_state_from_path, render_state, write_rendered_to_path};
use crate::state::HuntState;
use crate::watch::{DebounceDecision, ReloadDebouncer, WatchConfig, WatchHandle, spawn_watcher};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("failed to start hunt file watcher: {0}")]
    Watch(String),
}

#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    state: Mutex<HuntState>,
    reload: Mutex<ReloadDebouncer>,
}

impl Store {
    /// Load the hunt file at `path`.
    ///
    /// There is no sensible default hunt, so a missing or malformed file is
    /// an error the caller should treat as fatal.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let state = read_state_from_path(&path)?;
        info!(
            path = %path.display(),
            clues = state.clues.len(),
            hints = state.hints,
            "loaded hunt file"
        );
        Ok(Self {
            path,
            state: Mutex::new(state),
            reload: Mutex::new(ReloadDebouncer::default()),
        })
    }

    /// Wrap an in-memory state without reading the file; the first save
    /// creates it.
    #[cfg(test)]
    pub(crate) fn with_state(path: impl AsRef<Path>, state: HuntState) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: Mutex::new(state),
            reload: Mutex::new(ReloadDebouncer::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the hunt file without touching in-memory state.
    pub fn load(&self) -> Result<HuntState, StoreError> {
        Ok(read_state_from_path(&self.path)?)
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> HuntState {
        self.lock_state().clone()
    }

    /// Run `f` against the current state.
    pub fn read<T>(&self, f: impl FnOnce(&HuntState) -> T) -> T {
        f(&self.lock_state())
    }

    /// Persist the current state.
    pub fn save(&self) -> Result<(), StoreError> {
        let state = self.lock_state();
        self.persist(&state)
    }

    /// Execute one mutation. The closure returns `(value, changed)`;
    /// `changed=true` persists before the state lock is released.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut HuntState) -> (T, bool)) -> Result<T, StoreError> {
        let mut state = self.lock_state();
        let (value, changed) = f(&mut state);
        if changed {
            self.persist(&state)?;
        }
        Ok(value)
    }

    /// Start the hunt. Returns `false` when it had already begun.
    pub fn begin_hunt(&self) -> Result<bool, StoreError> {
        self.begin_hunt_at(Utc::now())
    }

    pub fn begin_hunt_at(&self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let begun = self.mutate(|state| {
            let begun = state.begin_hunt(now);
            (begun, begun)
        })?;
        if begun {
            info!("hunt started");
        }
        Ok(begun)
    }

    pub fn solve(&self, code: &str) -> Result<SolveOutcome, StoreError> {
        self.solve_at(code, Utc::now())
    }

    pub fn solve_at(&self, code: &str, now: DateTime<Utc>) -> Result<SolveOutcome, StoreError> {
        self.mutate(|state| {
            let before = state.clone();
            let outcome = state.solve(code, now);
            let changed = outcome.matched() && *state != before;
            (outcome, changed)
        })
    }

    /// Reveal a clue's hint. `None` when no clue has that id.
    pub fn reveal_hint(&self, clue_id: &str) -> Result<Option<HintReveal>, StoreError> {
        let reveal = self.mutate(|state| {
            let reveal = state.reveal_hint(clue_id);
            let changed = reveal.is_some_and(HintReveal::changed);
            (reveal, changed)
        })?;
        match reveal {
            Some(HintReveal::Revealed) => info!(clue = clue_id, "hint revealed"),
            Some(HintReveal::PoolExhausted) => info!(clue = clue_id, "hint pool exhausted"),
            _ => {}
        }
        Ok(reveal)
    }

    pub fn set_hint_pool(&self, hints: u32) -> Result<(), StoreError> {
        self.mutate(|state| ((), state.set_hint_pool(hints)))?;
        info!(hints, "hint pool set");
        Ok(())
    }

    /// Freeze the clock. Returns `false` when not begun or already ended.
    pub fn end_hunt(&self) -> Result<bool, StoreError> {
        self.end_hunt_at(Utc::now())
    }

    pub fn end_hunt_at(&self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let ended = self.mutate(|state| {
            let ended = state.end_hunt(now);
            (ended, ended)
        })?;
        if ended {
            info!("hunt ended");
        }
        Ok(ended)
    }

    /// Re-read the hunt file and adopt it.
    ///
    /// The state lock is held across the read, so a concurrent mutation is
    /// either fully on disk before it or applied after it. On failure the
    /// in-memory state is left as it was.
    pub fn reload(&self) -> Result<HuntState, StoreError> {
        let mut state = self.lock_state();
        let fresh = self.load()?;
        *state = fresh.clone();
        drop(state);
        info!(
            path = %self.path.display(),
            clues = fresh.clues.len(),
            "reloaded hunt file after external edit"
        );
        Ok(fresh)
    }

    /// Watch the hunt file for external edits.
    ///
    /// After each settled external change the file is reloaded, adopted and
    /// handed to `on_reload`. Changes caused by our own saves are skipped.
    pub fn watch<F>(
        self: &Arc<Self>,
        config: WatchConfig,
        on_reload: F,
    ) -> Result<WatchHandle, StoreError>
    where
        F: Fn(&HuntState) + Send + 'static,
    {
        self.lock_reload().set_window(config.debounce);
        spawn_watcher(Arc::clone(self), config, on_reload)
    }

    /// Current phase of the reload debouncer.
    pub fn watch_phase(&self) -> crate::watch::WatchPhase {
        self.lock_reload().phase()
    }

    pub(crate) fn observe_change(&self, at: Instant) {
        self.lock_reload().observe_change(at);
    }

    pub(crate) fn poll_reload(&self, now: Instant) -> DebounceDecision {
        self.lock_reload().poll(now)
    }

    /// Write `state` unless the file already holds exactly these bytes.
    ///
    /// The self-write flag is armed only after a write that changes the
    /// file, since an unchanged file never produces a change for the
    /// watcher to consume.
    fn persist(&self, state: &HuntState) -> Result<(), StoreError> {
        let rendered = render_state(state)?;
        if fs::read(&self.path).is_ok_and(|current| current == rendered) {
            debug!(path = %self.path.display(), "hunt file already up to date");
            return Ok(());
        }
        if let Err(err) = write_rendered_to_path(&self.path, &rendered) {
            warn!(path = %self.path.display(), error = %err, "failed to save hunt file");
            return Err(err.into());
        }
        self.lock_reload().arm_self_write();
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, HuntState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_reload(&self) -> MutexGuard<'_, ReloadDebouncer> {
        self.reload.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
