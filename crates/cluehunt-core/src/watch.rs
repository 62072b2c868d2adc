//! Debounced reloads of the hunt file.
//!
//! A single logical write can surface as several observed changes, so
//! changes are coalesced until the file has been quiet for a fixed window.
//! When the window closes, a change caused by our own save is dropped and
//! anything else triggers a reload.
//!
//! ```text
//! Idle ──change──► PendingReload ──window closes──► reload ──► Idle
//!   │
//!   └──save──► SuppressedSelfWrite ──change, window closes──► Idle
//! ```
//!
//! This is best-effort conflict resolution, not a lock: an external edit
//! landing inside the window of one of our saves is treated as our own.

use crate::state::HuntState;
use crate::store::{Store, StoreError};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(3000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchPhase {
    Idle,
    PendingReload,
    SuppressedSelfWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceDecision {
    /// Nothing observed since the last decision.
    Quiet,
    /// A change was observed; the quiet window has not elapsed yet.
    Waiting,
    /// The window closed on a change we wrote ourselves.
    SelfWrite,
    /// The window closed on an external change.
    Reload,
}

/// Single-shot debounce timer plus the self-write flag.
///
/// Time is passed in explicitly; the watcher thread drives it with
/// `Instant::now()`.
#[derive(Debug, Clone)]
pub struct ReloadDebouncer {
    window: Duration,
    deadline: Option<Instant>,
    self_write: bool,
}

impl ReloadDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            self_write: false,
        }
    }

    /// Change the quiet window. Takes effect from the next observed change.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    pub fn phase(&self) -> WatchPhase {
        match (self.self_write, self.deadline) {
            (true, _) => WatchPhase::SuppressedSelfWrite,
            (false, Some(_)) => WatchPhase::PendingReload,
            (false, None) => WatchPhase::Idle,
        }
    }

    /// Record that the next settled change is our own write.
    pub fn arm_self_write(&mut self) {
        self.self_write = true;
    }

    /// Record an observed change, restarting the quiet window.
    pub fn observe_change(&mut self, at: Instant) {
        self.deadline = Some(at + self.window);
    }

    /// Decide what to do at `now`. A closing window resets the timer and,
    /// for self-writes, clears the flag.
    pub fn poll(&mut self, now: Instant) -> DebounceDecision {
        match self.deadline {
            None => DebounceDecision::Quiet,
            Some(deadline) if now < deadline => DebounceDecision::Waiting,
            Some(_) => {
                self.deadline = None;
                if self.self_write {
                    self.self_write = false;
                    DebounceDecision::SelfWrite
                } else {
                    DebounceDecision::Reload
                }
            }
        }
    }
}

impl Default for ReloadDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    /// Quiet window measured from the last observed change.
    pub debounce: Duration,
    /// How often the file is fingerprinted.
    pub poll_interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE_WINDOW,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// SHA-256 of the file's bytes, or `None` when it cannot be read.
pub fn file_fingerprint(path: &Path) -> Option<[u8; 32]> {
    let bytes = fs::read(path).ok()?;
    Some(Sha256::digest(&bytes).into())
}

/// Owns the watcher thread. Dropping the handle stops it.
#[derive(Debug)]
pub struct WatchHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub(crate) fn spawn_watcher<F>(
    store: Arc<Store>,
    config: WatchConfig,
    on_reload: F,
) -> Result<WatchHandle, StoreError>
where
    F: Fn(&HuntState) + Send + 'static,
{
    // Fingerprint before returning so edits made right after `watch` count.
    let baseline = file_fingerprint(store.path());
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    let thread = thread::Builder::new()
        .name("cluehunt-watch".to_string())
        .spawn(move || watch_loop(&store, config, baseline, &stop_flag, on_reload))
        .map_err(|e| StoreError::Watch(e.to_string()))?;

    Ok(WatchHandle {
        stop,
        thread: Some(thread),
    })
}

fn watch_loop<F>(
    store: &Store,
    config: WatchConfig,
    baseline: Option<[u8; 32]>,
    stop: &AtomicBool,
    on_reload: F,
) where
    F: Fn(&HuntState),
{
    let path = store.path().to_path_buf();
    let mut last = baseline;
    info!(path = %path.display(), "watching hunt file");

    while !stop.load(Ordering::SeqCst) {
        thread::sleep(config.poll_interval);

        let now = Instant::now();
        let current = file_fingerprint(&path);
        if current != last {
            last = current;
            store.observe_change(now);
        }

        match store.poll_reload(now) {
            DebounceDecision::Quiet | DebounceDecision::Waiting => {}
            DebounceDecision::SelfWrite => {
                debug!("hunt file change was our own save; not reloading");
            }
            DebounceDecision::Reload => match store.reload() {
                Ok(state) => on_reload(&state),
                Err(err) => {
                    error!(error = %err, "hunt file reload failed; keeping last good state");
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(3000);

    #[test]
    fn quiet_until_a_change_is_seen() {
        let mut debouncer = ReloadDebouncer::new(WINDOW);
        let t0 = Instant::now();
        assert_eq!(debouncer.phase(), WatchPhase::Idle);
        assert_eq!(debouncer.poll(t0 + WINDOW * 2), DebounceDecision::Quiet);
    }

    #[test]
    fn external_change_reloads_after_window() {
        let mut debouncer = ReloadDebouncer::new(WINDOW);
        let t0 = Instant::now();
        debouncer.observe_change(t0);
        assert_eq!(debouncer.phase(), WatchPhase::PendingReload);

        assert_eq!(
            debouncer.poll(t0 + Duration::from_millis(2999)),
            DebounceDecision::Waiting
        );
        assert_eq!(debouncer.poll(t0 + WINDOW), DebounceDecision::Reload);
        assert_eq!(debouncer.phase(), WatchPhase::Idle);
    }

    #[test]
    fn each_change_restarts_the_window() {
        let mut debouncer = ReloadDebouncer::new(WINDOW);
        let t0 = Instant::now();
        debouncer.observe_change(t0);
        debouncer.observe_change(t0 + Duration::from_millis(2000));

        assert_eq!(
            debouncer.poll(t0 + Duration::from_millis(4000)),
            DebounceDecision::Waiting
        );
        assert_eq!(
            debouncer.poll(t0 + Duration::from_millis(5000)),
            DebounceDecision::Reload
        );
    }

    #[test]
    fn own_save_is_suppressed_once() {
        let mut debouncer = ReloadDebouncer::new(WINDOW);
        let t0 = Instant::now();
        debouncer.arm_self_write();
        assert_eq!(debouncer.phase(), WatchPhase::SuppressedSelfWrite);

        debouncer.observe_change(t0);
        debouncer.observe_change(t0 + Duration::from_millis(10));
        assert_eq!(debouncer.poll(t0 + WINDOW * 2), DebounceDecision::SelfWrite);
        assert_eq!(debouncer.phase(), WatchPhase::Idle);

        // The flag is spent: the next change is external.
        debouncer.observe_change(t0 + WINDOW * 3);
        assert_eq!(debouncer.poll(t0 + WINDOW * 5), DebounceDecision::Reload);
    }
}
