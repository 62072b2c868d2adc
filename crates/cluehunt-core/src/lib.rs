//! # cluehunt-core
//!
//! State layer for a physical scavenger hunt.
//!
//! This crate provides:
//! - `HuntState` and `Clue` (the hunt file's data model)
//! - clue progression (`begin_hunt`, `solve`, `visible_clues`)
//! - the shared hint ledger and elapsed-time formatting
//! - `Store`: the durable JSON snapshot, atomic saves, and a debounced
//!   watcher that reloads hand edits without re-reading its own writes
//!
//! Rendering and routing live in `cluehunt-ux`.
//!
//! ## Data model
//!
//! ```text
//! hunt.json (pretty JSON, hand-editable)
//!     ↕  load / save (tmp + rename)
//! Store { HuntState }  ←  watcher (poll → debounce → reload)
//! ```

pub mod clock;
pub mod graph;
pub mod hints;
pub mod print;
pub mod resolver;
pub mod snapshot;
pub mod stamp;
pub mod state;
pub mod store;
pub mod watch;

pub use clock::{DAY_IN_MINUTES, HOUR_IN_MINUTES, MINUTE_IN_MS, format_elapsed};
pub use graph::{SolveOutcome, SolveReport};
pub use hints::{HintReveal, parse_hint_pool};
pub use print::{PrintEntry, PrintFilter, print_view, solve_url};
pub use resolver::SolveCodeResolver;
pub use snapshot::{
    SnapshotError, parse_state, read_state_from_path, render_state, write_state_to_path,
};
pub use state::{Clue, HuntState, StateError};
pub use store::{Store, StoreError};
pub use watch::{
    DEFAULT_DEBOUNCE_WINDOW, DEFAULT_POLL_INTERVAL, DebounceDecision, ReloadDebouncer,
    WatchConfig, WatchHandle, WatchPhase, file_fingerprint,
};
