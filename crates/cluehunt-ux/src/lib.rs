//! Presentation layer.
//!
//! This crate shapes hunt state into the documents participants and
//! organizers see. The state core (`cluehunt-core`) stays the only owner of
//! hunt state; this crate only calls its operations and projects results.

pub mod http;

use chrono::{DateTime, Utc};
use cluehunt_core::{
    Clue, HintReveal, HuntState, PrintEntry, PrintFilter, SolveCodeResolver, SolveOutcome, Store,
    StoreError, format_elapsed, print_view,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Operations the views need from the state core.
pub trait HuntBackend {
    fn snapshot(&self) -> HuntState;
    fn begin_hunt(&self) -> Result<bool, StoreError>;
    fn solve(&self, code: &str) -> Result<SolveOutcome, StoreError>;
    fn reveal_hint(&self, clue_id: &str) -> Result<Option<HintReveal>, StoreError>;
    fn set_hint_pool(&self, hints: u32) -> Result<(), StoreError>;
}

impl HuntBackend for Store {
    fn snapshot(&self) -> HuntState {
        Store::snapshot(self)
    }

    fn begin_hunt(&self) -> Result<bool, StoreError> {
        Store::begin_hunt(self)
    }

    fn solve(&self, code: &str) -> Result<SolveOutcome, StoreError> {
        SolveCodeResolver::new(self).resolve(code)
    }

    fn reveal_hint(&self, clue_id: &str) -> Result<Option<HintReveal>, StoreError> {
        Store::reveal_hint(self, clue_id)
    }

    fn set_hint_pool(&self, hints: u32) -> Result<(), StoreError> {
        Store::set_hint_pool(self, hints)
    }
}

impl<B: HuntBackend + ?Sized> HuntBackend for Arc<B> {
    fn snapshot(&self) -> HuntState {
        (**self).snapshot()
    }

    fn begin_hunt(&self) -> Result<bool, StoreError> {
        (**self).begin_hunt()
    }

    fn solve(&self, code: &str) -> Result<SolveOutcome, StoreError> {
        (**self).solve(code)
    }

    fn reveal_hint(&self, clue_id: &str) -> Result<Option<HintReveal>, StoreError> {
        (**self).reveal_hint(clue_id)
    }

    fn set_hint_pool(&self, hints: u32) -> Result<(), StoreError> {
        (**self).set_hint_pool(hints)
    }
}

/// A clue as participants see it. Never carries the solve code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClueSummary {
    pub id: String,
    pub name: String,
    pub unlocked: bool,
    /// Solve time in epoch milliseconds.
    pub solved: Option<i64>,
    pub hint_shown: bool,
}

impl From<&Clue> for ClueSummary {
    fn from(clue: &Clue) -> Self {
        Self {
            id: clue.id.clone(),
            name: clue.name.clone(),
            unlocked: clue.unlocked,
            solved: clue.solved.map(|at| at.timestamp_millis()),
            hint_shown: clue.hint_shown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub total: usize,
    pub time: String,
    pub hint_count: u32,
    pub started: bool,
    pub ended: bool,
    pub clues: Vec<ClueSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClueView {
    pub access: bool,
    pub show_hint: bool,
    pub hint_count: u32,
    pub clue: Option<ClueSummary>,
    pub content: Option<String>,
    pub hint: Option<String>,
}

impl ClueView {
    fn denied(hint_count: u32) -> Self {
        Self {
            access: false,
            show_hint: false,
            hint_count,
            clue: None,
            content: None,
            hint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveView {
    pub solved: bool,
    pub already_solved: bool,
    pub done: bool,
    pub next: Option<ClueSummary>,
    pub name: Option<String>,
    /// Echo of the rejected code.
    pub code: Option<String>,
}

impl From<&SolveOutcome> for SolveView {
    fn from(outcome: &SolveOutcome) -> Self {
        match outcome {
            SolveOutcome::Invalid { code } => Self {
                solved: false,
                already_solved: false,
                done: false,
                next: None,
                name: None,
                code: Some(code.clone()),
            },
            SolveOutcome::Solved(report) => Self {
                solved: true,
                already_solved: report.already_solved,
                done: report.hunt_complete(),
                next: report.next.as_ref().map(ClueSummary::from),
                name: Some(report.name.clone()),
                code: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintSheet {
    pub clues: Vec<PrintEntry>,
}

#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Public base URL printed into solve links.
    pub hostname: String,
    /// Directory holding `<clue id>/content.html` and `<clue id>/hint.html`.
    pub content_dir: PathBuf,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            hostname: "http://localhost:9090".to_string(),
            content_dir: PathBuf::from("clues"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UxService<B: HuntBackend> {
    backend: B,
    config: ViewConfig,
}

impl<B: HuntBackend> UxService<B> {
    pub fn new(backend: B, config: ViewConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn home(&self, now: DateTime<Utc>) -> HomeView {
        let state = self.backend.snapshot();
        HomeView {
            total: state.clues.len(),
            time: format_elapsed(state.elapsed(now)),
            hint_count: state.hints,
            started: state.started(),
            ended: state.end.is_some(),
            clues: state
                .visible_clues()
                .into_iter()
                .map(ClueSummary::from)
                .collect(),
        }
    }

    /// Begin the hunt and return the path participants go to next.
    pub fn start(&self) -> Result<String, StoreError> {
        self.backend.begin_hunt()?;
        let state = self.backend.snapshot();
        Ok(match state.clues.first() {
            Some(first) => format!("/clue/{}", first.id),
            None => "/".to_string(),
        })
    }

    /// Apply a raw pool override. Unparseable input is ignored.
    pub fn set_hints(&self, hints: Option<u32>) -> Result<(), StoreError> {
        match hints {
            Some(hints) => self.backend.set_hint_pool(hints),
            None => Ok(()),
        }
    }

    pub fn print(&self, filter: &PrintFilter) -> PrintSheet {
        let state = self.backend.snapshot();
        PrintSheet {
            clues: print_view(&state, &self.config.hostname, filter),
        }
    }

    /// View a clue. Unknown ids get the access-denied view.
    pub fn clue(&self, clue_id: &str) -> ClueView {
        let state = self.backend.snapshot();
        match state.find_by_id(clue_id) {
            Some(clue) => self.clue_view(clue, state.hints),
            None => ClueView::denied(state.hints),
        }
    }

    /// Reveal a clue's hint, then view it. `None` for unknown ids.
    pub fn reveal_hint(&self, clue_id: &str) -> Result<Option<ClueView>, StoreError> {
        if self.backend.reveal_hint(clue_id)?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.clue(clue_id)))
    }

    pub fn solve(&self, code: &str) -> Result<SolveView, StoreError> {
        let outcome = self.backend.solve(code)?;
        Ok(SolveView::from(&outcome))
    }

    fn clue_view(&self, clue: &Clue, hint_count: u32) -> ClueView {
        let access = clue.accessible();
        let show_hint = clue.hint_visible();
        ClueView {
            access,
            show_hint,
            hint_count,
            clue: Some(ClueSummary::from(clue)),
            content: access
                .then(|| self.read_content(&clue.id, "content.html"))
                .flatten(),
            hint: (access && show_hint)
                .then(|| self.read_content(&clue.id, "hint.html"))
                .flatten(),
        }
    }

    fn read_content(&self, clue_id: &str, file: &str) -> Option<String> {
        let path = self.config.content_dir.join(clue_id).join(file);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "clue content unavailable");
                None
            }
        }
    }
}
