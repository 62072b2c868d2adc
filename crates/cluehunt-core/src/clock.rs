//! Elapsed play time and its `D:HH:MM` / `H:MM` / `0:MM` rendering.

use crate::state::HuntState;
use chrono::{DateTime, Duration, Utc};

pub const MINUTE_IN_MS: i64 = 60_000;
pub const HOUR_IN_MINUTES: i64 = 60;
pub const DAY_IN_MINUTES: i64 = 1440;

impl HuntState {
    /// Time played so far: `end` (or `now`) minus `start`.
    ///
    /// An unset `start` yields zero rather than "now minus nothing".
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        match self.start {
            Some(start) => self.end.unwrap_or(now) - start,
            None => Duration::zero(),
        }
    }

    /// Stamp the end of the hunt, freezing the elapsed time.
    ///
    /// Returns `false` when the hunt has not begun or already ended.
    pub fn end_hunt(&mut self, now: DateTime<Utc>) -> bool {
        if self.start.is_none() || self.end.is_some() {
            return false;
        }
        self.end = Some(now);
        true
    }
}

/// Render a play duration.
///
/// Minutes are floored and always two digits; seconds are dropped. The hour
/// field appears once an hour has passed and is padded only when a day field
/// precedes it. Negative durations render as zero.
pub fn format_elapsed(elapsed: Duration) -> String {
    let mut mins = (elapsed.num_milliseconds() / MINUTE_IN_MS).max(0);
    let mut out = String::new();
    let mut pad_hours = false;

    if mins >= DAY_IN_MINUTES {
        out.push_str(&format!("{}:", mins / DAY_IN_MINUTES));
        mins %= DAY_IN_MINUTES;
        pad_hours = true;
    }

    let hours = mins / HOUR_IN_MINUTES;
    if pad_hours {
        out.push_str(&format!("{hours:02}"));
    } else {
        out.push_str(&hours.to_string());
    }
    mins %= HOUR_IN_MINUTES;

    out.push_str(&format!(":{mins:02}"));
    out
}
