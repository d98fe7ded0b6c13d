//! Subtitle timeline primitives shared by the engine and its frontends.
//!
//! Everything in this crate is synchronous and free of I/O: entries, the
//! per-session track storage, and the pure projections built on top of them
//! (playback overlay composition, export filename derivation and display
//! formatting). Runtime concerns live elsewhere.

use serde::{Deserialize, Serialize};

pub mod format;
pub mod naming;
pub mod overlay;
pub mod store;

/// One timed text line as produced by the processing service.
///
/// Entries are opaque to the client. `start` and `end` are seconds on the
/// media clock; the service is trusted to emit sane windows, nothing here
/// re-validates or re-orders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    /// Start of the display window, in seconds.
    pub start: f64,
    /// End of the display window, in seconds.
    pub end: f64,
    /// Text shown while the window is active.
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Whether `position` falls inside the display window, bounds inclusive.
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position <= self.end
    }
}
