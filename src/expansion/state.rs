// Expansion state - phase and progress of the one in-flight expansion sequence

use crate::limits::{LEAD_IN_DELAY_MS, SETTLE_TICKS, TYPING_DELAY_MS};
use serde::Serialize;
use std::time::Duration;

/// Where the executor is in its sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    /// Nothing scheduled
    #[default]
    Idle,
    /// Erasing the typed short code
    Backspacing,
    /// Typing the expansion text
    Typing,
}

/// Progress of the current sequence
///
/// `text` is the executor's own copy; it never points into the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionState {
    pub phase: Phase,
    pub remaining_deletes: usize,
    pub text: String,
    /// Byte offset of the next character to type
    pub cursor: usize,
}

impl ExecutionState {
    pub(crate) fn armed(text: String, delete_count: usize) -> Self {
        Self {
            phase: Phase::Backspacing,
            remaining_deletes: delete_count,
            text,
            cursor: 0,
        }
    }

    /// Next character to type, if any
    pub(crate) fn next_char(&self) -> Option<char> {
        self.text.get(self.cursor..)?.chars().next()
    }
}

/// Delays between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionTiming {
    /// Pause between start() and the first step
    pub lead_in: Duration,
    /// Base unit every pause is derived from
    pub tick: Duration,
}

impl ExpansionTiming {
    pub fn half_tick(&self) -> Duration {
        self.tick / 2
    }

    pub fn quarter_tick(&self) -> Duration {
        self.tick / 4
    }

    /// Pause between the last delete and the first typed character
    pub fn settle(&self) -> Duration {
        self.tick * SETTLE_TICKS
    }
}

impl Default for ExpansionTiming {
    fn default() -> Self {
        Self {
            lead_in: Duration::from_millis(LEAD_IN_DELAY_MS),
            tick: Duration::from_millis(TYPING_DELAY_MS),
        }
    }
}
