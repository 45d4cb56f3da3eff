// Input tracker - follows the live keystroke stream and keeps the candidate short code
//
// The candidate always equals the exact alphanumeric keystrokes since the last
// reset. Whether a key extends, trims, keeps or drops it is decided by classify().

use crate::dictionary::ExpansionStore;
use crate::keyboard::keycodes::{alphanumeric_char, Keycode};
use crate::limits::MAX_SHORT_LEN;

/// Most characters the candidate buffer holds
pub const CANDIDATE_CAPACITY: usize = MAX_SHORT_LEN - 1;

/// What a pressed key does to the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Letter or digit: extend the candidate
    Append(char),
    /// Backspace: drop the last character
    Backspace,
    /// Space always ends the candidate
    ResetOnSpace,
    /// Any other non-modifier key ends the candidate
    ResetGeneric,
    /// Modifiers (and Enter/Tab unless configured otherwise) leave it alone
    Ignore,
}

/// Build-time tracker behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Enter and Tab reset the candidate instead of being ignored
    pub reset_on_enter_tab: bool,
    /// Reset as soon as the candidate is no longer a prefix of any stored code
    pub aggressive_reset: bool,
}

impl TrackerConfig {
    /// Flags selected by Cargo features at build time
    pub const BUILD: TrackerConfig = TrackerConfig {
        reset_on_enter_tab: cfg!(feature = "reset-on-enter"),
        aggressive_reset: cfg!(feature = "aggressive-reset"),
    };
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::BUILD
    }
}

/// A resolved candidate, copied out of the store so nothing borrows it
/// once the lock is released
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSnapshot {
    pub code: String,
    pub text: String,
    /// Characters to erase before typing: the candidate length
    pub delete_count: usize,
}

/// Candidate short code under construction
#[derive(Debug, Clone)]
pub struct InputTracker {
    buffer: String,
    config: TrackerConfig,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::BUILD)
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            buffer: String::with_capacity(CANDIDATE_CAPACITY),
            config,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn config(&self) -> TrackerConfig {
        self.config
    }

    /// Decide what `key` does to the candidate
    pub fn classify(&self, key: Keycode) -> KeyAction {
        if let Some(c) = alphanumeric_char(key) {
            return KeyAction::Append(c);
        }
        match key {
            Keycode::BACKSPACE => KeyAction::Backspace,
            Keycode::SPACE => KeyAction::ResetOnSpace,
            Keycode::ENTER | Keycode::TAB if self.config.reset_on_enter_tab => {
                KeyAction::ResetGeneric
            }
            Keycode::ENTER | Keycode::TAB => KeyAction::Ignore,
            k if k.is_modifier() => KeyAction::Ignore,
            _ => KeyAction::ResetGeneric,
        }
    }

    /// Extend the candidate. A full buffer is dropped instead, and `c` is
    /// discarded with it.
    pub fn append(&mut self, c: char) {
        if self.buffer.len() < CANDIDATE_CAPACITY {
            self.buffer.push(c);
            crate::debug!("Current short: '{}' (len: {})", self.buffer, self.buffer.len());
        } else {
            crate::warn!("Current short code buffer full, resetting");
            self.reset();
        }
    }

    pub fn backspace(&mut self) {
        if self.buffer.pop().is_some() {
            crate::debug!("Current short: '{}' (len: {})", self.buffer, self.buffer.len());
        }
    }

    pub fn reset(&mut self) {
        if !self.buffer.is_empty() {
            self.buffer.clear();
            crate::debug!("Current short code reset");
        }
    }

    /// Apply one pressed key. Returns the action taken.
    ///
    /// With aggressive reset enabled, a non-empty candidate that no longer
    /// prefixes any stored code is dropped on the spot.
    pub fn handle_key(&mut self, key: Keycode, store: &ExpansionStore) -> KeyAction {
        let action = self.classify(key);
        match action {
            KeyAction::Append(c) => self.append(c),
            KeyAction::Backspace => self.backspace(),
            KeyAction::ResetOnSpace | KeyAction::ResetGeneric => self.reset(),
            KeyAction::Ignore => {}
        }

        if self.config.aggressive_reset
            && matches!(action, KeyAction::Append(_) | KeyAction::Backspace)
            && !self.buffer.is_empty()
            && store.prefix_node(&self.buffer).is_none()
        {
            crate::debug!("'{}' prefixes no expansion, resetting", self.buffer);
            self.reset();
        }

        action
    }

    /// Resolve the candidate when the trigger key fires.
    ///
    /// A hit is snapshotted and the candidate reset. A miss only resets.
    /// An empty candidate is left alone so the caller falls through to the
    /// key's default behavior.
    pub fn evaluate_trigger(&mut self, store: &ExpansionStore) -> Option<TriggerSnapshot> {
        if self.buffer.is_empty() {
            crate::debug!("No current short code to expand");
            return None;
        }

        let snapshot = store.lookup(&self.buffer).map(|text| TriggerSnapshot {
            code: self.buffer.clone(),
            text: text.to_string(),
            delete_count: self.buffer.len(),
        });
        if snapshot.is_none() {
            crate::debug!("No expansion found for '{}'", self.buffer);
        }
        self.reset();
        snapshot
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;
