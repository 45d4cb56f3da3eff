// Text expander - the one context object shared by the keystroke listener,
// the management API and the trigger key
//
// The store and the tracker live behind a single mutex because both are
// touched from the same keystroke callback. The lock is released before the
// executor is started, and the executor never takes it.

use crate::dictionary::{ExpansionStore, Registration, StoreError, StoreStats};
use crate::expansion::{ExecutionState, ExpansionExecutor, Phase};
use crate::keyboard::{HidSink, Keycode};
use crate::tracker::{InputTracker, KeyAction, TrackerConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;

/// What the trigger key did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// An expansion started; the trigger key is consumed
    Opaque,
    /// Nothing to expand; the key keeps its default behavior
    Transparent,
}

struct ExpanderState {
    store: ExpansionStore,
    tracker: InputTracker,
}

/// Store, tracker and executor wired together
pub struct TextExpander {
    state: Mutex<ExpanderState>,
    executor: ExpansionExecutor,
}

impl TextExpander {
    /// Create an expander with the build-time limits and tracker flags
    pub fn new(sink: Arc<dyn HidSink>, runtime: Handle) -> Self {
        Self::from_parts(
            ExpansionStore::new(),
            TrackerConfig::BUILD,
            ExpansionExecutor::new(sink, runtime),
        )
    }

    pub fn from_parts(
        store: ExpansionStore,
        tracker_config: TrackerConfig,
        executor: ExpansionExecutor,
    ) -> Self {
        Self {
            state: Mutex::new(ExpanderState {
                store,
                tracker: InputTracker::with_config(tracker_config),
            }),
            executor,
        }
    }

    // -------------------------------------------------------------------------
    // Management API
    // -------------------------------------------------------------------------

    #[must_use = "this returns a Result that should be handled"]
    pub fn register(&self, code: &str, text: &str) -> Result<Registration, StoreError> {
        let mut state = self.state.lock();
        let result = state.store.register(code, text);
        match &result {
            Ok(Registration::Added) => crate::info!(
                "Added expansion '{}' ({} total)",
                code,
                state.store.count()
            ),
            Ok(Registration::Updated) => crate::info!("Updated expansion '{}'", code),
            Err(e) => crate::warn!("Failed to register '{}': {}", code, e),
        }
        result
    }

    #[must_use = "this returns a Result that should be handled"]
    pub fn unregister(&self, code: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let result = state.store.unregister(code);
        match &result {
            Ok(()) => crate::info!(
                "Removed expansion '{}' ({} remaining)",
                code,
                state.store.count()
            ),
            Err(e) => crate::warn!("Failed to unregister '{}': {}", code, e),
        }
        result
    }

    pub fn clear_all(&self) {
        let mut state = self.state.lock();
        state.store.clear_all();
        state.tracker.reset();
        crate::info!("Cleared all expansions");
    }

    pub fn count(&self) -> usize {
        self.state.lock().store.count()
    }

    pub fn exists(&self, code: &str) -> bool {
        self.state.lock().store.exists(code)
    }

    pub fn stats(&self) -> StoreStats {
        self.state.lock().store.stats()
    }

    // -------------------------------------------------------------------------
    // Keystroke and trigger entry points
    // -------------------------------------------------------------------------

    /// Feed one key event into the tracker.
    ///
    /// Only presses count. When the lock is held elsewhere the event is
    /// dropped rather than waited for. The event always continues on to the
    /// rest of the keymap; nothing here consumes it.
    pub fn on_key_event(&self, keycode: Keycode, pressed: bool) {
        if !pressed {
            return;
        }
        let Some(mut state) = self.state.try_lock() else {
            crate::trace!("Skipping key event - expander lock contended");
            return;
        };
        let ExpanderState { store, tracker } = &mut *state;
        if tracker.handle_key(keycode, store) == KeyAction::Ignore {
            crate::trace!("Ignoring {}", keycode);
        }
    }

    /// Expand the current candidate if it names a stored expansion
    pub fn on_trigger(&self) -> TriggerOutcome {
        let snapshot = {
            let mut state = self.state.lock();
            let ExpanderState { store, tracker } = &mut *state;
            tracker.evaluate_trigger(store)
        };

        match snapshot {
            Some(snapshot) => {
                crate::info!("Expanding '{}'", snapshot.code);
                self.executor.start(&snapshot.text, snapshot.delete_count);
                TriggerOutcome::Opaque
            }
            None => TriggerOutcome::Transparent,
        }
    }

    /// Stop any running expansion
    pub fn cancel(&self) {
        self.executor.cancel();
    }

    /// Candidate short code typed so far
    pub fn current_short(&self) -> String {
        self.state.lock().tracker.buffer().to_string()
    }

    pub fn phase(&self) -> Phase {
        self.executor.phase()
    }

    pub fn execution_state(&self) -> ExecutionState {
        self.executor.state()
    }
}

#[cfg(test)]
#[path = "expander_test.rs"]
mod tests;
