// Expansion executor - replays backspaces then the expansion text as timed key actions
//
// Each sequence runs as one tokio task. The task sleeps, runs a single step,
// and the step hands back the delay before the next one. Steps are atomic:
// once a step has begun, its press/release pairs always complete. start()
// and cancel() only bump a generation counter, which a sequence checks at
// each step boundary while holding the shared step guard. A new sequence
// takes the same guard before its first key action, so it runs strictly
// after any step the old sequence had already begun.

use super::state::{ExecutionState, ExpansionTiming, Phase};
use crate::keyboard::{char_to_keycode, HidError, HidSink, KeyPress, Keycode};
use crate::limits::MAX_EXPANDED_LEN;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Why a sequence stopped early
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("HID transport failed: {0}")]
    Transport(#[from] HidError),
    #[error("Sequence superseded by a newer expansion")]
    Superseded,
}

/// Copy `text` into an owned buffer, cut at the largest expansion length
fn bounded_copy(text: &str) -> String {
    let max = MAX_EXPANDED_LEN - 1;
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    crate::warn!(
        "Expansion of {} bytes truncated to {} bytes",
        text.len(),
        end
    );
    text[..end].to_string()
}

/// Runs at most one expansion sequence at a time
pub struct ExpansionExecutor {
    sink: Arc<dyn HidSink>,
    state: Arc<Mutex<ExecutionState>>,
    generation: Arc<AtomicU64>,
    /// Held for the whole of each step, by whichever sequence is stepping
    step_guard: Arc<tokio::sync::Mutex<()>>,
    runtime: Handle,
    timing: ExpansionTiming,
}

impl ExpansionExecutor {
    /// Create an executor that spawns its sequences on `runtime`
    pub fn new(sink: Arc<dyn HidSink>, runtime: Handle) -> Self {
        Self::with_timing(sink, runtime, ExpansionTiming::default())
    }

    pub fn with_timing(sink: Arc<dyn HidSink>, runtime: Handle, timing: ExpansionTiming) -> Self {
        Self {
            sink,
            state: Arc::new(Mutex::new(ExecutionState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            step_guard: Arc::new(tokio::sync::Mutex::new(())),
            runtime,
            timing,
        }
    }

    /// Begin a new sequence: `delete_count` backspaces, then `text`.
    ///
    /// Whatever was running is cancelled first: a step it already began
    /// still finishes, and nothing after that step is emitted. Returns
    /// immediately; the first step runs after the lead-in delay.
    pub fn start(&self, text: &str, delete_count: usize) {
        let text = bounded_copy(text);

        let generation = {
            let mut state = self.state.lock();
            if state.phase != Phase::Idle {
                crate::debug!("Cancelled in-flight expansion");
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            crate::info!(
                "Starting expansion: {} backspaces, {} bytes of text",
                delete_count,
                text.len()
            );
            *state = ExecutionState::armed(text, delete_count);
            generation
        };

        let sequence = Sequence {
            sink: Arc::clone(&self.sink),
            state: Arc::clone(&self.state),
            generation: Arc::clone(&self.generation),
            own_generation: generation,
            step_guard: Arc::clone(&self.step_guard),
            timing: self.timing,
        };
        self.runtime.spawn(sequence.run());
    }

    /// Stop any pending step. A step already underway completes its key
    /// pairs first. Safe while idle.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if state.phase != Phase::Idle {
            crate::info!("Expansion cancelled during {:?}", state.phase);
            state.phase = Phase::Idle;
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    pub fn state(&self) -> ExecutionState {
        self.state.lock().clone()
    }

    pub fn timing(&self) -> ExpansionTiming {
        self.timing
    }
}

impl Drop for ExpansionExecutor {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// One armed sequence, owned by its task
struct Sequence {
    sink: Arc<dyn HidSink>,
    state: Arc<Mutex<ExecutionState>>,
    generation: Arc<AtomicU64>,
    own_generation: u64,
    step_guard: Arc<tokio::sync::Mutex<()>>,
    timing: ExpansionTiming,
}

impl Sequence {
    async fn run(self) {
        let mut delay = self.timing.lead_in;
        loop {
            tokio::time::sleep(delay).await;
            let result = {
                let _stepping = self.step_guard.lock().await;
                self.step().await
            };
            match result {
                Ok(Some(next)) => delay = next,
                Ok(None) => return,
                Err(ExecutionError::Superseded) => {
                    crate::debug!("Expansion superseded, stopping");
                    return;
                }
                Err(e) => {
                    let phase = self.state.lock().phase;
                    crate::error!("Expansion aborted during {:?}: {}", phase, e);
                    return;
                }
            }
        }
    }

    /// Run one step. `Ok(None)` means the sequence is complete.
    ///
    /// Only the generation check on entry can stop a step. After it passes,
    /// every key pressed is released again; a cancel that lands mid-step is
    /// only seen when the final state update is refused.
    async fn step(&self) -> Result<Option<Duration>, ExecutionError> {
        let phase = self.with_state(|state| state.phase)?;
        match phase {
            Phase::Backspacing => self.backspace_step().await,
            Phase::Typing => self.typing_step().await,
            Phase::Idle => Ok(None),
        }
    }

    async fn backspace_step(&self) -> Result<Option<Duration>, ExecutionError> {
        if self.with_state(|state| state.remaining_deletes)? > 0 {
            self.send(Keycode::BACKSPACE, true).await?;
            tokio::time::sleep(self.timing.half_tick()).await;
            self.send(Keycode::BACKSPACE, false).await?;
            tokio::time::sleep(self.timing.half_tick()).await;
        }

        self.with_state(|state| {
            state.remaining_deletes = state.remaining_deletes.saturating_sub(1);
            if state.remaining_deletes > 0 {
                Some(self.timing.tick)
            } else {
                state.phase = Phase::Typing;
                state.cursor = 0;
                crate::debug!("Backspacing done, typing {} bytes", state.text.len());
                Some(self.timing.settle())
            }
        })
    }

    async fn typing_step(&self) -> Result<Option<Duration>, ExecutionError> {
        let next = self.with_state(|state| state.next_char())?;
        let Some(c) = next else {
            self.with_state(|state| state.phase = Phase::Idle)?;
            crate::info!("Expansion complete");
            return Ok(None);
        };

        match char_to_keycode(c) {
            Some(press) => self.type_key(press).await?,
            None => crate::warn!("No key for character {:?}, skipping", c),
        }

        self.with_state(|state| {
            state.cursor += c.len_utf8();
            Some(self.timing.tick)
        })
    }

    /// Tap one key, holding Shift around it when needed.
    ///
    /// If the key fails while Shift is down, one Shift release is attempted
    /// before the error is returned.
    async fn type_key(&self, press: KeyPress) -> Result<(), ExecutionError> {
        if press.shift {
            self.send(Keycode::LEFT_SHIFT, true).await?;
            tokio::time::sleep(self.timing.quarter_tick()).await;
        }

        let tapped = self.tap(press.keycode).await;

        if !press.shift {
            return tapped;
        }
        if let Err(e) = tapped {
            if matches!(e, ExecutionError::Transport(_)) {
                if let Err(release_err) = self.sink.send_key_action(Keycode::LEFT_SHIFT, false).await
                {
                    crate::warn!("Failed to release Shift after error: {}", release_err);
                }
            }
            return Err(e);
        }
        tokio::time::sleep(self.timing.quarter_tick()).await;
        self.send(Keycode::LEFT_SHIFT, false).await?;
        tokio::time::sleep(self.timing.quarter_tick()).await;
        Ok(())
    }

    async fn tap(&self, key: Keycode) -> Result<(), ExecutionError> {
        self.send(key, true).await?;
        tokio::time::sleep(self.timing.half_tick()).await;
        self.send(key, false).await
    }

    async fn send(&self, key: Keycode, pressed: bool) -> Result<(), ExecutionError> {
        crate::debug!("{} {}", if pressed { "Press" } else { "Release" }, key);
        self.sink.send_key_action(key, pressed).await?;
        Ok(())
    }

    fn ensure_current(&self) -> Result<(), ExecutionError> {
        if self.generation.load(Ordering::SeqCst) == self.own_generation {
            Ok(())
        } else {
            Err(ExecutionError::Superseded)
        }
    }

    /// Access the shared state if this sequence is still the current one
    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut ExecutionState) -> T,
    ) -> Result<T, ExecutionError> {
        let mut state = self.state.lock();
        self.ensure_current()?;
        Ok(f(&mut *state))
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
