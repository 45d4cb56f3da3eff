// Recording HID sink for tests

use super::{HidError, HidSink, Keycode};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Records every delivered key action and can fail chosen calls
#[derive(Debug, Default)]
pub struct RecordingHidSink {
    events: Mutex<Vec<(Keycode, bool)>>,
    calls: Mutex<usize>,
    fail_on: Mutex<Vec<usize>>,
}

impl RecordingHidSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the call with this zero-based index. Failed calls are not recorded.
    pub fn fail_on_call(&self, index: usize) {
        self.fail_on.lock().push(index);
    }

    pub fn events(&self) -> Vec<(Keycode, bool)> {
        self.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl HidSink for RecordingHidSink {
    async fn send_key_action(&self, key: Keycode, pressed: bool) -> Result<(), HidError> {
        let index = {
            let mut calls = self.calls.lock();
            let index = *calls;
            *calls += 1;
            index
        };
        if self.fail_on.lock().contains(&index) {
            return Err(HidError::Transport(format!("injected failure on call {}", index)));
        }
        self.events.lock().push((key, pressed));
        Ok(())
    }
}

/// Press and release of `key`
pub fn tap(key: Keycode) -> [(Keycode, bool); 2] {
    [(key, true), (key, false)]
}

/// Shift held around a tap of `key`
pub fn shifted_tap(key: Keycode) -> [(Keycode, bool); 4] {
    [
        (Keycode::LEFT_SHIFT, true),
        (key, true),
        (key, false),
        (Keycode::LEFT_SHIFT, false),
    ]
}
