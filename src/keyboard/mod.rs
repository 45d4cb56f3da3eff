// Keyboard output module - the HID boundary the expansion executor types through
// Hosts provide a HidSink; the binary ships a sink that only logs key actions

pub mod keycodes;
#[cfg(test)]
pub(crate) mod mock;

pub use keycodes::{char_to_keycode, KeyPress, Keycode};

use async_trait::async_trait;

/// Errors reported by the HID boundary
///
/// Every variant counts as a transport failure: the executor aborts the
/// running sequence on any of them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HidError {
    /// The report could not be delivered to the host
    #[error("Failed to send HID report: {0}")]
    Transport(String),
    /// The key state change was refused before a report was built
    #[error("Failed to {} keycode {key}", action_verb(.pressed))]
    Rejected { key: Keycode, pressed: bool },
}

fn action_verb(pressed: &bool) -> &'static str {
    if *pressed {
        "press"
    } else {
        "release"
    }
}

/// HID boundary consumed by the expansion executor
///
/// `send_key_action` changes one key's state and delivers the resulting
/// report. From the caller's point of view both happen as one step.
#[async_trait]
pub trait HidSink: Send + Sync {
    async fn send_key_action(&self, key: Keycode, pressed: bool) -> Result<(), HidError>;
}

/// Sink that logs every key action instead of driving a device
///
/// Used by the host binary so expansions can be followed on the console.
#[derive(Debug, Default)]
pub struct LogHidSink;

impl LogHidSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HidSink for LogHidSink {
    async fn send_key_action(&self, key: Keycode, pressed: bool) -> Result<(), HidError> {
        crate::info!("HID {} {}", if pressed { "press" } else { "release" }, key);
        Ok(())
    }
}

#[cfg(test)]
#[path = "keyboard_test.rs"]
mod tests;
