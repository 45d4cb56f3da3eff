// Expansion module - timed, cancelable replay of an expansion through the HID boundary

mod executor;
mod state;

pub use executor::{ExecutionError, ExpansionExecutor};
pub use state::{ExecutionState, ExpansionTiming, Phase};
