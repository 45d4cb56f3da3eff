// Shutdown coordination module
// Provides a global flag and wakeup so the host loop can stop on Ctrl+C

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tokio::sync::Notify;

/// Global shutdown flag - set to true when the host is shutting down
static SHUTTING_DOWN: AtomicBool = AtomicBool::new(false);

/// Wakes the host loop when shutdown is signaled
static SHUTDOWN_NOTIFY: OnceLock<Notify> = OnceLock::new();

fn notifier() -> &'static Notify {
    SHUTDOWN_NOTIFY.get_or_init(Notify::new)
}

/// Signal that the host is shutting down
/// Safe to call from the Ctrl+C handler thread
pub fn signal_shutdown() {
    SHUTTING_DOWN.store(true, Ordering::SeqCst);
    notifier().notify_one();
    crate::info!("Shutdown signaled");
}

/// Returns true after signal_shutdown() has been called
pub fn is_shutting_down() -> bool {
    SHUTTING_DOWN.load(Ordering::SeqCst)
}

/// Resolve once shutdown has been signaled
pub async fn wait_for_shutdown() {
    while !is_shutting_down() {
        notifier().notified().await;
    }
}

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod tests;
