// Keyboard text expander: short codes typed on the keyboard are replaced by
// their expansion through synthetic HID key actions

// Enable coverage attribute on nightly for explicit exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod console;
pub mod dictionary;
pub mod expander;
pub mod expansion;
pub mod keyboard;
pub mod limits;
pub mod shutdown;
pub mod tracker;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

// Re-export log macros for use throughout the crate
pub use log::{debug, error, info, trace, warn};

pub use expander::{TextExpander, TriggerOutcome};

/// Expansion list path: the first CLI argument, else the default location
fn config_path() -> Option<PathBuf> {
    if let Some(arg) = std::env::args().nth(1) {
        return Some(PathBuf::from(arg));
    }
    match config::default_config_path() {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

/// Read stdin until EOF or shutdown, one console command per line
async fn console_loop(expander: &TextExpander) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match console::parse_line(&line) {
                    Ok(command) => console::apply(expander, command),
                    Err(usage) => warn!("{}", usage),
                },
                Ok(None) => {
                    debug!("Console input closed");
                    break;
                }
                Err(e) => {
                    error!("Failed to read console input: {}", e);
                    break;
                }
            },
            _ = shutdown::wait_for_shutdown() => break,
        }
    }
}

/// Host entry point - loads the expansion list and simulates a keyboard on stdin.
/// Note: This function cannot be unit tested as it owns the process's stdin.
#[cfg_attr(coverage_nightly, coverage(off))]
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if cfg!(debug_assertions) {
            "debug"
        } else {
            "info"
        },
    ))
    .init();
    info!("Setting up texpander...");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return;
        }
    };

    if let Err(e) = ctrlc::set_handler(shutdown::signal_shutdown) {
        warn!("Failed to install Ctrl+C handler: {}", e);
    }

    let sink = Arc::new(keyboard::LogHidSink::new());
    let expander = TextExpander::new(sink, runtime.handle().clone());

    let entries = match config_path().map(|path| config::load_entries(&path)) {
        Some(Ok(entries)) => entries,
        Some(Err(e)) => {
            warn!("{}", e);
            Vec::new()
        }
        None => Vec::new(),
    };
    config::seed(&expander, &entries);

    let tick = std::time::Duration::from_millis(limits::TYPING_DELAY_MS);
    // Every step takes at most two ticks plus the settle delay
    let longest_expansion = std::time::Duration::from_millis(limits::LEAD_IN_DELAY_MS)
        + tick * (2 * (limits::MAX_SHORT_LEN + limits::MAX_EXPANDED_LEN) as u32 + limits::SETTLE_TICKS);

    info!("Type a short code and press Enter to expand it");
    runtime.block_on(async {
        console_loop(&expander).await;
        // Give a running expansion time to finish unless we are shutting down.
        // A failed sequence never reaches Idle, hence the bound.
        let drain = async {
            while !shutdown::is_shutting_down() && expander.phase() != expansion::Phase::Idle {
                tokio::time::sleep(tick).await;
            }
        };
        if tokio::time::timeout(longest_expansion, drain).await.is_err() {
            warn!("Expansion still running at exit, cancelling");
        }
    });

    expander.cancel();
    info!("texpander stopped");
}
