// Console host - turns stdin lines into simulated keystrokes and management calls
//
// A plain line is typed key by key and followed by the trigger key.
// Lines starting with ':' drive the management API:
//   :add <code> <text>   :del <code>   :clear   :stats   :cancel

use crate::expander::{TextExpander, TriggerOutcome};
use crate::keyboard::{char_to_keycode, Keycode};

/// One parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Type these characters, then press the trigger
    Type(String),
    Add { code: String, text: String },
    Remove(String),
    Clear,
    Stats,
    Cancel,
}

/// Parse one input line. Unknown commands are rejected with a usage message.
pub fn parse_line(line: &str) -> Result<ConsoleCommand, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(ConsoleCommand::Type(line.to_string()));
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim_start()));
    match name {
        "add" => match rest.split_once(char::is_whitespace) {
            Some((code, text)) if !text.trim().is_empty() => Ok(ConsoleCommand::Add {
                code: code.to_string(),
                text: text.trim_start().to_string(),
            }),
            _ => Err("usage: :add <code> <text>".to_string()),
        },
        "del" if !rest.is_empty() => Ok(ConsoleCommand::Remove(rest.trim().to_string())),
        "del" => Err("usage: :del <code>".to_string()),
        "clear" => Ok(ConsoleCommand::Clear),
        "stats" => Ok(ConsoleCommand::Stats),
        "cancel" => Ok(ConsoleCommand::Cancel),
        other => Err(format!("unknown command ':{}'", other)),
    }
}

/// Press and release every key needed to type `text`
pub fn type_line(expander: &TextExpander, text: &str) {
    for c in text.chars() {
        let Some(press) = char_to_keycode(c) else {
            crate::debug!("No key for {:?}, not typed", c);
            continue;
        };
        if press.shift {
            expander.on_key_event(Keycode::LEFT_SHIFT, true);
        }
        expander.on_key_event(press.keycode, true);
        expander.on_key_event(press.keycode, false);
        if press.shift {
            expander.on_key_event(Keycode::LEFT_SHIFT, false);
        }
    }
}

/// Carry out one console command
pub fn apply(expander: &TextExpander, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Type(text) => {
            type_line(expander, &text);
            if expander.on_trigger() == TriggerOutcome::Transparent {
                crate::debug!("Trigger passed through");
            }
        }
        ConsoleCommand::Add { code, text } => match expander.register(&code, &text) {
            Ok(_) => crate::debug!("{} expansions registered", expander.count()),
            Err(e) => crate::warn!(":add {} rejected: {}", code, e),
        },
        ConsoleCommand::Remove(code) => {
            if let Err(e) = expander.unregister(&code) {
                crate::warn!(":del {} rejected: {}", code, e);
            }
        }
        ConsoleCommand::Clear => expander.clear_all(),
        ConsoleCommand::Stats => match serde_json::to_string(&expander.stats()) {
            Ok(json) => crate::info!("Store stats: {}", json),
            Err(e) => crate::warn!("Failed to serialize stats: {}", e),
        },
        ConsoleCommand::Cancel => expander.cancel(),
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;
