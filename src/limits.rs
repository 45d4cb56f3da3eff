//! Centralized compile-time limits for the text expander.
//!
//! Every capacity and delay the expander relies on is fixed at build time
//! and defined here. Nothing in this module is adjustable at runtime.

// =============================================================================
// ALPHABET
// =============================================================================

/// Number of symbols a short code may use: `a`-`z` followed by `0`-`9`.
pub const ALPHABET_SIZE: usize = 36;

// =============================================================================
// ENTRY LIMITS
// =============================================================================

/// Maximum number of expansions the arenas are sized for.
pub const MAX_EXPANSIONS: usize = 10;

/// Short code buffer size. A short code holds at most `MAX_SHORT_LEN - 1`
/// characters.
pub const MAX_SHORT_LEN: usize = 16;

/// Expansion buffer size. An expansion holds at most `MAX_EXPANDED_LEN - 1`
/// bytes.
pub const MAX_EXPANDED_LEN: usize = 256;

// =============================================================================
// ARENA CAPACITIES
// =============================================================================

/// Trie node slots, root included.
///
/// Sized so that `MAX_EXPANSIONS` codes sharing no prefix still fit when
/// each is shorter than `MAX_SHORT_LEN`.
pub const NODE_ARENA_CAPACITY: usize = MAX_EXPANSIONS * MAX_SHORT_LEN;

/// Bytes of expansion text storage.
pub const TEXT_ARENA_CAPACITY: usize = MAX_EXPANSIONS * MAX_EXPANDED_LEN;

// =============================================================================
// TIMING
// =============================================================================

/// Duration of one executor tick (milliseconds).
///
/// Press and release of a key are separated by half a tick; Shift is held
/// a quarter tick around the key it modifies.
pub const TYPING_DELAY_MS: u64 = 10;

/// Delay between a trigger and the first backspace (milliseconds).
pub const LEAD_IN_DELAY_MS: u64 = 10;

/// Ticks to wait after the last backspace before typing starts.
pub const SETTLE_TICKS: u32 = 2;

#[cfg(test)]
#[path = "limits_test.rs"]
mod tests;
