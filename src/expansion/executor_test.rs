// Tests for ExpansionExecutor
// Test cases:
// - strict ordering: all backspaces before any typed key
// - Shift handling for uppercase and symbols, unsupported characters skipped
// - a second start() discards the first sequence
// - a restart or cancel mid-step still releases every pressed key
// - HID failure stops the sequence, Shift released if held
// - cancel() while idle and mid-sequence

use super::*;
use crate::keyboard::mock::{shifted_tap, tap, RecordingHidSink};

fn executor_with(sink: &Arc<RecordingHidSink>) -> ExpansionExecutor {
    ExpansionExecutor::new(Arc::clone(sink) as Arc<dyn HidSink>, Handle::current())
}

/// Long enough on the paused clock for any test sequence to finish
async fn run_to_completion() {
    tokio::time::sleep(Duration::from_secs(10)).await;
}

fn letter(c: char) -> Keycode {
    char_to_keycode(c).unwrap().keycode
}

/// Every pressed key is released as often as it is pressed
fn assert_balanced(events: &[(Keycode, bool)]) {
    let mut keys: Vec<Keycode> = events.iter().map(|(key, _)| *key).collect();
    keys.dedup();
    for key in keys {
        let presses = events.iter().filter(|e| **e == (key, true)).count();
        let releases = events.iter().filter(|e| **e == (key, false)).count();
        assert_eq!(presses, releases, "{} left held in {:?}", key, events);
    }
}

#[tokio::test(start_paused = true)]
async fn test_backspaces_then_text_in_order() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);

    executor.start("ab", 2);
    run_to_completion().await;

    let mut expected = Vec::new();
    expected.extend(tap(Keycode::BACKSPACE));
    expected.extend(tap(Keycode::BACKSPACE));
    expected.extend(tap(letter('a')));
    expected.extend(tap(letter('b')));
    assert_eq!(sink.events(), expected);
    assert_eq!(executor.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_start_returns_before_any_action() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);

    executor.start("hello", 3);

    assert_eq!(sink.event_count(), 0);
    let state = executor.state();
    assert_eq!(state.phase, Phase::Backspacing);
    assert_eq!(state.remaining_deletes, 3);
    assert_eq!(state.text, "hello");
    assert_eq!(state.cursor, 0);
}

#[tokio::test(start_paused = true)]
async fn test_shifted_characters() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);

    executor.start("OK!", 2);
    run_to_completion().await;

    let mut expected = Vec::new();
    expected.extend(tap(Keycode::BACKSPACE));
    expected.extend(tap(Keycode::BACKSPACE));
    expected.extend(shifted_tap(letter('o')));
    expected.extend(shifted_tap(letter('k')));
    expected.extend(shifted_tap(Keycode::N1));
    assert_eq!(sink.events(), expected);
}

#[tokio::test(start_paused = true)]
async fn test_zero_deletes_types_immediately() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);

    executor.start("a", 0);
    run_to_completion().await;

    assert_eq!(sink.events(), tap(letter('a')).to_vec());
    assert_eq!(executor.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_unsupported_characters_are_skipped() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);

    executor.start("a\u{e9}b", 0);
    run_to_completion().await;

    let mut expected = Vec::new();
    expected.extend(tap(letter('a')));
    expected.extend(tap(letter('b')));
    assert_eq!(sink.events(), expected);
    assert_eq!(executor.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_no_typing_before_deletes_finish() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);
    let timing = executor.timing();

    executor.start("x", 3);
    // Each delete step takes two ticks; stop inside the settle delay
    tokio::time::sleep(timing.lead_in + timing.tick * 6 + timing.half_tick()).await;

    assert_eq!(sink.event_count(), 6);
    assert!(sink
        .events()
        .iter()
        .all(|(key, _)| *key == Keycode::BACKSPACE));
    assert_eq!(executor.phase(), Phase::Typing);

    run_to_completion().await;
    assert_eq!(sink.event_count(), 8);
}

#[tokio::test(start_paused = true)]
async fn test_second_start_discards_first_sequence() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);
    let timing = executor.timing();

    executor.start("first expansion", 5);
    // Between the first and second delete steps
    tokio::time::sleep(timing.lead_in + timing.tick + timing.half_tick()).await;
    assert!(sink.event_count() > 0);

    let before = sink.event_count();
    executor.start("ok", 2);
    run_to_completion().await;

    let mut expected = Vec::new();
    expected.extend(tap(Keycode::BACKSPACE));
    expected.extend(tap(Keycode::BACKSPACE));
    expected.extend(tap(letter('o')));
    expected.extend(tap(letter('k')));
    assert_eq!(sink.events()[before..], expected[..]);
    assert_eq!(executor.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_restart_while_shift_held_completes_the_step() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);
    let timing = executor.timing();

    executor.start("A", 0);
    // Shift goes down when typing begins, the letter a quarter tick later
    tokio::time::sleep(timing.lead_in + timing.settle() + timing.tick / 10).await;
    assert_eq!(sink.events(), vec![(Keycode::LEFT_SHIFT, true)]);

    executor.start("ab", 0);
    run_to_completion().await;

    let mut expected = Vec::new();
    expected.extend(shifted_tap(letter('a')));
    expected.extend(tap(letter('a')));
    expected.extend(tap(letter('b')));
    assert_eq!(sink.events(), expected);
    assert_balanced(&sink.events());
    assert_eq!(executor.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_restart_between_press_and_release_completes_the_tap() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);
    let timing = executor.timing();

    executor.start("x", 0);
    tokio::time::sleep(timing.lead_in + timing.settle() + timing.quarter_tick()).await;
    assert_eq!(sink.events(), vec![(letter('x'), true)]);

    executor.start("ab", 0);
    run_to_completion().await;

    let mut expected = Vec::new();
    expected.extend(tap(letter('x')));
    expected.extend(tap(letter('a')));
    expected.extend(tap(letter('b')));
    assert_eq!(sink.events(), expected);
    assert_balanced(&sink.events());
}

#[tokio::test(start_paused = true)]
async fn test_restart_mid_backspace_completes_the_delete() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);
    let timing = executor.timing();

    executor.start("zz", 4);
    tokio::time::sleep(timing.lead_in + timing.quarter_tick()).await;
    assert_eq!(sink.events(), vec![(Keycode::BACKSPACE, true)]);

    executor.start("k", 1);
    run_to_completion().await;

    let mut expected = Vec::new();
    expected.extend(tap(Keycode::BACKSPACE));
    expected.extend(tap(Keycode::BACKSPACE));
    expected.extend(tap(letter('k')));
    assert_eq!(sink.events(), expected);
    assert_balanced(&sink.events());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_step_releases_held_keys() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);
    let timing = executor.timing();

    executor.start("AB", 0);
    tokio::time::sleep(timing.lead_in + timing.settle() + timing.tick / 10).await;
    executor.cancel();
    assert_eq!(executor.phase(), Phase::Idle);

    run_to_completion().await;

    assert_eq!(sink.events(), shifted_tap(letter('a')).to_vec());
    assert_balanced(&sink.events());
    assert_eq!(executor.phase(), Phase::Idle, "finished step must not revive the phase");
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_aborts_sequence() {
    let sink = Arc::new(RecordingHidSink::new());
    sink.fail_on_call(2);
    let executor = executor_with(&sink);

    executor.start("ab", 2);
    run_to_completion().await;

    // First delete went out, second press failed, nothing after it
    assert_eq!(sink.events(), tap(Keycode::BACKSPACE).to_vec());
    assert_eq!(sink.calls(), 3);
    // Left where it failed until the next start
    assert_eq!(executor.phase(), Phase::Backspacing);

    executor.start("c", 0);
    run_to_completion().await;
    assert_eq!(sink.events()[2..], tap(letter('c'))[..]);
    assert_eq!(executor.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_failure_while_shift_held_releases_shift() {
    let sink = Arc::new(RecordingHidSink::new());
    // Call 0 presses Shift, call 1 presses the letter
    sink.fail_on_call(1);
    let executor = executor_with(&sink);

    executor.start("Ab", 0);
    run_to_completion().await;

    assert_eq!(
        sink.events(),
        vec![(Keycode::LEFT_SHIFT, true), (Keycode::LEFT_SHIFT, false)]
    );
    assert_eq!(executor.phase(), Phase::Typing);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_idle_is_safe() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);

    executor.cancel();
    executor.cancel();

    assert_eq!(executor.phase(), Phase::Idle);
    assert_eq!(sink.event_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_pending_steps() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);
    let timing = executor.timing();

    executor.start("abcdef", 0);
    tokio::time::sleep(timing.lead_in + timing.settle() + timing.tick).await;
    executor.cancel();

    let emitted = sink.event_count();
    assert!(emitted < 12);
    run_to_completion().await;

    assert_eq!(sink.event_count(), emitted);
    assert_eq!(executor.phase(), Phase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_start_truncates_long_text() {
    let sink = Arc::new(RecordingHidSink::new());
    let executor = executor_with(&sink);

    let long = "a".repeat(MAX_EXPANDED_LEN + 20);
    executor.start(&long, 0);

    assert_eq!(executor.state().text.len(), MAX_EXPANDED_LEN - 1);
    executor.cancel();
}

#[test]
fn test_bounded_copy_respects_char_boundaries() {
    let mut text = "a".repeat(MAX_EXPANDED_LEN - 2);
    text.push('\u{e9}');
    let copy = bounded_copy(&text);
    assert_eq!(copy.len(), MAX_EXPANDED_LEN - 2);
    assert!(copy.chars().all(|c| c == 'a'));
}
