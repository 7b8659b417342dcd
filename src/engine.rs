//! Input-matching engine: folds raw keystroke buffers into progress and
//! statistics updates on a [`TestState`], and annotates the reference text
//! for rendering.

use crate::state::TestState;

/// Per-character render status for the reference text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharStatus {
    Correct,
    Incorrect,
    Cursor,
    Pending,
}

fn chars_match(input: char, target: char, case_sensitive: bool) -> bool {
    if case_sensitive {
        input == target
    } else {
        input.to_lowercase().eq(target.to_lowercase())
    }
}

/// First input index that fails the match rule, scanning from the start.
/// Characters typed beyond the reference text are never a boundary.
fn first_mismatch(input: &[char], state: &TestState) -> Option<usize> {
    input
        .iter()
        .zip(state.target_chars())
        .position(|(&typed, &target)| !chars_match(typed, target, state.case_sensitive))
}

/// Process a changed raw-input buffer against the current session.
///
/// Starts the session on the first non-empty buffer, judges newly typed
/// characters, and finishes the session once every reference character has
/// been matched. Statistics are append-only: backspacing never revises a
/// tally that was already committed.
pub fn process_input(new_input: &str, state: &mut TestState) {
    if state.finished {
        return;
    }
    // An empty buffer never starts or rewinds a session.
    if new_input.is_empty() {
        return;
    }
    if !state.typing {
        state.start();
    }

    let input: Vec<char> = new_input.chars().collect();
    let target_len = state.target_chars().len();

    if state.strict_mode {
        if let Some(boundary) = first_mismatch(&input, state) {
            // Reject the whole batch: roll the buffer back to just before
            // the error and drop its statistics, correct prefix included.
            state.user_input = input[..boundary].iter().collect();
            state.current_index = boundary;
            state.trigger_shake();
            return;
        }
    }

    let judged_end = input.len().min(target_len);
    let mut mistyped = false;
    for idx in state.current_index..judged_end {
        if chars_match(input[idx], state.target_chars()[idx], state.case_sensitive) {
            state.correct_chars += 1;
        } else {
            state.error_count += 1;
            mistyped = true;
        }
    }
    if mistyped {
        state.trigger_shake();
    }

    state.current_index = input.len().min(target_len);
    state.user_input = new_input.to_string();

    // Count comparison, not a position comparison: the tally only gets
    // here by matching every reference character at least once.
    if state.correct_chars >= target_len {
        state.finish();
    }
}

/// Annotate the reference text, one entry per reference character.
///
/// Pure and side-effect free; safe to call on every render.
pub fn annotate(state: &TestState) -> Vec<(char, CharStatus)> {
    let typed: Vec<char> = state.user_input.chars().collect();

    state
        .target_chars()
        .iter()
        .enumerate()
        .map(|(idx, &target)| {
            let status = if idx < state.current_index {
                match typed.get(idx) {
                    Some(&input) if chars_match(input, target, state.case_sensitive) => {
                        CharStatus::Correct
                    }
                    Some(_) => CharStatus::Incorrect,
                    // input shorter than the resolved index should not
                    // happen under the engine's invariants
                    None => CharStatus::Pending,
                }
            } else if idx == state.current_index {
                CharStatus::Cursor
            } else {
                CharStatus::Pending
            };
            (target, status)
        })
        .collect()
}
