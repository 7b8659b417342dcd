use std::rc::Rc;
use std::time::Duration;

use crate::challenge::Challenge;
use crate::clock::{Clock, MonotonicClock};

/// How long the error pulse stays raised before the tick handler clears it.
pub const SHAKE_RESET: Duration = Duration::from_millis(600);

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Typing,
    Finished,
}

/// Mutable state for the test session being displayed to the user.
///
/// Created once and reused across tests via `reset`/`change_challenge`.
/// All judging happens in `crate::engine`; this type only owns lifecycle
/// transitions and derived metrics.
#[derive(Debug)]
pub struct TestState {
    pub challenge: Challenge,
    target_chars: Vec<char>,
    /// Raw accumulated keystroke buffer as the engine last accepted it.
    pub user_input: String,
    /// Number of reference characters resolved (judged correct or not).
    pub current_index: usize,
    pub case_sensitive: bool,
    pub strict_mode: bool,
    pub typing: bool,
    pub finished: bool,
    started_at: Option<Duration>,
    ended_at: Option<Duration>,
    /// Append-only tallies; backspacing never revises them.
    pub correct_chars: usize,
    pub error_count: usize,
    pub should_shake: bool,
    shake_deadline: Option<Duration>,
    clock: Rc<dyn Clock>,
}

impl TestState {
    pub fn new(challenge: Challenge) -> Self {
        Self::with_clock(challenge, Rc::new(MonotonicClock::new()))
    }

    pub fn with_clock(challenge: Challenge, clock: Rc<dyn Clock>) -> Self {
        let target_chars = challenge.text.chars().collect();
        Self {
            challenge,
            target_chars,
            user_input: String::new(),
            current_index: 0,
            case_sensitive: false,
            strict_mode: false,
            typing: false,
            finished: false,
            started_at: None,
            ended_at: None,
            correct_chars: 0,
            error_count: 0,
            should_shake: false,
            shake_deadline: None,
            clock,
        }
    }

    /// Cached decomposition of `challenge.text`; recomputed whenever the
    /// challenge changes.
    pub fn target_chars(&self) -> &[char] {
        &self.target_chars
    }

    pub fn phase(&self) -> Phase {
        if self.finished {
            Phase::Finished
        } else if self.typing {
            Phase::Typing
        } else {
            Phase::Idle
        }
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.finished
    }

    pub fn start(&mut self) {
        self.started_at = Some(self.clock.now());
        self.ended_at = None;
        self.typing = true;
    }

    /// Freezes the timer and clears the input echo; statistics survive.
    pub fn finish(&mut self) {
        self.ended_at = Some(self.clock.now());
        self.typing = false;
        self.finished = true;
        self.user_input.clear();
    }

    /// Back to `Idle`: clears progress, statistics, timestamps, and any
    /// pending shake reset. The challenge and settings are preserved.
    pub fn reset(&mut self) {
        self.typing = false;
        self.finished = false;
        self.started_at = None;
        self.ended_at = None;
        self.current_index = 0;
        self.correct_chars = 0;
        self.error_count = 0;
        self.user_input.clear();
        self.should_shake = false;
        self.shake_deadline = None;
    }

    pub fn change_challenge(&mut self, challenge: Challenge) {
        self.target_chars = challenge.text.chars().collect();
        self.challenge = challenge;
        self.reset();
    }

    /// Seconds spent typing: frozen once finished, live while typing,
    /// zero otherwise. Recomputed on every read, never cached.
    pub fn elapsed_time(&self) -> f64 {
        let Some(start) = self.started_at else {
            return 0.0;
        };
        if let Some(end) = self.ended_at {
            return end.saturating_sub(start).as_secs_f64();
        }
        if self.typing {
            self.clock.now().saturating_sub(start).as_secs_f64()
        } else {
            0.0
        }
    }

    /// Standard 5-characters-per-word convention.
    pub fn wpm(&self) -> f64 {
        let elapsed = self.elapsed_time();
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.correct_chars as f64 / 5.0) / (elapsed / 60.0)
    }

    /// Integer percent, truncating toward zero; 100 before anything has
    /// been judged.
    pub fn accuracy(&self) -> u32 {
        let total = self.correct_chars + self.error_count;
        if total == 0 {
            return 100;
        }
        (self.correct_chars * 100 / total) as u32
    }

    /// Raise the error pulse and (re)arm its reset. Re-triggering restarts
    /// the window instead of stacking a second one.
    pub fn trigger_shake(&mut self) {
        self.should_shake = true;
        self.shake_deadline = Some(self.clock.now() + SHAKE_RESET);
    }

    /// True while a shake reset is armed.
    pub fn shake_pending(&self) -> bool {
        self.shake_deadline.is_some()
    }

    /// Tick handler: clears the error pulse once its window elapses.
    pub fn on_tick(&mut self) {
        if let Some(deadline) = self.shake_deadline {
            if self.clock.now() >= deadline {
                self.should_shake = false;
                self.shake_deadline = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge(text: &str) -> Challenge {
        Challenge {
            id: "test".to_string(),
            title: "Test".to_string(),
            text: text.to_string(),
        }
    }

    fn state_with_clock(text: &str) -> (TestState, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        let state = TestState::with_clock(challenge(text), clock.clone());
        (state, clock)
    }

    use crate::clock::ManualClock;

    #[test]
    fn new_state_is_idle() {
        let state = TestState::new(challenge("hello"));

        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.has_started());
        assert!(!state.has_finished());
        assert_eq!(state.current_index, 0);
        assert_eq!(state.correct_chars, 0);
        assert_eq!(state.error_count, 0);
        assert_eq!(state.user_input, "");
        assert!(!state.should_shake);
        assert_eq!(state.target_chars(), &['h', 'e', 'l', 'l', 'o']);
    }

    #[test]
    fn start_records_timestamp_and_enters_typing() {
        let (mut state, clock) = state_with_clock("hi");
        clock.set(Duration::from_secs(3));

        state.start();

        assert_eq!(state.phase(), Phase::Typing);
        assert!(state.has_started());
        assert_eq!(state.elapsed_time(), 0.0);

        clock.advance(Duration::from_secs(2));
        assert_eq!(state.elapsed_time(), 2.0);
    }

    #[test]
    fn finish_freezes_elapsed_and_clears_input() {
        let (mut state, clock) = state_with_clock("hi");
        state.start();
        state.user_input = "hi".to_string();
        state.correct_chars = 2;

        clock.advance(Duration::from_secs(4));
        state.finish();

        assert_eq!(state.phase(), Phase::Finished);
        assert_eq!(state.user_input, "");
        assert_eq!(state.correct_chars, 2);
        assert_eq!(state.elapsed_time(), 4.0);

        // frozen: advancing the clock no longer moves the reading
        clock.advance(Duration::from_secs(10));
        assert_eq!(state.elapsed_time(), 4.0);
    }

    #[test]
    fn elapsed_is_zero_before_start() {
        let (state, clock) = state_with_clock("hi");
        clock.advance(Duration::from_secs(5));
        assert_eq!(state.elapsed_time(), 0.0);
    }

    #[test]
    fn wpm_is_zero_without_elapsed_time() {
        let (mut state, _clock) = state_with_clock("hi");
        state.correct_chars = 10;
        assert_eq!(state.wpm(), 0.0);
    }

    #[test]
    fn wpm_uses_five_char_word_convention() {
        let (mut state, clock) = state_with_clock("hello world");
        state.start();
        state.correct_chars = 30;
        clock.advance(Duration::from_secs(60));

        // 30 chars = 6 words over one minute
        assert_eq!(state.wpm(), 6.0);
    }

    #[test]
    fn accuracy_is_100_before_judging() {
        let (state, _clock) = state_with_clock("hi");
        assert_eq!(state.accuracy(), 100);
    }

    #[test]
    fn accuracy_truncates_toward_zero() {
        let (mut state, _clock) = state_with_clock("abc");
        state.correct_chars = 2;
        state.error_count = 1;
        // 66.66.. truncates to 66
        assert_eq!(state.accuracy(), 66);
    }

    #[test]
    fn reset_clears_everything_but_challenge_and_settings() {
        let (mut state, clock) = state_with_clock("hello");
        state.case_sensitive = true;
        state.strict_mode = true;
        state.start();
        state.user_input = "hel".to_string();
        state.current_index = 3;
        state.correct_chars = 2;
        state.error_count = 1;
        state.trigger_shake();
        clock.advance(Duration::from_secs(1));
        state.finish();

        state.reset();

        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.typing);
        assert!(!state.finished);
        assert_eq!(state.current_index, 0);
        assert_eq!(state.correct_chars, 0);
        assert_eq!(state.error_count, 0);
        assert_eq!(state.user_input, "");
        assert_eq!(state.elapsed_time(), 0.0);
        assert!(!state.should_shake);
        assert!(!state.shake_pending());
        // preserved
        assert!(state.case_sensitive);
        assert!(state.strict_mode);
        assert_eq!(state.challenge.id, "test");
    }

    #[test]
    fn reset_cancels_pending_shake_timer() {
        let (mut state, clock) = state_with_clock("hi");
        state.trigger_shake();
        state.reset();

        // a stale deadline must not flip the flag in the next session
        clock.advance(SHAKE_RESET * 2);
        state.on_tick();
        assert!(!state.should_shake);
        assert!(!state.shake_pending());
    }

    #[test]
    fn shake_clears_after_its_window() {
        let (mut state, clock) = state_with_clock("hi");
        state.trigger_shake();
        assert!(state.should_shake);

        clock.advance(Duration::from_millis(599));
        state.on_tick();
        assert!(state.should_shake);

        clock.advance(Duration::from_millis(1));
        state.on_tick();
        assert!(!state.should_shake);
        assert!(!state.shake_pending());
    }

    #[test]
    fn retrigger_restarts_the_shake_window() {
        let (mut state, clock) = state_with_clock("hi");
        state.trigger_shake();

        clock.advance(Duration::from_millis(400));
        state.trigger_shake();

        // 800ms after the first trigger, 400ms after the second: still up
        clock.advance(Duration::from_millis(400));
        state.on_tick();
        assert!(state.should_shake);

        clock.advance(Duration::from_millis(200));
        state.on_tick();
        assert!(!state.should_shake);
    }

    #[test]
    fn change_challenge_recomputes_targets_and_resets() {
        let (mut state, _clock) = state_with_clock("old");
        state.start();
        state.correct_chars = 3;
        state.current_index = 3;

        state.change_challenge(Challenge {
            id: "next".to_string(),
            title: "Next".to_string(),
            text: "new text".to_string(),
        });

        assert_eq!(state.challenge.id, "next");
        assert_eq!(state.target_chars(), "new text".chars().collect::<Vec<_>>().as_slice());
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.correct_chars, 0);
        assert_eq!(state.current_index, 0);
    }

    #[test]
    fn phase_labels_render_for_the_status_line() {
        assert_eq!(Phase::Idle.to_string(), "Idle");
        assert_eq!(Phase::Typing.to_string(), "Typing");
        assert_eq!(Phase::Finished.to_string(), "Finished");
    }
}
