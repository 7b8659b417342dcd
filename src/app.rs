use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::challenge::{Catalog, Challenge};
use crate::config::Config;
use crate::engine;
use crate::share::{self, ShareSummary};
use crate::state::TestState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Test,
    Results,
}

/// What the key handler asked the outer loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Redraw,
    Quit,
}

/// Host-side state: the session, the echo buffer the user is editing, and
/// the active screen.
#[derive(Debug)]
pub struct App {
    pub catalog: Catalog,
    pub state: TestState,
    /// The text-input widget's buffer. Reconciled to `state.user_input`
    /// after every forward, since under strict truncation the engine's
    /// echo state is authoritative.
    pub input_buffer: String,
    pub screen: Screen,
}

impl App {
    pub fn new(catalog: Catalog, challenge: Challenge, config: &Config) -> Self {
        let mut state = TestState::new(challenge);
        state.case_sensitive = config.case_sensitive;
        state.strict_mode = config.strict;

        Self {
            catalog,
            state,
            input_buffer: String::new(),
            screen: Screen::Test,
        }
    }

    fn forward_buffer(&mut self) {
        engine::process_input(&self.input_buffer, &mut self.state);
        if !self.input_buffer.is_empty() {
            self.input_buffer = self.state.user_input.clone();
        }
        if self.state.has_finished() {
            self.screen = Screen::Results;
        }
    }

    pub fn type_char(&mut self, c: char) {
        if self.state.has_finished() {
            return;
        }
        self.input_buffer.push(c);
        self.forward_buffer();
    }

    pub fn backspace(&mut self) {
        if self.state.has_finished() {
            return;
        }
        self.input_buffer.pop();
        self.forward_buffer();
    }

    /// Retry the current challenge from scratch.
    pub fn restart(&mut self) {
        self.state.reset();
        self.input_buffer.clear();
        self.screen = Screen::Test;
    }

    /// Move to the next catalog entry (wrapping).
    pub fn next_challenge(&mut self) {
        let next = self.catalog.next_after(&self.state.challenge.id).clone();
        self.swap_challenge(next);
    }

    pub fn random_challenge(&mut self) {
        let pick = self.catalog.random().clone();
        self.swap_challenge(pick);
    }

    fn swap_challenge(&mut self, challenge: Challenge) {
        self.state.change_challenge(challenge);
        self.input_buffer.clear();
        self.screen = Screen::Test;
    }

    /// Tick handler; returns whether the screen needs a redraw (live timer
    /// while typing, or the shake pulse changing state).
    pub fn on_tick(&mut self) -> bool {
        let was_shaking = self.state.should_shake;
        self.state.on_tick();
        self.state.typing || was_shaking || self.state.should_shake
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match self.screen {
            Screen::Test => match key.code {
                KeyCode::Esc => Action::Quit,
                KeyCode::Left => {
                    self.restart();
                    Action::Redraw
                }
                KeyCode::Right => {
                    self.next_challenge();
                    Action::Redraw
                }
                KeyCode::Backspace => {
                    self.backspace();
                    Action::Redraw
                }
                KeyCode::Char(c) => {
                    self.type_char(c);
                    Action::Redraw
                }
                _ => Action::Continue,
            },
            Screen::Results => match key.code {
                KeyCode::Esc => Action::Quit,
                KeyCode::Char('r') => {
                    self.restart();
                    Action::Redraw
                }
                KeyCode::Char('n') => {
                    self.next_challenge();
                    Action::Redraw
                }
                KeyCode::Char('t') => {
                    share::open_share_page(&ShareSummary::from_state(&self.state));
                    Action::Continue
                }
                _ => Action::Continue,
            },
        }
    }
}
