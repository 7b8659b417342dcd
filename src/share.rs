use webbrowser::Browser;

use crate::state::TestState;

/// Snapshot of the values a finished session exposes for sharing. This is
/// the whole payload: the four derived display values plus the progress
/// index.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareSummary {
    pub wpm: f64,
    pub accuracy: u32,
    pub elapsed_secs: f64,
    pub correct_chars: usize,
    pub current_index: usize,
}

impl ShareSummary {
    pub fn from_state(state: &TestState) -> Self {
        Self {
            wpm: state.wpm(),
            accuracy: state.accuracy(),
            elapsed_secs: state.elapsed_time(),
            correct_chars: state.correct_chars,
            current_index: state.current_index,
        }
    }

    /// Tweet-intent URL with the summary percent-encoded inline.
    pub fn tweet_url(&self) -> String {
        format!(
            "https://twitter.com/intent/tweet?text={:.1}%20wpm%20%2F%20{}%25%20acc%20%2F%20{:.1}s%20%2F%20{}%20chars%20({}%20resolved)",
            self.wpm, self.accuracy, self.elapsed_secs, self.correct_chars, self.current_index
        )
    }
}

/// Open the share page if a browser is available; failures are ignored.
pub fn open_share_page(summary: &ShareSummary) {
    if Browser::is_available() {
        webbrowser::open(&summary.tweet_url()).unwrap_or_default();
    }
}
