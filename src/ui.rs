use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Screen};
use crate::engine::{self, CharStatus};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen {
            Screen::Test => render_test(self, area, buf),
            Screen::Results => render_results(self, area, buf),
        }
    }
}

fn status_style(status: CharStatus) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match status {
        CharStatus::Correct => bold.fg(Color::Green),
        CharStatus::Incorrect => bold.fg(Color::Red),
        CharStatus::Cursor => bold.add_modifier(Modifier::DIM | Modifier::UNDERLINED),
        CharStatus::Pending => bold.add_modifier(Modifier::DIM),
    }
}

/// Reference text as styled spans; consecutive characters with the same
/// status collapse into one span.
fn prompt_spans(app: &App) -> Vec<Span<'static>> {
    let annotated = engine::annotate(&app.state);

    let mut spans = Vec::new();
    for (status, run) in &annotated.iter().chunk_by(|&&(_, status)| status) {
        let text: String = run
            .map(|&(c, _)| match (c, status) {
                // make a mistyped space visible
                (' ', CharStatus::Incorrect) => '·',
                (c, _) => c,
            })
            .collect();
        spans.push(Span::styled(text, status_style(status)));
    }
    spans
}

fn render_test(app: &App, area: Rect, buf: &mut Buffer) {
    let state = &app.state;

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
    let red_bold_style = bold_style.fg(Color::Red);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_width = state.challenge.text.width();
    let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        (prompt_width as f64 / max_chars_per_line as f64).ceil() as u16 + 1
    };

    let top_padding = (area.height.saturating_sub(prompt_occupied_lines + 3)) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(top_padding),
                Constraint::Length(2),
                Constraint::Length(prompt_occupied_lines),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);

    // the whole header flashes red while the error pulse is up
    let header_style = if state.should_shake {
        red_bold_style
    } else {
        dim_bold_style
    };
    let header = Paragraph::new(Span::styled(
        format!(
            "{}  ·  {:.0} wpm  ·  {}% acc  ·  {:.1}s  ·  {}",
            state.challenge.title,
            state.wpm(),
            state.accuracy(),
            state.elapsed_time(),
            state.phase(),
        ),
        header_style,
    ))
    .alignment(Alignment::Center);
    header.render(chunks[1], buf);

    let prompt = Paragraph::new(Line::from(prompt_spans(app)))
        .alignment(if prompt_occupied_lines == 1 {
            // a single centered line gives a nice zen feeling
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    prompt.render(chunks[2], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let state = &app.state;

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default()
        .add_modifier(Modifier::ITALIC)
        .fg(Color::Gray);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let title = Paragraph::new(Span::styled(state.challenge.title.clone(), bold_style))
        .alignment(Alignment::Center);
    title.render(chunks[1], buf);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{:.0} wpm   {}% acc   {:.1}s   {}/{} chars",
            state.wpm(),
            state.accuracy(),
            state.elapsed_time(),
            state.correct_chars,
            state.target_chars().len(),
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[2], buf);

    let legend = Paragraph::new(Span::styled(
        "(r)etry / (n)ext / (t)weet / (esc)ape",
        italic_style,
    ))
    .alignment(Alignment::Center);
    legend.render(chunks[4], buf);
}
