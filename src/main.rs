use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

use taptempo::app::{Action, App};
use taptempo::challenge::{Catalog, Challenge};
use taptempo::config::{Config, ConfigStore, FileConfigStore};
use taptempo::runtime::{Event, Runner, TerminalEventSource};

const TICK_RATE_MS: u64 = 100;

/// interactive typing-speed trainer with live per-character feedback
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
struct Cli {
    /// challenge id to practice (see --list-challenges)
    #[clap(short = 'c', long)]
    challenge: Option<String>,

    /// custom text to type instead of a catalog entry
    #[clap(short = 'p', long, conflicts_with = "challenge")]
    text: Option<String>,

    /// pick a random catalog entry
    #[clap(long, conflicts_with_all = ["challenge", "text"])]
    random: bool,

    /// reject any keystroke past an uncorrected mistake
    #[clap(long)]
    strict: bool,

    /// accept mistakes and keep going (overrides a saved strict setting)
    #[clap(long, conflicts_with = "strict")]
    relaxed: bool,

    /// compare characters case-sensitively
    #[clap(long)]
    case_sensitive: bool,

    /// print the built-in challenges and exit
    #[clap(long)]
    list_challenges: bool,
}

impl Cli {
    /// Stored settings overridden by whatever was passed on the command
    /// line.
    fn apply_to(&self, stored: Config) -> Config {
        Config {
            challenge_id: self.challenge.clone().or(stored.challenge_id),
            case_sensitive: self.case_sensitive || stored.case_sensitive,
            strict: if self.relaxed {
                false
            } else {
                self.strict || stored.strict
            },
        }
    }
}

fn select_challenge(
    cli: &Cli,
    catalog: &Catalog,
    config: &Config,
) -> Result<Challenge, Box<dyn Error>> {
    if let Some(text) = &cli.text {
        if text.is_empty() {
            return Err("custom text must not be empty".into());
        }
        return Ok(Challenge::custom(text.clone()));
    }
    if cli.random {
        return Ok(catalog.random().clone());
    }
    match &config.challenge_id {
        Some(id) => catalog.by_id(id).cloned().ok_or_else(|| {
            let known = catalog.iter().map(|c| c.id.as_str()).collect::<Vec<_>>();
            format!("unknown challenge '{}' (known: {})", id, known.join(", ")).into()
        }),
        None => Ok(catalog.default_challenge().clone()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let catalog = Catalog::builtin();

    if cli.list_challenges {
        for challenge in catalog.iter() {
            println!("{:<20} {}", challenge.id, challenge.title);
        }
        return Ok(());
    }

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    let _ = store.save(&config);

    let challenge = select_challenge(&cli, &catalog, &config)?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(catalog, challenge, &config);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        TerminalEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            Event::Tick => {
                if app.on_tick() {
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            Event::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            Event::Key(key) => match app.handle_key(key) {
                Action::Quit => break,
                Action::Redraw => {
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
                Action::Continue => {}
            },
        }
    }

    Ok(())
}
