mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use lianzi::{
    board::GRID_SIDE,
    celebration::Celebration,
    config::{ConfigError, FileSettingsStore, GameConfig, Settings, SettingsStore},
    corpus::Corpus,
    game::{Game, Outcome, Phase, RoundReport},
    runtime::{CrosstermEventSource, Event, FixedTicker, Runner},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};
use webbrowser::Browser;

const TICK_RATE_MS: u64 = 250;
/// Runner ticks per game-clock second.
const TICKS_PER_SECOND: u64 = 1000 / TICK_RATE_MS;
/// How long judged cells stay highlighted, in runner ticks.
const FLASH_TICKS: u8 = TICKS_PER_SECOND as u8;

/// Keyboard map for the 4x4 board, row by row.
pub const KEY_GRID: [[char; GRID_SIDE]; GRID_SIDE] = [
    ['1', '2', '3', '4'],
    ['q', 'w', 'e', 'r'],
    ['a', 's', 'd', 'f'],
    ['z', 'x', 'c', 'v'],
];

pub fn cell_for_key(key: char) -> Option<usize> {
    let key = key.to_ascii_lowercase();
    KEY_GRID.iter().enumerate().find_map(|(row, keys)| {
        keys.iter()
            .position(|&k| k == key)
            .map(|col| row * GRID_SIDE + col)
    })
}

/// timed idiom-matching puzzle tui
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Find the hidden four-character idiom on a 4x4 board and pick its characters in order before the clock runs out. Correct picks pay out, mistakes and skips cost, and the score decays every second."
)]
pub struct Cli {
    /// seconds on the round clock (persisted as the new default)
    #[clap(short = 's', long)]
    seconds: Option<u32>,

    /// idiom corpus to draw targets from (persisted as the new default)
    #[clap(short = 'c', long, value_enum)]
    corpus: Option<SupportedCorpus>,

    /// seed the board shuffle for a reproducible session
    #[clap(long)]
    seed: Option<u64>,

    /// starting score
    #[clap(long, default_value_t = 1000.0)]
    initial_score: f64,

    /// points gained on a correct match
    #[clap(long, default_value_t = 50.0)]
    correct_bonus: f64,

    /// points lost on a wrong match
    #[clap(long, default_value_t = 100.0)]
    wrong_penalty: f64,

    /// points lost when skipping a board
    #[clap(long, default_value_t = 30.0)]
    skip_penalty: f64,

    /// points drained every second
    #[clap(long, default_value_t = 0.5)]
    decay_rate: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum SupportedCorpus {
    Classic,
    Extended,
}

impl SupportedCorpus {
    fn as_corpus(&self) -> Result<Corpus, ConfigError> {
        Corpus::load(&self.to_string().to_lowercase())
    }
}

impl Cli {
    /// Assemble the session tunables; `seconds` comes from settings so the
    /// persisted preference survives launches without the flag.
    fn to_game_config(&self, seconds: u32) -> GameConfig {
        GameConfig {
            initial_score: self.initial_score,
            time_limit: seconds,
            correct_bonus: self.correct_bonus,
            wrong_penalty: self.wrong_penalty,
            skip_penalty: self.skip_penalty,
            decay_rate: self.decay_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    Summary,
}

/// Deferred highlight of the judged board. The game has already dealt the
/// next board; this snapshot only drives rendering for a moment.
#[derive(Debug, Clone)]
pub struct Flash {
    pub report: RoundReport,
    pub ticks_left: u8,
}

pub struct App {
    pub cli: Option<Cli>,
    pub settings: Settings,
    pub game: Game,
    pub celebration: Celebration,
    pub state: AppState,
    pub flash: Option<Flash>,
    pub reveal_all: bool,
    subticks: u64,
}

impl App {
    pub fn new(cli: Cli, settings: Settings) -> Result<Self, ConfigError> {
        let corpus = Corpus::load(&settings.corpus)?;
        let config = cli.to_game_config(settings.seconds);
        let rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut game = Game::new(corpus, config, rng)?;
        game.start();

        Ok(Self {
            cli: Some(cli),
            settings,
            game,
            celebration: Celebration::default(),
            state: AppState::Playing,
            flash: None,
            reveal_all: false,
            subticks: 0,
        })
    }

    /// A restart is a brand-new session; nothing from the finished game
    /// carries over.
    pub fn reset(&mut self) {
        let cli = self.cli.clone().unwrap();
        let settings = self.settings.clone();
        *self = App::new(cli, settings).expect("inputs were validated at startup");
    }

    /// One runner tick: advance animations, count down the flash, and
    /// forward a whole game second when enough subticks accumulated.
    pub fn on_tick(&mut self) {
        self.subticks = self.subticks.wrapping_add(1);

        if let Some(flash) = self.flash.as_mut() {
            flash.ticks_left = flash.ticks_left.saturating_sub(1);
            if flash.ticks_left == 0 {
                self.flash = None;
            }
        }

        self.celebration.update();

        if self.state == AppState::Playing && self.subticks % TICKS_PER_SECOND == 0
            && self.game.on_tick()
        {
            self.state = AppState::Summary;
        }
    }

    pub fn pick_key(&mut self, key: char, width: u16, height: u16) {
        let Some(index) = cell_for_key(key) else {
            return;
        };
        if let Some(report) = self.game.select_cell(index) {
            if report.outcome == Outcome::Correct {
                self.celebration.start(width, height, &report.target);
            }
            self.flash = Some(Flash {
                report,
                ticks_left: FLASH_TICKS,
            });
        }
    }

    pub fn skip(&mut self) {
        if self.game.skip() {
            self.flash = None;
        }
    }

    pub fn end_round(&mut self) {
        self.game.end();
        if self.game.phase() == Phase::Ended {
            self.state = AppState::Summary;
        }
    }

    pub fn share(&self) {
        if let Some(summary) = self.game.summary() {
            if Browser::is_available() {
                webbrowser::open(&format!(
                    "https://twitter.com/intent/tweet?text=lianzi%20{}%20pts%20%2F%20top%20{}%25%20of%20idiom%20matchers",
                    summary.final_score, summary.rank
                ))
                .unwrap_or_default();
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileSettingsStore::new();
    let mut settings = store.load();
    if let Some(seconds) = cli.seconds {
        settings.seconds = seconds;
    }
    if let Some(corpus) = cli.corpus {
        settings.corpus = corpus.to_string().to_lowercase();
    }
    let _ = store.save(&settings);

    let mut app = match App::new(cli, settings) {
        Ok(app) => app,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, e).exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_session(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_session<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            Event::Tick => {
                app.on_tick();
            }
            Event::Resize => {}
            Event::Key(key) => {
                match app.state {
                    AppState::Playing => match key.code {
                        KeyCode::Esc => app.end_round(),
                        KeyCode::Char(' ') => app.skip(),
                        KeyCode::Char(c) => {
                            if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'c' {
                                break;
                            }
                            let size = terminal.size().unwrap_or_default();
                            app.pick_key(c, size.width, size.height);
                        }
                        _ => {}
                    },
                    AppState::Summary => match key.code {
                        KeyCode::Esc => break,
                        KeyCode::Char('c')
                            if key.modifiers.contains(KeyModifiers::CONTROL) =>
                        {
                            break;
                        }
                        KeyCode::Char('r') => app.reset(),
                        KeyCode::Char('a') => app.reveal_all = !app.reveal_all,
                        KeyCode::Char('t') => app.share(),
                        _ => {}
                    },
                }
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn test_cli() -> Cli {
        Cli::parse_from(["lianzi"])
    }

    fn test_app() -> App {
        let cli = Cli::parse_from(["lianzi", "--seed", "17"]);
        App::new(cli, Settings::default()).unwrap()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = test_cli();

        assert_eq!(cli.seconds, None);
        assert_eq!(cli.corpus, None);
        assert_eq!(cli.seed, None);
        assert_eq!(cli.initial_score, 1000.0);
        assert_eq!(cli.correct_bonus, 50.0);
        assert_eq!(cli.wrong_penalty, 100.0);
        assert_eq!(cli.skip_penalty, 30.0);
        assert_eq!(cli.decay_rate, 0.5);
    }

    #[test]
    fn test_cli_seconds_flag() {
        let cli = Cli::parse_from(["lianzi", "-s", "90"]);
        assert_eq!(cli.seconds, Some(90));

        let cli = Cli::parse_from(["lianzi", "--seconds", "45"]);
        assert_eq!(cli.seconds, Some(45));
    }

    #[test]
    fn test_cli_corpus_flag() {
        let cli = Cli::parse_from(["lianzi", "-c", "classic"]);
        assert_eq!(cli.corpus, Some(SupportedCorpus::Classic));

        let cli = Cli::parse_from(["lianzi", "--corpus", "extended"]);
        assert_eq!(cli.corpus, Some(SupportedCorpus::Extended));
    }

    #[test]
    fn test_cli_scoring_flags() {
        let cli = Cli::parse_from([
            "lianzi",
            "--initial-score",
            "500",
            "--correct-bonus",
            "25",
            "--wrong-penalty",
            "75",
            "--skip-penalty",
            "10",
            "--decay-rate",
            "1.5",
        ]);

        let config = cli.to_game_config(60);
        assert_eq!(config.initial_score, 500.0);
        assert_eq!(config.time_limit, 60);
        assert_eq!(config.correct_bonus, 25.0);
        assert_eq!(config.wrong_penalty, 75.0);
        assert_eq!(config.skip_penalty, 10.0);
        assert_eq!(config.decay_rate, 1.5);
    }

    #[test]
    fn test_supported_corpus_loads_by_display_name() {
        let classic = SupportedCorpus::Classic.as_corpus().unwrap();
        assert_eq!(classic.name, "classic");

        let extended = SupportedCorpus::Extended.as_corpus().unwrap();
        assert_eq!(extended.name, "extended");
    }

    #[test]
    fn test_supported_corpus_display() {
        assert_eq!(SupportedCorpus::Classic.to_string(), "Classic");
        assert_eq!(SupportedCorpus::Extended.to_string(), "Extended");
    }

    #[test]
    fn test_key_grid_maps_every_cell_once() {
        let mut seen = vec![false; 16];
        for row in KEY_GRID {
            for key in row {
                let index = cell_for_key(key).unwrap();
                assert!(!seen[index], "key {key} mapped twice");
                seen[index] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_key_mapping_corners_and_case() {
        assert_eq!(cell_for_key('1'), Some(0));
        assert_eq!(cell_for_key('4'), Some(3));
        assert_eq!(cell_for_key('z'), Some(12));
        assert_eq!(cell_for_key('v'), Some(15));
        assert_eq!(cell_for_key('Q'), Some(4));
        assert_eq!(cell_for_key('p'), None);
        assert_eq!(cell_for_key(' '), None);
    }

    #[test]
    fn test_app_starts_playing_with_a_dealt_board() {
        let app = test_app();

        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.game.phase(), Phase::Playing);
        assert!(app.game.board().is_some());
        assert_eq!(app.game.display_score(), 1000);
        assert_eq!(app.game.time_left(), 30);
        assert!(app.flash.is_none());
    }

    #[test]
    fn test_app_rejects_invalid_tunables() {
        let cli = Cli::parse_from(["lianzi", "--decay-rate", "0"]);
        let result = App::new(cli, Settings::default());
        assert_eq!(result.err(), Some(ConfigError::NonPositive("decay rate")));
    }

    #[test]
    fn test_app_rejects_unknown_corpus_in_settings() {
        let settings = Settings {
            seconds: 30,
            corpus: "bogus".into(),
        };
        let result = App::new(test_cli(), settings);
        assert_eq!(result.err(), Some(ConfigError::UnknownCorpus("bogus".into())));
    }

    #[test]
    fn test_subticks_drive_whole_game_seconds() {
        let mut app = test_app();

        for _ in 0..TICKS_PER_SECOND - 1 {
            app.on_tick();
        }
        assert_eq!(app.game.time_left(), 30);

        app.on_tick();
        assert_eq!(app.game.time_left(), 29);

        for _ in 0..TICKS_PER_SECOND * 3 {
            app.on_tick();
        }
        assert_eq!(app.game.time_left(), 26);
    }

    #[test]
    fn test_session_reaches_summary_when_time_runs_out() {
        let mut app = test_app();

        for _ in 0..TICKS_PER_SECOND * 30 {
            app.on_tick();
        }

        assert_eq!(app.state, AppState::Summary);
        assert_eq!(app.game.phase(), Phase::Ended);
        assert!(app.game.summary().is_some());
    }

    #[test]
    fn test_correct_pick_flashes_and_celebrates() {
        let mut app = test_app();
        let answer = *app.game.board().unwrap().answer();

        for &pos in &answer {
            let key = KEY_GRID[pos / GRID_SIDE][pos % GRID_SIDE];
            app.pick_key(key, 80, 24);
        }

        let flash = app.flash.as_ref().expect("evaluation should flash");
        assert_eq!(flash.report.outcome, Outcome::Correct);
        assert_eq!(flash.ticks_left, FLASH_TICKS);
        assert!(app.celebration.is_active);
        assert_eq!(app.game.solved().len(), 1);
    }

    #[test]
    fn test_flash_expires_after_its_window() {
        let mut app = test_app();
        let answer = *app.game.board().unwrap().answer();
        for &pos in &answer {
            let key = KEY_GRID[pos / GRID_SIDE][pos % GRID_SIDE];
            app.pick_key(key, 80, 24);
        }
        assert!(app.flash.is_some());

        for _ in 0..FLASH_TICKS {
            app.on_tick();
        }
        assert!(app.flash.is_none());
    }

    #[test]
    fn test_skip_clears_any_flash() {
        let mut app = test_app();
        let answer = *app.game.board().unwrap().answer();
        for &pos in &answer {
            let key = KEY_GRID[pos / GRID_SIDE][pos % GRID_SIDE];
            app.pick_key(key, 80, 24);
        }
        assert!(app.flash.is_some());

        app.skip();
        assert!(app.flash.is_none());
        assert_eq!(app.game.display_score(), 1020); // 1000 + 50 - 30
    }

    #[test]
    fn test_end_round_jumps_to_summary() {
        let mut app = test_app();

        app.end_round();
        assert_eq!(app.state, AppState::Summary);
        assert!(app.game.summary().is_some());
    }

    #[test]
    fn test_reset_builds_a_fresh_session() {
        let mut app = test_app();
        let answer = *app.game.board().unwrap().answer();
        for &pos in &answer {
            let key = KEY_GRID[pos / GRID_SIDE][pos % GRID_SIDE];
            app.pick_key(key, 80, 24);
        }
        app.end_round();
        assert!(!app.game.solved().is_empty());

        app.reset();
        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.game.phase(), Phase::Playing);
        assert!(app.game.solved().is_empty());
        assert_eq!(app.game.display_score(), 1000);
        assert_eq!(app.game.time_left(), 30);
        assert!(app.flash.is_none());
    }

    #[test]
    fn test_reveal_toggle_defaults_off() {
        let app = test_app();
        assert!(!app.reveal_all);
    }
}
