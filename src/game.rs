use rand::rngs::StdRng;
use rand::Rng;

use crate::board::{Board, CellFlag, GRID_CELLS};
use crate::clock::ScoreClock;
use crate::config::{ConfigError, GameConfig};
use crate::corpus::Corpus;
use crate::selection::{Selection, Toggle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Wrong,
}

/// Emitted when a fourth pick completes a selection. Carries a snapshot of
/// the judged board and picks so presentation sinks can flash correct/wrong
/// flags on their own schedule; by the time this report exists the game has
/// already dealt the next board.
#[derive(Clone, Debug)]
pub struct RoundReport {
    pub outcome: Outcome,
    pub target: String,
    pub picks: Vec<usize>,
    pub chars: [char; GRID_CELLS],
}

/// Exposed once the session ends. `rank` is a simulated global percentile,
/// not a real ranking.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// Floored, unclamped; can be negative after a bad run.
    pub final_score: i64,
    pub solved: Vec<String>,
    /// Every idiom dealt this session, duplicates included.
    pub shown: Vec<String>,
    pub rank: u8,
}

/// One game session. Owns every piece of authoritative state; all mutation
/// arrives through `start` / `select_cell` / `skip` / `on_tick` / `end`,
/// which keeps it single-threaded and serialized by construction. A session
/// that has ended stays ended; restarting means constructing a new `Game`.
pub struct Game {
    corpus: Corpus,
    rng: StdRng,
    phase: Phase,
    board: Option<Board>,
    selection: Selection,
    clock: ScoreClock,
    solved: Vec<String>,
    shown: Vec<String>,
    summary: Option<Summary>,
}

impl Game {
    /// Validates the config up front; the corpus was already validated at
    /// its own construction. After this, no operation can fail.
    pub fn new(corpus: Corpus, config: GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            corpus,
            rng,
            phase: Phase::Idle,
            board: None,
            selection: Selection::new(),
            clock: ScoreClock::new(config),
            solved: Vec::new(),
            shown: Vec::new(),
            summary: None,
        })
    }

    /// Deal the first board and start accepting input. Calling this on a
    /// session that already started (or ended) is a no-op.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Playing;
        self.deal();
    }

    /// Toggle a cell. A fourth distinct pick triggers evaluation
    /// synchronously: the score settles, history updates, a fresh board is
    /// dealt, and the report of what happened comes back. Out-of-range
    /// references and calls outside Playing are ignored without state
    /// change.
    pub fn select_cell(&mut self, index: usize) -> Option<RoundReport> {
        if self.phase != Phase::Playing || index >= GRID_CELLS {
            return None;
        }
        self.board.as_ref()?;

        match self.selection.toggle(index) {
            Toggle::Added => {
                if let Some(board) = self.board.as_mut() {
                    board.set_flag(index, CellFlag::Selected);
                }
                None
            }
            Toggle::Removed => {
                if let Some(board) = self.board.as_mut() {
                    board.set_flag(index, CellFlag::Clear);
                }
                None
            }
            Toggle::Ignored => None,
            Toggle::Filled => self.evaluate(),
        }
    }

    fn evaluate(&mut self) -> Option<RoundReport> {
        let board = self.board.take()?;
        let picks = self.selection.picks().to_vec();

        let outcome = if board.is_match(&picks) {
            Outcome::Correct
        } else {
            Outcome::Wrong
        };
        let target = board.target().to_string();

        match outcome {
            Outcome::Correct => {
                self.clock.apply_correct();
                self.solved.push(target.clone());
            }
            Outcome::Wrong => self.clock.apply_wrong(),
        }

        self.selection.clear();
        self.deal();

        Some(RoundReport {
            outcome,
            target,
            picks,
            chars: board.chars(),
        })
    }

    /// Give up on the current board: one penalty, one fresh deal.
    pub fn skip(&mut self) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        self.clock.apply_skip();
        self.selection.clear();
        self.deal();
        true
    }

    /// Forward one second from the external tick source. Returns true when
    /// this tick ended the session.
    pub fn on_tick(&mut self) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        self.clock.tick();
        if self.clock.expired() {
            self.finish();
            return true;
        }
        false
    }

    /// End the session early. The score never ends a session, however far
    /// negative it runs; only timer expiry and this explicit call do.
    pub fn end(&mut self) {
        if self.phase == Phase::Playing {
            self.finish();
        }
    }

    fn deal(&mut self) {
        let board = Board::deal(&self.corpus, &mut self.rng);
        self.shown.push(board.target().to_string());
        self.board = Some(board);
    }

    fn finish(&mut self) {
        self.phase = Phase::Ended;
        let rank = self.rng.gen_range(0..100);
        self.summary = Some(Summary {
            final_score: self.clock.final_score(),
            solved: self.solved.clone(),
            shown: self.shown.clone(),
            rank,
        });
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn display_score(&self) -> i64 {
        self.clock.display_score()
    }

    pub fn score(&self) -> f64 {
        self.clock.score()
    }

    pub fn time_left(&self) -> u32 {
        self.clock.time_left()
    }

    pub fn solved(&self) -> &[String] {
        &self.solved
    }

    pub fn shown(&self) -> &[String] {
        &self.shown
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }
}
