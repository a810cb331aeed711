use crate::config::GameConfig;

/// Owns the session score and countdown. Every operation is a plain
/// mutation with a fixed delta from the config; the controller decides
/// when each one fires.
#[derive(Clone, Debug)]
pub struct ScoreClock {
    score: f64,
    time_left: u32,
    config: GameConfig,
}

impl ScoreClock {
    pub fn new(config: GameConfig) -> Self {
        Self {
            score: config.initial_score,
            time_left: config.time_limit,
            config,
        }
    }

    /// One external second has passed: count down and decay.
    pub fn tick(&mut self) {
        self.time_left = self.time_left.saturating_sub(1);
        self.score -= self.config.decay_rate;
    }

    pub fn apply_correct(&mut self) {
        self.score += self.config.correct_bonus;
    }

    pub fn apply_wrong(&mut self) {
        self.score -= self.config.wrong_penalty;
    }

    pub fn apply_skip(&mut self) {
        self.score -= self.config.skip_penalty;
    }

    /// Internal score, unclamped; may go negative. Session end is governed
    /// by the countdown alone, never by this value.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Presentation value: floored and clamped at zero. The clamp is
    /// cosmetic only.
    pub fn display_score(&self) -> i64 {
        (self.score.floor() as i64).max(0)
    }

    /// End-of-session value: floored, not clamped.
    pub fn final_score(&self) -> i64 {
        self.score.floor() as i64
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn expired(&self) -> bool {
        self.time_left == 0
    }
}
