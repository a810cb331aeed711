use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Construction-time failure. The core has no recoverable runtime errors;
/// everything that can go wrong is rejected before a session exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A tunable that must be positive was zero or negative.
    NonPositive(&'static str),
    /// The corpus contains no idioms.
    EmptyCorpus,
    /// The filler alphabet contains no characters.
    EmptyFillers,
    /// A corpus entry was not four single characters.
    MalformedIdiom(String),
    /// No embedded corpus with this name.
    UnknownCorpus(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive(field) => {
                write!(f, "{field} must be a positive value")
            }
            ConfigError::EmptyCorpus => write!(f, "corpus contains no idioms"),
            ConfigError::EmptyFillers => write!(f, "filler alphabet is empty"),
            ConfigError::MalformedIdiom(entry) => {
                write!(f, "idiom entry '{entry}' is not four single characters")
            }
            ConfigError::UnknownCorpus(name) => write!(f, "no built-in corpus named '{name}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Scoring and timing tunables for one session. All values are required and
/// must be positive; `Default` is the classic balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub initial_score: f64,
    /// Whole seconds on the round clock.
    pub time_limit: u32,
    pub correct_bonus: f64,
    pub wrong_penalty: f64,
    pub skip_penalty: f64,
    /// Points drained on every clock tick, independent of player action.
    pub decay_rate: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_score: 1000.0,
            time_limit: 30,
            correct_bonus: 50.0,
            wrong_penalty: 100.0,
            skip_penalty: 30.0,
            decay_rate: 0.5,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_score <= 0.0 {
            return Err(ConfigError::NonPositive("initial score"));
        }
        if self.time_limit == 0 {
            return Err(ConfigError::NonPositive("time limit"));
        }
        if self.correct_bonus <= 0.0 {
            return Err(ConfigError::NonPositive("correct bonus"));
        }
        if self.wrong_penalty <= 0.0 {
            return Err(ConfigError::NonPositive("wrong penalty"));
        }
        if self.skip_penalty <= 0.0 {
            return Err(ConfigError::NonPositive("skip penalty"));
        }
        if self.decay_rate <= 0.0 {
            return Err(ConfigError::NonPositive("decay rate"));
        }
        Ok(())
    }
}

/// Player preferences that survive between launches. Session state (score,
/// history) is deliberately never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub seconds: u32,
    pub corpus: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seconds: 30,
            corpus: "classic".to_string(),
        }
    }
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "lianzi") {
            pd.config_dir().join("settings.json")
        } else {
            PathBuf::from("lianzi_settings.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(settings) = serde_json::from_slice::<Settings>(&bytes) {
                return settings;
            }
        }
        Settings::default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
