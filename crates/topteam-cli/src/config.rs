// Configuration loading and parsing (topteam.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use topteam_core::lineup::LineupWeights;
use topteam_core::player::{Position, PositionMap};
use topteam_core::search::SearchOptions;
use topteam_core::squad::SquadRules;
use topteam_fpl::bootstrap::DEFAULT_BOOTSTRAP_URL;
use topteam_fpl::PoolFilter;

pub const CONFIG_FILE: &str = "topteam.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// topteam.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Live `bootstrap-static` document.
    Api,
    /// Historical season CSV plus names CSV.
    Csv,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    #[serde(default = "default_bootstrap_url")]
    pub bootstrap_url: String,
    #[serde(default)]
    pub players_csv: Option<String>,
    #[serde(default)]
    pub names_csv: Option<String>,
}

fn default_bootstrap_url() -> String {
    DEFAULT_BOOTSTRAP_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub points_minimum: i32,
    pub ppg_minimum: f64,
    /// `[GKP, DEF, MID, FWD]`; an empty list keeps every player.
    pub best_per_position: Vec<usize>,
    pub with_status: bool,
    pub cut_dominated: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            points_minimum: 60,
            ppg_minimum: 0.0,
            best_per_position: vec![6, 15, 15, 9],
            with_status: true,
            cut_dominated: true,
        }
    }
}

impl FilterConfig {
    pub fn pool_filter(&self) -> PoolFilter {
        PoolFilter {
            points_minimum: self.points_minimum,
            ppg_minimum: self.ppg_minimum,
            best_per_position: match self.best_per_position[..] {
                [g, d, m, f] => Some(PositionMap::new(g, d, m, f)),
                _ => None,
            },
            require_available: self.with_status,
            cut_dominated: self.cut_dominated,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub trials: usize,
    pub timeout_secs: f64,
    pub captain_multiplier: f64,
    pub bench_multiplier: f64,
    pub pick_lineup: bool,
    pub workers: usize,
    pub seed: Option<u64>,
    /// Player names to lock into every squad.
    pub prefill: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            trials: 10_000,
            timeout_secs: 10.0,
            captain_multiplier: 2.0,
            bench_multiplier: 0.5,
            pick_lineup: true,
            workers: 1,
            seed: None,
            prefill: Vec::new(),
        }
    }
}

impl SearchConfig {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            trials: self.trials,
            timeout: Duration::from_secs_f64(self.timeout_secs),
            weights: LineupWeights {
                captain_multiplier: self.captain_multiplier,
                bench_multiplier: self.bench_multiplier,
            },
            pick_lineup: self.pick_lineup,
            seed: self.seed,
            workers: self.workers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/topteam.toml` relative to `base_dir`.
///
/// Does not copy defaults; `load_config()` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path)
        .map_err(|_| ConfigError::FileNotFound { path: path.clone() })?;
    let config: Config =
        toml::from_str(&text).map_err(|e| ConfigError::ParseError { path, source: e })?;
    validate(&config)?;
    Ok(config)
}

/// Copy files from `defaults/` into `config/` when they are missing there.
/// Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    let copy_err = |message: String| ConfigError::DefaultsCopyError { message };

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_err(format!("failed to create config directory: {e}")))?;
    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_err(format!("failed to read defaults directory: {e}")))?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| copy_err(format!("failed to read defaults entry: {e}")))?;
        let path = entry.path();
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if !path.is_file() {
            continue;
        }

        let target = config_dir.join(file_name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path)
                    .map_err(|e| copy_err(format!("failed to read {}: {e}", path.display())))?;
                std::io::Write::write_all(&mut dest, &content)
                    .map_err(|e| copy_err(format!("failed to write {}: {e}", target.display())))?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(copy_err(format!("failed to create {}: {e}", target.display())));
            }
        }
    }

    Ok(copied)
}

/// Load config relative to the current working directory, copying
/// defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.source.kind == SourceKind::Csv {
        for (field, value) in [
            ("source.players_csv", &config.source.players_csv),
            ("source.names_csv", &config.source.names_csv),
        ] {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                return Err(invalid(field, "required when source.kind = \"csv\""));
            }
        }
    }
    if config.source.kind == SourceKind::Api && config.source.bootstrap_url.trim().is_empty() {
        return Err(invalid("source.bootstrap_url", "must not be empty"));
    }

    let filter = &config.filter;
    if !filter.ppg_minimum.is_finite() {
        return Err(invalid("filter.ppg_minimum", "must be finite"));
    }
    let limits = &filter.best_per_position;
    if !limits.is_empty() {
        if limits.len() != Position::ALL.len() {
            return Err(invalid(
                "filter.best_per_position",
                format!("expected 4 entries [GKP, DEF, MID, FWD] or none, got {}", limits.len()),
            ));
        }
        let quotas = SquadRules::FPL.quotas;
        for (pos, &limit) in Position::ALL.into_iter().zip(limits) {
            if limit < quotas[pos] {
                return Err(invalid(
                    "filter.best_per_position",
                    format!("must keep at least {} {pos}, got {limit}", quotas[pos]),
                ));
            }
        }
    }

    let search = &config.search;
    if search.trials == 0 {
        return Err(invalid("search.trials", "must be > 0"));
    }
    if search.workers == 0 {
        return Err(invalid("search.workers", "must be > 0"));
    }
    if Duration::try_from_secs_f64(search.timeout_secs).is_err() {
        return Err(invalid(
            "search.timeout_secs",
            format!("must be a non-negative duration, got {}", search.timeout_secs),
        ));
    }
    if !search.captain_multiplier.is_finite() || search.captain_multiplier < 1.0 {
        return Err(invalid(
            "search.captain_multiplier",
            format!("must be >= 1.0, got {}", search.captain_multiplier),
        ));
    }
    if !(0.0..=1.0).contains(&search.bench_multiplier) {
        return Err(invalid(
            "search.bench_multiplier",
            format!("must be between 0.0 and 1.0 inclusive, got {}", search.bench_multiplier),
        ));
    }
    let squad_size = SquadRules::FPL.squad_size();
    if search.prefill.len() > squad_size {
        return Err(invalid(
            "search.prefill",
            format!("at most {squad_size} players, got {}", search.prefill.len()),
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
