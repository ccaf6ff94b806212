//! K4 Config: run configuration and dictionary loading
//!
//! Settings live in a YAML or JSON file (picked by extension). Every field has
//! a default, so a partial file or no file at all is a valid configuration.
//! Command-line flags are applied on top by the binary.

pub mod wordlist;

pub use wordlist::WordlistFile;

use k4_core::{Alphabet, OutputCase, PrimerRange};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid setting: {0}")]
    Invalid(String),

    #[error(transparent)]
    Core(#[from] k4_core::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Batch sizing and worker pool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Keywords per Vigenère batch
    pub keyword_batch_size: usize,
    /// Primers per Gromark batch
    pub primer_batch_size: usize,
    /// Fixed worker count; `None` sizes the pool from the CPU count
    pub workers: Option<usize>,
    /// Cores left free when sizing the pool automatically
    pub reserved_cores: usize,
    pub primer_start: u32,
    pub primer_end: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        let primers = PrimerRange::full();
        Self {
            keyword_batch_size: 500,
            primer_batch_size: 1000,
            workers: None,
            reserved_cores: 1,
            primer_start: primers.start(),
            primer_end: primers.end(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionarySettings {
    pub path: Option<PathBuf>,
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for DictionarySettings {
    fn default() -> Self {
        Self {
            path: None,
            min_len: 3,
            max_len: 15,
        }
    }
}

/// Statistical acceptance band. Unset bounds are not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub ic_min: Option<f64>,
    pub ic_max: Option<f64>,
    /// Mean per-letter deviation from English must stay below this
    pub max_deviation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct K4Config {
    pub search: SearchSettings,
    pub dictionary: DictionarySettings,
    pub scoring: ScoringSettings,
    /// Alphabets to sweep, one search per entry
    pub alphabets: Vec<String>,
    pub output_case: OutputCase,
}

impl Default for K4Config {
    fn default() -> Self {
        Self {
            search: SearchSettings::default(),
            dictionary: DictionarySettings::default(),
            scoring: ScoringSettings::default(),
            alphabets: vec![k4_core::alphabet::STANDARD.to_string()],
            output_case: OutputCase::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
            Some(ext) if ext == "yaml" || ext == "yml" => Ok(Format::Yaml),
            Some(ext) if ext == "json" => Ok(Format::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl K4Config {
    /// `~/.config/k4/config.yaml` (platform config dir)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("k4")
            .join("config.yaml")
    }

    /// Load from `path`; the file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let config: Self = match format {
            Format::Yaml => serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))?,
            Format::Json => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?,
        };

        config.validate()?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `path`, or defaults when nothing is there.
    pub fn load_optional(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// An explicit path must exist; otherwise the default location is tried.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::load_optional(&Self::default_path()),
        }
    }

    /// Save to `path`, format by extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match Format::of(path)? {
            Format::Yaml => serde_yaml::to_string(self)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?,
            Format::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?,
        };

        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        // Write to temp file first, then rename
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, content).map_err(io_err)?;
        std::fs::rename(&temp_path, path).map_err(io_err)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.keyword_batch_size == 0 || self.search.primer_batch_size == 0 {
            return Err(ConfigError::Invalid("batch sizes must be at least 1".into()));
        }
        if self.search.workers == Some(0) {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.dictionary.min_len > self.dictionary.max_len {
            return Err(ConfigError::Invalid(format!(
                "dictionary min_len {} exceeds max_len {}",
                self.dictionary.min_len, self.dictionary.max_len
            )));
        }
        if let (Some(lo), Some(hi)) = (self.scoring.ic_min, self.scoring.ic_max) {
            if lo > hi {
                return Err(ConfigError::Invalid(format!("ic_min {lo} exceeds ic_max {hi}")));
            }
        }
        if self.alphabets.is_empty() {
            return Err(ConfigError::Invalid("at least one alphabet is required".into()));
        }
        self.primer_range()?;
        self.parsed_alphabets()?;
        Ok(())
    }

    pub fn primer_range(&self) -> Result<PrimerRange> {
        Ok(PrimerRange::new(self.search.primer_start, self.search.primer_end)?)
    }

    /// Configured alphabets, upper-cased and checked.
    pub fn parsed_alphabets(&self) -> Result<Vec<Alphabet>> {
        self.alphabets
            .iter()
            .map(|a| Alphabet::parse(a).map_err(ConfigError::from))
            .collect()
    }
}
