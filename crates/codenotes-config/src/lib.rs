use codenotes_engine::convert::ListGrouping;
use codenotes_engine::paste::DEFAULT_PASTE_LIMIT;
use codenotes_engine::persistence::{AutosaveConfig, NoteField, RetryPolicy, StorageFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid note pattern `{pattern}`: {source}")]
    InvalidNotePattern {
        pattern: String,
        source: glob::PatternError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub notes_path: PathBuf,

    /// Glob patterns, relative to `notes_path`, selecting the note files
    #[serde(default = "default_note_patterns")]
    pub note_patterns: Vec<String>,

    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub autosave_delay_ms: u64,
    pub paste_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: 500,
            paste_limit: DEFAULT_PASTE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub notes: StorageFormat,
    pub solution: StorageFormat,
    pub list_grouping: ListGrouping,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            notes: NoteField::Notes.default_format(),
            solution: NoteField::Solution.default_format(),
            list_grouping: ListGrouping::default(),
        }
    }
}

fn default_note_patterns() -> Vec<String> {
    ["**/*.json", "**/*.html", "**/*.txt"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// Compiled `note_patterns`.
#[derive(Debug, Clone)]
pub struct NoteMatcher {
    patterns: Vec<glob::Pattern>,
}

impl NoteMatcher {
    /// True when the notes-relative `path` matches any pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

impl Config {
    pub fn new(notes_path: impl Into<PathBuf>) -> Self {
        Self {
            notes_path: notes_path.into(),
            note_patterns: default_note_patterns(),
            editor: EditorConfig::default(),
            retry: RetryConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded config path
        config.notes_path = Self::expand_path(&config.notes_path).unwrap_or(config.notes_path);
        config.note_matcher()?;

        log::debug!("Loaded config from {}", config_path.display());
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/codenotes");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn note_matcher(&self) -> Result<NoteMatcher, ConfigError> {
        let patterns = self
            .note_patterns
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|source| ConfigError::InvalidNotePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(NoteMatcher { patterns })
    }

    pub fn autosave(&self) -> AutosaveConfig {
        AutosaveConfig {
            delay: Duration::from_millis(self.editor.autosave_delay_ms),
            retry: RetryPolicy {
                max_attempts: self.retry.max_attempts.max(1),
                base_delay: Duration::from_millis(self.retry.base_delay_ms),
                max_delay: Duration::from_millis(self.retry.max_delay_ms),
                ..RetryPolicy::default()
            },
        }
    }

    pub fn storage_format(&self, field: NoteField) -> StorageFormat {
        match field {
            NoteField::Notes => self.storage.notes,
            NoteField::Solution => self.storage.solution,
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
