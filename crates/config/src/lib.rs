//! Configuration loading, validation, and management for Zalo.
//!
//! Loads configuration from `~/.zalo/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.zalo/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// The assistant's name, used in greetings and the prompt
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// How the assistant addresses the user
    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Where the JSON stores live (default: `~/.zalo/data`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Knowledge base configuration
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Note store configuration
    #[serde(default)]
    pub notes: NotesConfig,

    /// Task store configuration
    #[serde(default)]
    pub tasks: TasksConfig,
}

fn default_assistant_name() -> String {
    "Zalo".into()
}
fn default_user_name() -> String {
    "Twistz".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// File name (relative to the data dir) or absolute path
    #[serde(default = "default_knowledge_file")]
    pub file: String,

    /// Minimum similarity ratio for a fuzzy topic match
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Prefer responses learned in the context of the previous topic
    #[serde(default = "default_true")]
    pub context_sensitive: bool,

    /// Learn a placeholder record for utterances nothing else understood
    #[serde(default)]
    pub auto_learn: bool,

    /// Cap on the in-session lookup history (unbounded when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

fn default_knowledge_file() -> String {
    "knowledge_base.json".into()
}
fn default_similarity_threshold() -> f64 {
    0.6
}
fn default_true() -> bool {
    true
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            file: default_knowledge_file(),
            similarity_threshold: default_similarity_threshold(),
            context_sensitive: true,
            auto_learn: false,
            history_limit: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    #[serde(default = "default_notes_file")]
    pub file: String,
}

fn default_notes_file() -> String {
    "notes.json".into()
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            file: default_notes_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    #[serde(default = "default_tasks_file")]
    pub file: String,

    /// How far ahead `reminders` looks for due tasks
    #[serde(default = "default_reminder_window_hours")]
    pub reminder_window_hours: u32,
}

fn default_tasks_file() -> String {
    "tasks.json".into()
}
fn default_reminder_window_hours() -> u32 {
    24
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            file: default_tasks_file(),
            reminder_window_hours: default_reminder_window_hours(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.zalo/config.toml).
    ///
    /// Environment variables override the file:
    /// - `ZALO_DATA_DIR`
    /// - `ZALO_NAME`
    /// - `ZALO_SIMILARITY_THRESHOLD`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(dir) = lookup("ZALO_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(name) = lookup("ZALO_NAME") {
            self.assistant_name = name;
        }

        if let Some(raw) = lookup("ZALO_SIMILARITY_THRESHOLD") {
            self.knowledge.similarity_threshold = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "ZALO_SIMILARITY_THRESHOLD must be a number, got {raw:?}"
                ))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".zalo")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Directory holding the knowledge, notes, and tasks files.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("data"))
    }

    pub fn knowledge_path(&self) -> PathBuf {
        self.resolve(&self.knowledge.file)
    }

    pub fn notes_path(&self) -> PathBuf {
        self.resolve(&self.notes.file)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.resolve(&self.tasks.file)
    }

    /// Absolute paths are kept, relative ones land in the data dir.
    fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.knowledge.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ValidationError(format!(
                "knowledge.similarity_threshold must be between 0.0 and 1.0, got {threshold}"
            )));
        }

        if self.assistant_name.trim().is_empty() || self.user_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "assistant_name and user_name must not be empty".into(),
            ));
        }

        if self.tasks.reminder_window_hours == 0 {
            return Err(ConfigError::ValidationError(
                "tasks.reminder_window_hours must be > 0".into(),
            ));
        }

        for (section, file) in [
            ("knowledge", &self.knowledge.file),
            ("notes", &self.notes.file),
            ("tasks", &self.tasks.file),
        ] {
            if file.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{section}.file must not be empty"
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            user_name: default_user_name(),
            data_dir: None,
            knowledge: KnowledgeConfig::default(),
            notes: NotesConfig::default(),
            tasks: TasksConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
