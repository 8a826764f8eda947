//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// API key for the quiz generator. Quiz commands fail without one.
    pub quiz_api_key: Option<String>,

    /// Chat-completions endpoint used to generate quizzes.
    pub quiz_api_url: String,

    /// Model requested from the quiz endpoint.
    pub quiz_model: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field(
                "quiz_api_key",
                &self.quiz_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("quiz_api_url", &self.quiz_api_url)
            .field("quiz_model", &self.quiz_model)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("eco.db"),
            quiz_api_key: None,
            quiz_api_url: eco_quiz::DEFAULT_API_URL.to_string(),
            quiz_model: eco_quiz::DEFAULT_MODEL.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Later sources win: defaults, `<config_dir>/eco/config.toml`, the given
    /// file, then `ECO_*` environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("ECO_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for eco.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("eco"))
}

/// Returns the platform-specific data directory for eco.
///
/// On Linux: `~/.local/share/eco`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("eco"))
}
