//! Configuration to acknowledge reader preferences as well as set defaults.
//!
//! Specifically, we try to find a carta.toml, and if present we load settings from there. This
//! provides the document location, the chat endpoint, and layout width. A few settings can also
//! come from the environment so that secrets stay out of the file.

use crate::chat::{ChatTransport, CompletionsTransport, RelayTransport};
use crate::error::{Error, Result};
use facet::Facet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "carta.toml";
/// Environment variable holding the chat provider key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";
/// Environment variable overriding `relay_url`.
pub const RELAY_URL_ENV: &str = "CARTA_RELAY_URL";

#[derive(Facet, Clone, Debug)]
/// Settings loaded from carta.toml or falling back to defaults.
pub struct Config {
    #[facet(default = String::new())]
    /// Constitution text to open when none is given on the command line.
    pub document_path: String,
    #[facet(default = String::new())]
    /// Chat relay endpoint. Empty means call the completions API directly.
    pub relay_url: String,
    #[facet(default = "https://api.groq.com/openai/v1/chat/completions".to_string())]
    /// OpenAI-compatible chat completions endpoint.
    pub api_url: String,
    #[facet(default = String::new())]
    /// Bearer key for `api_url`. Usually supplied through the environment instead.
    pub api_key: String,
    #[facet(default = "llama-3.3-70b-versatile".to_string())]
    /// Model requested from the completions endpoint.
    pub model: String,
    #[facet(default = 0.3)]
    /// Sampling temperature.
    pub temperature: f32,
    #[facet(default = 1024)]
    /// Maximum reply length in tokens.
    pub max_tokens: u32,
    #[facet(default = 25_000)]
    /// Characters of the document sent as grounding context.
    pub context_chars: usize,
    #[facet(default = 30)]
    /// Chat request timeout.
    pub timeout_seconds: u64,
    #[facet(default = 100)]
    /// Maximum line width for the reader at the default font size.
    pub wrap_width: usize,
    #[facet(default = String::new())]
    /// Where preferences are stored. Empty means the platform data directory.
    pub preferences_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::parse("", Path::new(CONFIG_FILE)).unwrap_or_else(|e| {
            unreachable!("built-in configuration defaults must parse: {e}")
        })
    }
}

impl Config {
    /// Parse configuration text, filling every missing field with its default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming `path` if the text is not valid configuration.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        facet_toml::from_str::<Self>(contents).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    #[must_use]
    /// Load configuration from `path`, or carta.toml in the working directory when `None`.
    ///
    /// A missing file gives the defaults. An unreadable or invalid file is logged and also
    /// gives the defaults, so a bad config never keeps the reader from starting.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.unwrap_or(Path::new(CONFIG_FILE));
        let config = match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents, path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "using default configuration");
                Self::default()
            }),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no configuration file");
                Self::default()
            }
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    #[must_use]
    /// Apply environment overrides read through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.api_key = key;
        }
        if let Some(url) = lookup(RELAY_URL_ENV).filter(|u| !u.is_empty()) {
            self.relay_url = url;
        }
        self
    }

    #[must_use]
    /// Document path from the config, if one is set.
    pub fn document(&self) -> Option<PathBuf> {
        non_empty(&self.document_path).map(PathBuf::from)
    }

    #[must_use]
    /// Preferences file location: the configured path, else the platform default.
    pub fn preferences_file(&self) -> Option<PathBuf> {
        non_empty(&self.preferences_path)
            .map(PathBuf::from)
            .or_else(crate::preferences::FileStore::default_path)
    }

    #[must_use]
    /// Chat transport for these settings: the relay when one is set, else direct completions.
    pub fn transport(&self) -> Box<dyn ChatTransport + Send + Sync> {
        let timeout = Duration::from_secs(self.timeout_seconds);
        if let Some(url) = non_empty(&self.relay_url) {
            return Box::new(RelayTransport::new(url, timeout));
        }
        Box::new(
            CompletionsTransport::new(
                self.api_url.clone(),
                non_empty(&self.api_key).map(str::to_string),
                self.model.clone(),
                timeout,
            )
            .with_sampling(self.temperature, self.max_tokens),
        )
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
