use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

const CONFIG_DIR: &str = ".huddle";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_LANGUAGE: &str = "en";

/// Top-level application configuration loaded from `.huddle/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_language")]
    default_language: String,
    #[serde(default = "builtin_languages")]
    languages: Vec<String>,
    #[serde(default)]
    store: StoreConfig,
}

/// Store configuration block.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreConfig {
    /// Path of the JSON task document, relative to the base directory.
    #[serde(default)]
    path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            languages: builtin_languages(),
            store: StoreConfig::default(),
        }
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_owned()
}

fn builtin_languages() -> Vec<String> {
    vec!["en".to_owned(), "es".to_owned()]
}

impl AppConfig {
    /// Load configuration from `base/.huddle/config.toml`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed, or validated.
    pub fn load(base: impl AsRef<Path>) -> Result<Self> {
        let config_path = base.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for language in &self.languages {
            if !seen.insert(language.as_str()) {
                bail!("duplicate language '{language}' in configuration");
            }
        }
        if !self.is_supported(&self.default_language) {
            bail!(
                "default language '{}' is not in the configured language list",
                self.default_language
            );
        }
        Ok(())
    }

    /// Language applied to a session before any preference is known.
    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Languages offered by the selector.
    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Whether `language` is offered by the selector.
    #[must_use]
    pub fn is_supported(&self, language: &str) -> bool {
        self.languages.iter().any(|candidate| candidate == language)
    }

    /// Absolute path of the task document, when the store is file-backed.
    #[must_use]
    pub fn store_path(&self, base: impl AsRef<Path>) -> Option<PathBuf> {
        self.store
            .path
            .as_ref()
            .map(|path| base.as_ref().join(path))
    }
}
