//! Configuration management for SEA.
//!
//! Loads configuration from ${SEA_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default backend address when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";

/// Environment variable overriding the configured base URL.
pub const BASE_URL_ENV: &str = "SEA_BASE_URL";

/// Returns the default config template with comments.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for SEA configuration and data files.
    //!
    //! SEA_HOME resolution order:
    //! 1. SEA_HOME environment variable (if set)
    //! 2. ~/.config/sea (default)

    use std::path::PathBuf;

    /// Returns the SEA home directory.
    pub fn sea_home() -> PathBuf {
        if let Ok(home) = std::env::var("SEA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("sea")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        sea_home().join("config.toml")
    }

    /// Returns the path to the persisted key-value storage file.
    pub fn storage_path() -> PathBuf {
        sea_home().join("storage.json")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API base URL (e.g. `https://sea.example.com/api/`)
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (0 disables)
    pub request_timeout_secs: u64,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a config file from the commented default template.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Saves only the base_url field to a specific config file path.
    ///
    /// Creates the file from the template if it doesn't exist.
    /// Preserves existing fields and comments using toml_edit.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the file cannot be updated.
    pub fn save_base_url_to(path: &Path, base_url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let normalized = parse_base_url(base_url)?;

        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["base_url"] = value(normalized.as_str());

        Self::write_config(path, &doc.to_string())
    }

    /// Resolves the effective base URL with precedence:
    /// `SEA_BASE_URL` env > command-line override > config > default.
    ///
    /// # Errors
    /// Returns an error if the winning value is not a valid URL.
    pub fn resolve_base_url(&self, cli_override: Option<&str>) -> Result<Url> {
        let env_value = std::env::var(BASE_URL_ENV).ok();
        select_base_url(
            env_value.as_deref(),
            cli_override,
            self.base_url.as_deref(),
        )
    }

    /// Returns the request timeout, or None when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Picks the first non-blank candidate (env, flag, config) and parses it,
/// falling back to [`DEFAULT_BASE_URL`].
fn select_base_url(env: Option<&str>, flag: Option<&str>, config: Option<&str>) -> Result<Url> {
    let chosen = [env, flag, config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(DEFAULT_BASE_URL);

    parse_base_url(chosen)
}

/// Parses a base URL, normalizing it to end with `/` so relative endpoint
/// paths join beneath it instead of replacing its last segment.
///
/// # Errors
/// Returns an error if the value is not an absolute http(s) URL.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let mut url =
        Url::parse(trimmed).with_context(|| format!("Invalid SEA base URL: {trimmed}"))?;

    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("Invalid SEA base URL: {trimmed} (expected http or https)");
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_load_partial_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "request_timeout_secs = 30\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.base_url, None);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "base_url = [").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config"));
    }

    #[test]
    fn test_init_creates_template_and_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.toml");

        Config::init(&config_path).unwrap();
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# base_url ="));

        // The template must parse back into defaults.
        assert_eq!(Config::load_from(&config_path).unwrap(), Config::default());

        let err = Config::init(&config_path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_save_base_url_preserves_comments() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "# my backend\nrequest_timeout_secs = 5\n",
        )
        .unwrap();

        Config::save_base_url_to(&config_path, "https://sea.example.com/api").unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# my backend"));
        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(
            config.base_url.as_deref(),
            Some("https://sea.example.com/api/")
        );
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_save_base_url_rejects_invalid_url() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        assert!(Config::save_base_url_to(&config_path, "not a url").is_err());
        assert!(!config_path.exists());
    }

    #[test]
    fn test_select_base_url_precedence() {
        let url = select_base_url(
            Some("http://env.test/api/"),
            Some("http://flag.test/api/"),
            Some("http://config.test/api/"),
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://env.test/api/");

        let url = select_base_url(None, Some("http://flag.test/"), Some("http://config.test/"))
            .unwrap();
        assert_eq!(url.as_str(), "http://flag.test/");

        let url = select_base_url(Some("  "), None, Some("http://config.test/api")).unwrap();
        assert_eq!(url.as_str(), "http://config.test/api/");

        let url = select_base_url(None, None, None).unwrap();
        assert_eq!(url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_parse_base_url_rejects_non_http() {
        assert!(parse_base_url("ftp://files.test/").is_err());
        assert!(parse_base_url("localhost:8000").is_err());
    }
}
