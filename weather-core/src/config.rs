use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{client::WeatherClient, transport::TransportOptions};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "AMAP_WEATHER_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// api_key = "..."
///
/// [transport]
/// timeout = 5000
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,

    #[serde(default)]
    pub transport: TransportOptions,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Like [`load`](Self::load), for an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Like [`save`](Self::save), for an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "amap-weather", "amap-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Stored API key.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `amap-weather configure` or set {API_KEY_ENV}."
            )
        })
    }

    /// API key from the environment if set, otherwise the stored one.
    pub fn resolved_api_key(&self) -> Result<String> {
        self.resolve_key(env::var(API_KEY_ENV).ok())
    }

    /// `override_key` if non-empty, otherwise the stored key.
    pub fn resolve_key(&self, override_key: Option<String>) -> Result<String> {
        match override_key {
            Some(key) if !key.is_empty() => Ok(key),
            _ => self.api_key().map(str::to_owned),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    /// Build a client from this configuration.
    pub fn client(&self) -> Result<WeatherClient> {
        let key = self.resolved_api_key()?;
        let client = WeatherClient::new(key)?.with_options(self.transport.clone());

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `amap-weather configure`"));
        assert!(!cfg.is_configured());
    }

    #[test]
    fn empty_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key(String::new());

        assert!(cfg.api_key().is_err());
    }

    #[test]
    fn set_api_key_replaces_existing() {
        let mut cfg = Config::default();

        cfg.set_api_key("FIRST".into());
        cfg.set_api_key("SECOND".into());

        assert_eq!(cfg.api_key().unwrap(), "SECOND");
        assert!(cfg.is_configured());
    }

    #[test]
    fn parses_key_and_transport_section() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"

            [transport]
            timeout = 5000
            "#,
        )
        .expect("config must parse");

        assert_eq!(cfg.api_key().unwrap(), "KEY");
        assert_eq!(cfg.transport.timeout, Some(5000));
        assert_eq!(cfg.transport.user_agent, None);
    }

    #[test]
    fn transport_section_is_optional() {
        let cfg = Config::from_toml(r#"api_key = "KEY""#).unwrap();
        assert_eq!(cfg.transport, TransportOptions::default());
    }

    #[test]
    fn toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.transport = TransportOptions::default().timeout(1500);

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn override_key_wins_over_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        assert_eq!(cfg.resolve_key(Some("FROM_ENV".into())).unwrap(), "FROM_ENV");
        assert_eq!(cfg.resolve_key(Some(String::new())).unwrap(), "STORED");
        assert_eq!(cfg.resolve_key(None).unwrap(), "STORED");
    }

    #[test]
    fn override_key_works_without_stored_key() {
        let cfg = Config::default();

        assert_eq!(cfg.resolve_key(Some("FROM_ENV".into())).unwrap(), "FROM_ENV");
        assert!(cfg.resolve_key(None).is_err());
    }

    #[test]
    fn load_from_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_to_creates_parent_dirs_and_load_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.transport = TransportOptions::default().timeout(5000);
        cfg.save_to(&path).expect("save must create parent directories");

        assert!(path.exists());
        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn load_from_reports_bad_toml_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn client_carries_transport_options() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.transport = TransportOptions::default().timeout(5000);

        // The env var may be set on a developer machine; only check options here.
        let client = cfg.client().expect("client must build");
        assert_eq!(client.transport_options().timeout, Some(5000));
    }
}
