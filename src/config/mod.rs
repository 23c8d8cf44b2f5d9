//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::parse_duration;
use crate::provider::{AggregationSettings, ProviderConfig};
use crate::update::UpdateSettings;

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "VALORANT_API";

/// Longest map-stats lookback accepted in `update.map_window_days`.
pub const MAX_MAP_WINDOW_DAYS: i64 = 365;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Stats provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Base URL for the stats API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Region segment, e.g. "na", "eu", "ap"
    #[serde(default = "default_region")]
    pub region: String,

    /// Static API credential. Prefer the `VALORANT_API` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Timeout per request in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.henrikdev.xyz/valorant/v1".to_string()
}

fn default_region() -> String {
    "na".to_string()
}

fn default_timeout() -> u64 {
    15
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            region: default_region(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl ProviderSettings {
    pub fn client_config(&self) -> ProviderConfig {
        ProviderConfig {
            base_url: self.base_url.clone(),
            region: self.region.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            ..Default::default()
        }
    }
}

/// Update cycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    #[serde(default = "default_season_sample")]
    pub season_sample: usize,

    #[serde(default = "default_map_sample")]
    pub map_sample: usize,

    #[serde(default = "default_map_window_days")]
    pub map_window_days: i64,

    #[serde(default = "default_player_min_games")]
    pub player_min_games: u32,

    #[serde(default = "default_team_min_games")]
    pub team_min_games: u32,

    /// Recompute the team aggregate when the recency index is a multiple
    /// of this
    #[serde(default = "default_team_every")]
    pub team_every: usize,

    /// Upper bound on the provider calls of one tick, in seconds
    #[serde(default = "default_cycle_timeout")]
    pub cycle_timeout_seconds: u64,

    /// In-process tick interval (e.g. "5m"); unset means ticks only come
    /// from `POST /update`
    #[serde(default)]
    pub schedule: Option<String>,
}

fn default_season_sample() -> usize {
    50
}

fn default_map_sample() -> usize {
    200
}

fn default_map_window_days() -> i64 {
    30
}

fn default_player_min_games() -> u32 {
    3
}

fn default_team_min_games() -> u32 {
    10
}

fn default_team_every() -> usize {
    10
}

fn default_cycle_timeout() -> u64 {
    60
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            season_sample: default_season_sample(),
            map_sample: default_map_sample(),
            map_window_days: default_map_window_days(),
            player_min_games: default_player_min_games(),
            team_min_games: default_team_min_games(),
            team_every: default_team_every(),
            cycle_timeout_seconds: default_cycle_timeout(),
            schedule: None,
        }
    }
}

impl UpdateConfig {
    pub fn settings(&self) -> UpdateSettings {
        UpdateSettings {
            aggregation: AggregationSettings {
                season_sample: self.season_sample,
                map_sample: self.map_sample,
                map_window_days: self.map_window_days,
                player_min_games: self.player_min_games,
                team_min_games: self.team_min_games,
            },
            team_every: self.team_every,
            cycle_timeout: Duration::from_secs(self.cycle_timeout_seconds),
        }
    }

    /// Parsed schedule interval, if one is configured.
    pub fn schedule_interval(&self) -> Option<Duration> {
        self.schedule.as_deref().and_then(parse_duration)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Onboarding manifest (`RiotUserName`/`RealName`/`PhotoPath` triples)
    #[serde(default = "default_roster_manifest")]
    pub roster_manifest: PathBuf,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub update: UpdateConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_roster_manifest() -> PathBuf {
    PathBuf::from("./users.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            roster_manifest: default_roster_manifest(),
            server: ServerConfig::default(),
            provider: ProviderSettings::default(),
            update: UpdateConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Let the environment supply the provider credential.
    pub fn apply_env(&mut self) {
        self.apply_api_key(std::env::var(API_KEY_ENV).ok());
    }

    fn apply_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.provider.api_key = Some(key);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Provider timeout must be greater than 0".to_string(),
            ));
        }

        if self.provider.region.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Provider region must not be empty".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.update.team_every == 0 {
            return Err(ConfigError::ValidationError(
                "update.team_every must be greater than 0".to_string(),
            ));
        }

        if self.update.cycle_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "update.cycle_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if !(1..=MAX_MAP_WINDOW_DAYS).contains(&self.update.map_window_days) {
            return Err(ConfigError::ValidationError(format!(
                "update.map_window_days must be between 1 and {}, got {}",
                MAX_MAP_WINDOW_DAYS, self.update.map_window_days
            )));
        }

        if self.update.season_sample == 0 || self.update.map_sample == 0 {
            return Err(ConfigError::ValidationError(
                "update.season_sample and update.map_sample must be greater than 0".to_string(),
            ));
        }

        if let Some(schedule) = &self.update.schedule {
            match parse_duration(schedule) {
                Some(d) if !d.is_zero() => {}
                _ => {
                    return Err(ConfigError::ValidationError(format!(
                        "Invalid update.schedule: {:?}",
                        schedule
                    )))
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.roster_manifest, PathBuf::from("./users.json"));
        assert_eq!(config.provider.region, "na");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.update.team_every, 10);
    }

    #[test]
    fn test_update_settings_conversion() {
        let settings = UpdateConfig::default().settings();

        assert_eq!(settings.aggregation.season_sample, 50);
        assert_eq!(settings.aggregation.map_sample, 200);
        assert_eq!(settings.aggregation.map_window_days, 30);
        assert_eq!(settings.aggregation.player_min_games, 3);
        assert_eq!(settings.aggregation.team_min_games, 10);
        assert_eq!(settings.cycle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.provider.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_schedule() {
        let mut config = AppConfig::default();
        config.update.schedule = Some("soon".to_string());
        assert!(config.validate().is_err());

        config.update.schedule = Some("0s".to_string());
        assert!(config.validate().is_err());

        config.update.schedule = Some("5m".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(
            config.update.schedule_interval(),
            Some(Duration::from_secs(300))
        );
    }

    #[test]
    fn test_config_validation_zero_team_every() {
        let mut config = AppConfig::default();
        config.update.team_every = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_map_window_range() {
        let mut config = AppConfig::default();
        for days in [-1, 0, 100_000] {
            config.update.map_window_days = days;
            assert!(config.validate().is_err(), "{} days accepted", days);
        }

        config.update.map_window_days = 1;
        assert!(config.validate().is_ok());
        config.update.map_window_days = MAX_MAP_WINDOW_DAYS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_samples() {
        let mut config = AppConfig::default();
        config.update.season_sample = 0;
        assert!(config.validate().is_err());

        config.update.season_sample = 50;
        config.update.map_sample = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_rejects_negative_window() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[update]\nmap_window_days = -1\n").unwrap();

        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            data_dir = "/srv/board"

            [provider]
            region = "eu"

            [update]
            schedule = "5m"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/board"));
        assert_eq!(config.provider.region, "eu");
        assert_eq!(config.provider.timeout_seconds, 15);
        assert_eq!(config.update.map_sample, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_key_override() {
        let mut config = AppConfig::default();
        config.apply_api_key(Some("  ".to_string()));
        assert!(config.provider.api_key.is_none());

        config.apply_api_key(Some("HDEV-abc".to_string()));
        assert_eq!(config.provider.api_key.as_deref(), Some("HDEV-abc"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load_or_default(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 0\n").unwrap();

        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.update.team_every, parsed.update.team_every);
    }
}
