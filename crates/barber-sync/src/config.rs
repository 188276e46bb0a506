//! # Sync Configuration
//!
//! Configuration for the backend client, the buffer medium and the shop.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Defaults (lowest)                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. Config file (barber.toml in the platform config dir)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. Environment variables (highest)                                    │
//! │     BARBER_REMOTE_URL, BARBER_API_KEY, BARBER_DB_PATH,                 │
//! │     BARBER_RECORD_NAME, BARBER_TIMEZONE                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate()                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # barber.toml
//! [remote]
//! url = "https://project.supabase.co"
//! api_key = "public-anon-key"
//! request_timeout_secs = 15
//! connect_timeout_secs = 10
//!
//! [storage]
//! database_path = "/var/lib/barber/barber.db"  # optional
//! record_name = "offline_visits"
//! max_connections = 2
//!
//! [shop]
//! timezone = "Europe/Sofia"
//! ```

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use barber_core::DayWindow;
use barber_db::{DbConfig, DEFAULT_MAX_CONNECTIONS, DEFAULT_RECORD_NAME};

use crate::error::{SyncError, SyncResult};
use crate::supabase::normalize_rest_url;

// =============================================================================
// Remote Settings
// =============================================================================

/// Hosted backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Project URL, e.g. `https://project.supabase.co`.
    #[serde(default)]
    pub url: Option<String>,

    /// Public API key sent as `apikey` and bearer token.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Upper bound for one request, connect included (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound for establishing a connection (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    15
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            url: None,
            api_key: None,
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl RemoteSettings {
    /// Returns `(url, api_key)`, failing when either is missing.
    pub fn credentials(&self) -> SyncResult<(&str, &str)> {
        match (non_blank(&self.url), non_blank(&self.api_key)) {
            (Some(url), Some(key)) => Ok((url, key)),
            _ => Err(SyncError::InvalidConfig(
                "remote.url and remote.api_key must both be set".into(),
            )),
        }
    }

    /// Returns true if both url and api_key are set.
    pub fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Local buffer medium settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. Defaults to `barber.db` in the platform data dir.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Name of the record holding the buffer.
    #[serde(default = "default_record_name")]
    pub record_name: String,

    /// SQLite pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_record_name() -> String {
    DEFAULT_RECORD_NAME.to_string()
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: None,
            record_name: default_record_name(),
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Shop Settings
// =============================================================================

/// Shop-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopSettings {
    /// IANA timezone the shop's calendar days are counted in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            timezone: default_timezone(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub shop: ShopSettings,
}

impl SyncConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (barber.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        // url and key come as a pair
        match (non_blank(&self.remote.url), non_blank(&self.remote.api_key)) {
            (None, None) => {}
            (Some(url), Some(_)) => {
                normalize_rest_url(url)?;
            }
            _ => {
                return Err(SyncError::InvalidConfig(
                    "remote.url and remote.api_key must be set together".into(),
                ))
            }
        }

        if self.remote.request_timeout_secs == 0 || self.remote.connect_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "remote timeouts must be greater than 0".into(),
            ));
        }

        if self.storage.record_name.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "storage.record_name must not be empty".into(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(SyncError::InvalidConfig(
                "storage.max_connections must be greater than 0".into(),
            ));
        }

        self.timezone()?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("BARBER_REMOTE_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.remote.url = Some(url);
        }

        if let Ok(key) = std::env::var("BARBER_API_KEY") {
            self.remote.api_key = Some(key);
        }

        if let Ok(path) = std::env::var("BARBER_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Ok(name) = std::env::var("BARBER_RECORD_NAME") {
            self.storage.record_name = name;
        }

        if let Ok(tz) = std::env::var("BARBER_TIMEZONE") {
            debug!(timezone = %tz, "Overriding shop timezone from environment");
            self.shop.timezone = tz;
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "barber", "pos")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("barber.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the shop timezone.
    pub fn timezone(&self) -> SyncResult<Tz> {
        self.shop.timezone.trim().parse::<Tz>().map_err(|_| {
            SyncError::InvalidConfig(format!(
                "Unknown timezone: '{}'. Use an IANA name such as Europe/Sofia",
                self.shop.timezone
            ))
        })
    }

    /// Returns the shop's calendar day containing `now`.
    pub fn day_window(&self, now: DateTime<Utc>) -> SyncResult<DayWindow> {
        let tz = self.timezone()?;
        DayWindow::containing(now, &tz)
            .ok_or_else(|| SyncError::InvalidConfig(format!("No calendar day contains {now}")))
    }

    /// Returns the SQLite file path, configured or platform default.
    pub fn database_path(&self) -> SyncResult<PathBuf> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }

        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join("barber.db"))
            .ok_or_else(|| SyncError::InvalidConfig("No database path available".into()))
    }

    /// Returns how to open the buffer database.
    pub fn db_config(&self) -> SyncResult<DbConfig> {
        Ok(DbConfig::file(self.database_path()?).max_connections(self.storage.max_connections))
    }

    /// Returns the buffer record name.
    pub fn record_name(&self) -> &str {
        &self.storage.record_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barber_db::BufferLocation;
    use chrono::{Duration, NaiveDate};

    fn utc(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.remote.request_timeout_secs, 15);
        assert_eq!(config.remote.connect_timeout_secs, 10);
        assert_eq!(config.record_name(), "offline_visits");
        assert_eq!(config.timezone().unwrap(), Tz::UTC);
        assert!(!config.remote.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_file() {
        let config: SyncConfig = toml::from_str(
            r#"
            [remote]
            url = "https://demo.supabase.co"
            api_key = "anon"

            [shop]
            timezone = "Europe/Sofia"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.remote.credentials().unwrap(), ("https://demo.supabase.co", "anon"));
        assert_eq!(config.remote.request_timeout_secs, 15);
        assert_eq!(config.storage.record_name, "offline_visits");
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();

        // URL without key
        config.remote.url = Some("https://demo.supabase.co".into());
        assert!(matches!(config.validate(), Err(SyncError::InvalidConfig(_))));

        // Bad scheme
        config.remote.api_key = Some("anon".into());
        config.remote.url = Some("ws://demo.supabase.co".into());
        assert!(matches!(config.validate(), Err(SyncError::InvalidUrl(_))));

        config.remote.url = Some("https://demo.supabase.co".into());
        assert!(config.validate().is_ok());

        config.remote.request_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.remote.request_timeout_secs = 15;

        config.storage.record_name = "  ".into();
        assert!(config.validate().is_err());
        config.storage.record_name = "offline_visits".into();

        config.shop.timezone = "Mars/Olympus_Mons".into();
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_day_window_in_shop_timezone() {
        let mut config = SyncConfig::default();
        config.shop.timezone = "Europe/Sofia".into();

        // 23:30 UTC on the 9th is already the 10th in Sofia (+02:00)
        let window = config.day_window(utc("2024-03-09T23:30:00Z")).unwrap();
        assert_eq!(window.start, utc("2024-03-09T22:00:00Z"));
        assert_eq!(window.end, utc("2024-03-10T22:00:00Z"));
    }

    #[test]
    fn test_day_window_across_dst() {
        // Sofia springs forward at 03:00 on 2024-03-31
        let tz: Tz = "Europe/Sofia".parse().unwrap();
        let window = DayWindow::for_date(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(), &tz).unwrap();
        assert_eq!(window.start, utc("2024-03-30T22:00:00Z"));
        assert_eq!(window.end, utc("2024-03-31T21:00:00Z"));
        assert_eq!(window.duration(), Duration::hours(23));

        // Santiago springs forward at midnight, so 00:00 on 2024-09-08 never happens
        let tz: Tz = "America/Santiago".parse().unwrap();
        let window = DayWindow::for_date(NaiveDate::from_ymd_opt(2024, 9, 8).unwrap(), &tz).unwrap();
        assert_eq!(window.start, utc("2024-09-08T04:00:00Z"));
        assert_eq!(window.end, utc("2024-09-09T03:00:00Z"));
        assert_eq!(window.duration(), Duration::hours(23));
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let mut config = SyncConfig::default();
        config.storage.database_path = Some(PathBuf::from("/tmp/barber-test.db"));
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/barber-test.db"));
    }

    #[test]
    fn test_db_config_from_storage_settings() {
        let config: SyncConfig = toml::from_str(
            r#"
            [storage]
            database_path = "/srv/shop/buffer.db"
            max_connections = 4
            "#,
        )
        .unwrap();

        let db = config.db_config().unwrap();
        assert_eq!(
            db.location,
            BufferLocation::File(PathBuf::from("/srv/shop/buffer.db"))
        );
        assert_eq!(db.max_connections, 4);

        let mut config = SyncConfig::default();
        config.storage.max_connections = 0;
        assert!(matches!(config.validate(), Err(SyncError::InvalidConfig(_))));
    }

    #[test]
    fn test_save_then_load_file() {
        let path = std::env::temp_dir().join(format!("barber-{}.toml", uuid::Uuid::new_v4()));

        let mut config = SyncConfig::default();
        config.remote.url = Some("https://demo.supabase.co".into());
        config.remote.api_key = Some("anon".into());
        config.shop.timezone = "America/Santiago".into();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[remote]"));
        assert!(contents.contains("[shop]"));

        let parsed: SyncConfig = toml::from_str(&contents).unwrap();
        assert_eq!(parsed.shop.timezone, "America/Santiago");
        assert_eq!(parsed.remote.url.as_deref(), Some("https://demo.supabase.co"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_malformed_file_fails_to_load() {
        let path = std::env::temp_dir().join(format!("barber-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[remote\nurl = ").unwrap();

        let err = SyncConfig::load(Some(path.clone())).unwrap_err();
        assert!(matches!(err, SyncError::ConfigLoadFailed(_)));

        std::fs::remove_file(&path).unwrap();
    }
}
