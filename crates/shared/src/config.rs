//! Application configuration management.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    8
}

/// Ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Upper bound on how long a unit of work waits for a row lock.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
    /// How many times a generated code is regenerated after colliding on insert.
    #[serde(default = "default_sequence_retry_attempts")]
    pub sequence_retry_attempts: u32,
    /// IANA time zone used to derive the business date when a caller supplies none.
    ///
    /// An unknown name fails deserialization, so a typo stops startup.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
}

fn default_lock_timeout() -> u64 {
    5000
}

fn default_sequence_retry_attempts() -> u32 {
    2
}

const fn default_timezone() -> Tz {
    chrono_tz::Asia::Jakarta
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout(),
            sequence_retry_attempts: default_sequence_retry_attempts(),
            timezone: default_timezone(),
        }
    }
}

impl LedgerConfig {
    /// Configured business time zone.
    #[must_use]
    pub const fn tz(&self) -> Tz {
        self.timezone
    }

    /// Returns the calendar date of `now` in the configured time zone.
    #[must_use]
    pub fn business_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz()).date_naive()
    }

    /// Returns today's business date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.business_date(Utc::now())
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, including when
    /// `ledger.timezone` is not a known IANA zone.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KOPERASI").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
