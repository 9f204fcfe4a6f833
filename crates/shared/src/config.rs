//! Application configuration management.
//!
//! Sources are layered in order: `config/default.toml`, `config/{RUN_MODE}.toml`,
//! then `REMESA__*` environment variables (`REMESA__LEDGER__LIMITS__BALANCE_CAP`).

use chrono_tz::Tz;
use config::ConfigError;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Login lockout configuration.
    #[serde(default)]
    pub lockout: LockoutConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
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
    /// Seconds to wait for a pooled connection before giving up.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// IANA name of the reference timezone for timestamps and calendar days.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Upper bound on waiting for row locks during a transfer.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
    /// Monetary limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_lock_timeout() -> u64 {
    2000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            lock_timeout_ms: default_lock_timeout(),
            limits: LimitsConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Resolves the reference timezone.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` if the name is not a known IANA zone.
    pub fn time_zone(&self) -> Result<Tz, ConfigError> {
        self.timezone.parse::<Tz>().map_err(|e| {
            ConfigError::Message(format!("invalid ledger.timezone '{}': {e}", self.timezone))
        })
    }
}

/// Monetary limits applied to every transfer, in whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Smallest amount a single transfer may move (inclusive).
    pub min_transfer: Decimal,
    /// Largest amount a single transfer may move (inclusive).
    pub max_transfer: Decimal,
    /// Cumulative amount an account may send per calendar day.
    pub daily_sent_cap: Decimal,
    /// Cumulative amount an account may receive per calendar day.
    pub daily_received_cap: Decimal,
    /// Ceiling on a recipient's balance after a credit.
    pub balance_cap: Decimal,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_transfer: Decimal::from(500),
            max_transfer: Decimal::from(10_000),
            daily_sent_cap: Decimal::from(10_000),
            daily_received_cap: Decimal::from(10_000),
            balance_cap: Decimal::from(50_000),
        }
    }
}

/// Login lockout configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LockoutConfig {
    /// Consecutive failed logins that block a user.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u8,
}

fn default_max_failed_attempts() -> u8 {
    3
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed_attempts(),
        }
    }
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    7200 // 2 hours
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "remesa=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("REMESA").separator("__"))
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.ledger.time_zone()?;
        Ok(app)
    }
}
