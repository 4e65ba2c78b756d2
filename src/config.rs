use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub market: MarketSettings,
    #[serde(default)]
    pub pairing: PairingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which catalog store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            redis_url: None,
            ttl_secs: None,
            l1_cache_size: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketSettings {
    #[serde(default = "default_market_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
    pub api_key: Option<String>,
    #[serde(default = "default_market_timeout")]
    pub timeout_secs: u64,
    /// Refresh the catalog in the background every N seconds
    pub sync_interval_secs: Option<u64>,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            endpoint: default_market_endpoint(),
            vs_currency: default_vs_currency(),
            per_page: default_per_page(),
            page: default_page(),
            api_key: None,
            timeout_secs: default_market_timeout(),
            sync_interval_secs: None,
        }
    }
}

fn default_market_endpoint() -> String { "https://api.coingecko.com/api/v3".to_string() }
fn default_vs_currency() -> String { "usd".to_string() }
fn default_per_page() -> u32 { 100 }
fn default_page() -> u32 { 1 }
fn default_market_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct PairingSettings {
    #[serde(default = "default_true")]
    pub avoid_previous_pair: bool,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self { avoid_previous_pair: true }
    }
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CRYPTO_HOT__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CRYPTO_HOT__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        with_database_url(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        with_database_url(settings)?.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("CRYPTO_HOT")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Let a plain `DATABASE_URL` win over file configuration
fn with_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_default_market_settings() {
        let market = MarketSettings::default();
        assert_eq!(market.endpoint, "https://api.coingecko.com/api/v3");
        assert_eq!(market.per_page, 100);
        assert!(market.sync_interval_secs.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("crypto-hot-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 9000

[store]
backend = "memory"

[database]
url = "postgres://localhost/test"

[pairing]
avoid_previous_pair = false
"#
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.store.backend, StoreBackend::Memory);
        assert!(!settings.pairing.avoid_previous_pair);
        assert!(!settings.cache.enabled);
        assert_eq!(settings.logging.level, "info");
    }
}
