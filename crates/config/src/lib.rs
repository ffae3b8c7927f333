use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "courier.toml",
    "config/courier.toml",
    "crates/config/courier.toml",
    "../courier.toml",
    "../config/courier.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub access: AccessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
    /// Deadline applied to every inbound call, authorization check included.
    #[serde(default = "HttpConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl HttpConfig {
    const fn default_request_timeout() -> u64 {
        30
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 50001,
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

/// Connection settings for the chat store.
///
/// The URL scheme selects the backend: `postgres://` (or `postgresql://`)
/// for production, `sqlite:` for local runs and tests.
///
/// ```
/// use courier_config::DatabaseConfig;
///
/// let database = DatabaseConfig::default();
/// assert_eq!(database.url, "sqlite://courier.db");
/// assert_eq!(database.connect_attempts, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(default = "DatabaseConfig::default_connect_attempts")]
    pub connect_attempts: u32,
    #[serde(default = "DatabaseConfig::default_connect_attempt_delay")]
    pub connect_attempt_delay_ms: u64,
}

impl DatabaseConfig {
    const fn default_connect_attempts() -> u32 {
        3
    }

    const fn default_connect_attempt_delay() -> u64 {
        1_000
    }

    pub fn connect_attempt_delay(&self) -> Duration {
        Duration::from_millis(self.connect_attempt_delay_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://courier.db".to_string(),
            max_connections: 10,
            connect_attempts: Self::default_connect_attempts(),
            connect_attempt_delay_ms: Self::default_connect_attempt_delay(),
        }
    }
}

/// Location of the external access service that authorizes calls and
/// resolves usernames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    pub base_url: String,
    #[serde(default = "AccessConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl AccessConfig {
    const fn default_request_timeout() -> u64 {
        5
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:50051".to_string(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use courier_config::load;
///
/// std::env::remove_var("COURIER_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default(
            "http.request_timeout_seconds",
            i64::try_from(defaults.http.request_timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default(
            "database.connect_attempts",
            i64::from(defaults.database.connect_attempts),
        )?
        .set_default(
            "database.connect_attempt_delay_ms",
            i64::try_from(defaults.database.connect_attempt_delay_ms).unwrap_or(i64::MAX),
        )?
        .set_default("access.base_url", defaults.access.base_url.clone())?
        .set_default(
            "access.request_timeout_seconds",
            i64::try_from(defaults.access.request_timeout_seconds).unwrap_or(i64::MAX),
        )?;

    let environment_overrides = config::Environment::with_prefix("COURIER").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("COURIER_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via COURIER_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.database.connect_attempts == 0 {
        config.database.connect_attempts = 1;
    }

    // database.url may carry credentials
    debug!(http = ?config.http, access = ?config.access, "loaded backend configuration");
    Ok(config)
}
