use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_OFFERS_API_URL: &str = "https://justjoin.it/api/offers";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub source: SourceConfig,
}

impl AppConfig {
    /// Reads `.env` (when present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: AppEnvironment::parse(&var_or("APP_ENV", "development")),
            server: ServerConfig {
                host: var_or("APP_HOST", "127.0.0.1"),
                port: parse_var("APP_PORT", 3000, ConfigError::InvalidPort)?,
            },
            telemetry: TelemetryConfig {
                log_level: var_or("APP_LOG_LEVEL", "info"),
            },
            source: SourceConfig::from_env()?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Unset means `default`; set but unparseable means `error`.
fn parse_var<T: FromStr>(key: &str, default: T, error: ConfigError) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| error),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where offers come from and how hard to try fetching them.
///
/// A configured CSV snapshot takes precedence over the remote API.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub api_url: String,
    pub csv_path: Option<PathBuf>,
    pub fetch_timeout: Duration,
    pub fetch_retries: u32,
}

impl SourceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timeout_secs = parse_var(
            "OFFERS_FETCH_TIMEOUT_SECS",
            defaults.fetch_timeout.as_secs(),
            ConfigError::InvalidFetchTimeout,
        )?;

        Ok(Self {
            api_url: var_or("OFFERS_API_URL", &defaults.api_url),
            csv_path: env::var_os("OFFERS_CSV_PATH")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            fetch_timeout: Duration::from_secs(timeout_secs),
            fetch_retries: parse_var(
                "OFFERS_FETCH_RETRIES",
                defaults.fetch_retries,
                ConfigError::InvalidFetchRetries,
            )?,
        })
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_OFFERS_API_URL.to_string(),
            csv_path: None,
            fetch_timeout: Duration::from_secs(30),
            fetch_retries: 2,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFetchTimeout,
    InvalidFetchRetries,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFetchTimeout => {
                write!(f, "OFFERS_FETCH_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidFetchRetries => {
                write!(f, "OFFERS_FETCH_RETRIES must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFetchTimeout
            | ConfigError::InvalidFetchRetries => None,
        }
    }
}
