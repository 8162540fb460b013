//! Configuration module
//!
//! Connection settings for the master and the filer. A config value is built
//! once, validated, and handed to a client at construction; clients never
//! change it afterwards.

use std::env;
use std::time::Duration;

use crate::error::{WeedError, WeedResult};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_MASTER_PORT: u16 = 9333;
pub const DEFAULT_FILER_PORT: u16 = 8888;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for one server endpoint. Used as-is for the master
/// (default `localhost:9333`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host running the server.
    pub host: String,
    /// Port of the server. `None` leaves the port out of the URL.
    pub port: Option<u16>,
    /// Use HTTPS for this server and for the volume servers it points to.
    pub https: bool,
    /// Upper bound on each network wait: response headers, a buffered body,
    /// or one chunk of a streamed body.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

/// Filer server settings (default `localhost:8888`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilerConfig(pub ClientConfig);

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: Some(DEFAULT_MASTER_PORT),
            https: false,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
        }
    }
}

impl Default for FilerConfig {
    fn default() -> Self {
        FilerConfig(ClientConfig {
            port: Some(DEFAULT_FILER_PORT),
            ..ClientConfig::default()
        })
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// `"http"` or `"https"`.
    pub fn scheme(&self) -> &'static str {
        if self.https {
            "https"
        } else {
            "http"
        }
    }

    /// Base URL of the server, without a trailing slash.
    pub fn base_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme(), self.host, port),
            None => format!("{}://{}", self.scheme(), self.host),
        }
    }

    /// Master settings from the environment (and `.env`).
    ///
    /// Reads SEAWEED_MASTER_HOST, SEAWEED_MASTER_PORT, SEAWEED_HTTPS,
    /// SEAWEED_REQUEST_TIMEOUT_SECS and SEAWEED_CONNECT_TIMEOUT_SECS.
    pub fn from_env() -> WeedResult<Self> {
        dotenvy::dotenv().ok();
        let config = server_config_from_env("SEAWEED_MASTER", DEFAULT_MASTER_PORT)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> WeedResult<()> {
        if self.host.trim().is_empty() {
            return Err(WeedError::Config("host cannot be empty".to_string()));
        }
        if self.host.contains("://") || self.host.contains('/') {
            return Err(WeedError::Config(format!(
                "host must be a bare hostname, got '{}'",
                self.host
            )));
        }
        if self.port == Some(0) {
            return Err(WeedError::Config("port cannot be 0".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(WeedError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(WeedError::Config(
                "connect timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl FilerConfig {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        FilerConfig(ClientConfig::new(host, port))
    }

    pub fn server(&self) -> &ClientConfig {
        &self.0
    }

    /// Filer settings from the environment (and `.env`).
    ///
    /// Reads SEAWEED_FILER_HOST and SEAWEED_FILER_PORT plus the shared
    /// SEAWEED_HTTPS and timeout variables.
    pub fn from_env() -> WeedResult<Self> {
        dotenvy::dotenv().ok();
        let config = server_config_from_env("SEAWEED_FILER", DEFAULT_FILER_PORT)?;
        config.validate()?;
        Ok(FilerConfig(config))
    }

    pub fn validate(&self) -> WeedResult<()> {
        self.0.validate()
    }
}

fn server_config_from_env(prefix: &str, default_port: u16) -> WeedResult<ClientConfig> {
    let host = env::var(format!("{prefix}_HOST")).unwrap_or_else(|_| DEFAULT_HOST.to_string());

    // An explicitly empty port means "no port in the URL".
    let port = match env::var(format!("{prefix}_PORT")) {
        Ok(raw) if raw.trim().is_empty() => None,
        Ok(raw) => Some(raw.trim().parse::<u16>().map_err(|_| {
            WeedError::Config(format!("{prefix}_PORT must be a port number, got '{raw}'"))
        })?),
        Err(_) => Some(default_port),
    };

    let https = env::var("SEAWEED_HTTPS")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let request_timeout = duration_from_env("SEAWEED_REQUEST_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS)?;
    let connect_timeout = duration_from_env("SEAWEED_CONNECT_TIMEOUT_SECS", CONNECT_TIMEOUT_SECS)?;

    Ok(ClientConfig {
        host,
        port,
        https,
        request_timeout,
        connect_timeout,
    })
}

fn duration_from_env(name: &str, default_secs: u64) -> WeedResult<Duration> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| WeedError::Config(format!("{name} must be a number of seconds, got '{raw}'"))),
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let master = ClientConfig::default();
        assert_eq!(master.base_url(), "http://localhost:9333");

        let filer = FilerConfig::default();
        assert_eq!(filer.server().base_url(), "http://localhost:8888");
    }

    #[test]
    fn test_base_url_without_port() {
        let config = ClientConfig::new("seaweed.example.com", None).with_https(true);
        assert_eq!(config.base_url(), "https://seaweed.example.com");
        assert_eq!(config.scheme(), "https");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ClientConfig::new("", Some(9333)).validate().is_err());
        assert!(ClientConfig::new("http://master", Some(9333)).validate().is_err());
        assert!(ClientConfig::new("master", Some(0)).validate().is_err());
        assert!(ClientConfig::new("master", Some(9333))
            .with_request_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(ClientConfig::new("master", None).validate().is_ok());
    }
}
