//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults reproduce a local development setup.
//!
//! - `TIENDITA_DATABASE_URL` - SQLite URL (fallback `DATABASE_URL`, default `sqlite://tiendita.db`)
//! - `TIENDITA_HOST` - Bind address (default: 127.0.0.1)
//! - `TIENDITA_PORT` - Listen port (default: 5000)
//! - `TIENDITA_BASE_URL` - Public URL, decides the `Secure` cookie flag (default: `http://localhost:5000`)
//! - `TIENDITA_ADMIN_EMAIL_DOMAIN` - Email domain granted the admin role at registration (default: tecmilenio.mx)
//! - `TIENDITA_PAYMENT_APPROVAL_RATE` - Probability in `[0, 1]` that a simulated payment is approved (default: 0.8)
//! - `TIENDITA_CATALOG_REQUIRES_ADMIN` - Require an admin session to modify products (default: false)
//! - `TIENDITA_RATE_LIMIT` - Rate-limit login and registration (default: true)
//! - `TIENDITA_TRUST_PROXY` - Key the rate limiter on `X-Forwarded-For`/`X-Real-IP` (default: false)
//! - `TIENDITA_CORS_ORIGINS` - Comma-separated allowed origins (default: any origin)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Default SQLite database, created next to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://tiendita.db";

/// Default admin email domain.
pub const DEFAULT_ADMIN_EMAIL_DOMAIN: &str = "tecmilenio.mx";

/// Default probability that a simulated payment is approved.
pub const DEFAULT_PAYMENT_APPROVAL_RATE: f64 = 0.8;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Tiendita server configuration.
#[derive(Debug, Clone)]
pub struct TienditaConfig {
    /// SQLite connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Email domain whose users register as administrators
    pub admin_email_domain: String,
    /// Probability that a simulated payment is approved
    pub payment_approval_rate: f64,
    /// Require an admin session for catalog writes
    pub catalog_requires_admin: bool,
    /// Rate-limit authentication endpoints
    pub rate_limit: bool,
    /// Take client addresses from proxy headers instead of the peer address
    pub trust_proxy: bool,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for TienditaConfig {
    fn default() -> Self {
        Self {
            database_url: SecretString::from(DEFAULT_DATABASE_URL),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            base_url: "http://localhost:5000".to_owned(),
            admin_email_domain: DEFAULT_ADMIN_EMAIL_DOMAIN.to_owned(),
            payment_approval_rate: DEFAULT_PAYMENT_APPROVAL_RATE,
            catalog_requires_admin: false,
            rate_limit: true,
            trust_proxy: false,
            cors_origins: Vec::new(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl TienditaConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a present value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = lookup("TIENDITA_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map_or(defaults.database_url, SecretString::from);

        let host = match lookup("TIENDITA_HOST") {
            Some(value) => value.trim().parse::<IpAddr>().map_err(|e| {
                ConfigError::InvalidEnvVar("TIENDITA_HOST".to_owned(), e.to_string())
            })?,
            None => defaults.host,
        };

        let port = match lookup("TIENDITA_PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|e| {
                ConfigError::InvalidEnvVar("TIENDITA_PORT".to_owned(), e.to_string())
            })?,
            None => defaults.port,
        };

        let payment_approval_rate = match lookup("TIENDITA_PAYMENT_APPROVAL_RATE") {
            Some(value) => parse_rate("TIENDITA_PAYMENT_APPROVAL_RATE", &value)?,
            None => defaults.payment_approval_rate,
        };

        let catalog_requires_admin = match lookup("TIENDITA_CATALOG_REQUIRES_ADMIN") {
            Some(value) => parse_bool("TIENDITA_CATALOG_REQUIRES_ADMIN", &value)?,
            None => defaults.catalog_requires_admin,
        };

        let rate_limit = match lookup("TIENDITA_RATE_LIMIT") {
            Some(value) => parse_bool("TIENDITA_RATE_LIMIT", &value)?,
            None => defaults.rate_limit,
        };

        let trust_proxy = match lookup("TIENDITA_TRUST_PROXY") {
            Some(value) => parse_bool("TIENDITA_TRUST_PROXY", &value)?,
            None => defaults.trust_proxy,
        };

        let cors_origins = lookup("TIENDITA_CORS_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            host,
            port,
            base_url: lookup("TIENDITA_BASE_URL").unwrap_or(defaults.base_url),
            admin_email_domain: lookup("TIENDITA_ADMIN_EMAIL_DOMAIN")
                .map(|d| d.trim().trim_start_matches('@').to_lowercase())
                .unwrap_or(defaults.admin_email_domain),
            payment_approval_rate,
            catalog_requires_admin,
            rate_limit,
            trust_proxy,
            cors_origins,
            sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.trim().is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a boolean flag (`1/0`, `true/false`, `yes/no`, `on/off`).
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Parse a probability in `[0, 1]`.
fn parse_rate(key: &str, value: &str) -> Result<f64, ConfigError> {
    let rate = value
        .trim()
        .parse::<f64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("must be between 0 and 1 (got {rate})"),
        ));
    }
    Ok(rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<TienditaConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        TienditaConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database_url.expose_secret(), DEFAULT_DATABASE_URL);
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert_eq!(config.admin_email_domain, "tecmilenio.mx");
        assert!((config.payment_approval_rate - 0.8).abs() < f64::EPSILON);
        assert!(!config.catalog_requires_admin);
        assert!(config.rate_limit);
        assert!(!config.trust_proxy);
        assert!(config.cors_origins.is_empty());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "sqlite::memory:")]).unwrap();
        assert_eq!(config.database_url.expose_secret(), "sqlite::memory:");

        let config = load(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("TIENDITA_DATABASE_URL", "sqlite://otra.db"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "sqlite://otra.db");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TIENDITA_HOST", "0.0.0.0"),
            ("TIENDITA_PORT", "8080"),
            ("TIENDITA_BASE_URL", "https://tienda.example.com"),
            ("TIENDITA_ADMIN_EMAIL_DOMAIN", "@Example.COM"),
            ("TIENDITA_PAYMENT_APPROVAL_RATE", "1"),
            ("TIENDITA_CATALOG_REQUIRES_ADMIN", "yes"),
            ("TIENDITA_RATE_LIMIT", "off"),
            ("TIENDITA_TRUST_PROXY", "true"),
            ("TIENDITA_CORS_ORIGINS", "http://a.test, ,http://b.test"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert!(config.is_secure());
        assert_eq!(config.admin_email_domain, "example.com");
        assert!((config.payment_approval_rate - 1.0).abs() < f64::EPSILON);
        assert!(config.catalog_requires_admin);
        assert!(!config.rate_limit);
        assert!(config.trust_proxy);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("TIENDITA_PORT", "cinco mil")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "TIENDITA_PORT"
        ));
        assert!(load(&[("TIENDITA_HOST", "localhost")]).is_err());
        assert!(load(&[("TIENDITA_RATE_LIMIT", "maybe")]).is_err());
        assert!(load(&[("TIENDITA_PAYMENT_APPROVAL_RATE", "1.5")]).is_err());
        assert!(load(&[("TIENDITA_PAYMENT_APPROVAL_RATE", "-0.1")]).is_err());
        assert!(load(&[("TIENDITA_PAYMENT_APPROVAL_RATE", "NaN")]).is_err());
    }

    #[test]
    fn test_empty_sentry_dsn_is_ignored() {
        let config = load(&[("SENTRY_DSN", "  ")]).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
