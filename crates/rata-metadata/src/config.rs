//! Configuration for the feed and the target database
//!
//! Both structures are built once by the binary (from CLI flags, the
//! environment and `.env`) and passed into the components that need them.

use crate::error::{RataError, Result};
use sqlx::postgres::PgConnectOptions;

// ============================================================================
// Feed Configuration Constants
// ============================================================================

/// Network Rail open data feed root
pub const DEFAULT_FEED_URL: &str = "https://publicdatafeeds.networkrail.co.uk/ntrod";

// ============================================================================
// Database Configuration Constants
// ============================================================================

pub const DEFAULT_DATABASE_HOST: &str = "localhost";

pub const DEFAULT_DATABASE_PORT: u16 = 5432;

/// Credentials and endpoint for the reference data feed
#[derive(Clone)]
pub struct FeedConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Whole-request timeout; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
}

impl FeedConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_FEED_URL.to_string(),
            username: username.into(),
            password: password.into(),
            timeout_secs: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Load from `NROD_FEED_USERNAME`, `NROD_FEED_PASSWORD`, `NROD_FEED_URL`
    /// and `NROD_FEED_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let username = std::env::var("NROD_FEED_USERNAME")
            .map_err(|_| RataError::config("NROD_FEED_USERNAME not set"))?;
        let password = std::env::var("NROD_FEED_PASSWORD")
            .map_err(|_| RataError::config("NROD_FEED_PASSWORD not set"))?;

        let base_url =
            std::env::var("NROD_FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());

        let timeout_secs = std::env::var("NROD_FEED_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok());

        let config = Self::new(username, password)
            .with_base_url(base_url)
            .with_timeout_secs(timeout_secs);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(RataError::config("Feed URL cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(RataError::config(format!(
                "Feed URL must be http(s), got '{}'",
                self.base_url
            )));
        }

        if self.username.is_empty() || self.password.is_empty() {
            return Err(RataError::config(
                "Feed username and password are required. Set NROD_FEED_USERNAME and NROD_FEED_PASSWORD.",
            ));
        }

        if self.timeout_secs == Some(0) {
            return Err(RataError::config("Feed timeout must be greater than 0"));
        }

        Ok(())
    }
}

impl std::fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Connection parameters for the reference database
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub username: String,
    pub password: Option<String>,
}

impl DatabaseConfig {
    pub fn new(dbname: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: DEFAULT_DATABASE_HOST.to_string(),
            port: DEFAULT_DATABASE_PORT,
            dbname: dbname.into(),
            username: username.into(),
            password: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dbname.is_empty() {
            return Err(RataError::config("Database name cannot be empty"));
        }

        if self.username.is_empty() {
            return Err(RataError::config("Database username cannot be empty"));
        }

        if self.port == 0 {
            return Err(RataError::config("Database port must be greater than 0"));
        }

        Ok(())
    }

    /// Connection options; a missing password falls back to libpq
    /// conventions (`PGPASSWORD`, `.pgpass`) handled by sqlx
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.dbname)
            .username(&self.username)
            .application_name("rata-metadata");

        match self.password {
            Some(ref password) => options.password(password),
            None => options,
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
