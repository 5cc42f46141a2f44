use std::fmt;

use anyhow::{Result, bail};
use dotenvy::dotenv;
use serde::Deserialize;

/// Prefix of `DATABASE_URL` values that select the in-memory store.
pub const MEMORY_DATABASE_PREFIX: &str = "memory:";

/// Configuration for the application
#[derive(Deserialize)]
pub struct Config {
    /// Database connection URL, or `memory:` for the seeded in-memory store
    pub database_url: String,
    /// Secret used to sign session cookies
    pub auth_secret: String,
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Lifetime of a login session in seconds
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Upper bound on pooled Postgres connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    /// Apply the bundled migrations on startup
    #[serde(default)]
    pub run_migrations: bool,
    /// Mark the session cookie `Secure`; disable only for plain-HTTP development
    #[serde(default = "default_session_cookie_secure")]
    pub session_cookie_secure: bool,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_session_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_session_cookie_secure() -> bool {
    true
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Parse environment variables into Config struct
        let config = envy::from_env::<Config>()?;
        config.validate()?;

        Ok(config)
    }

    /// Build a configuration from explicit `(NAME, value)` pairs instead of the process environment
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            bail!("DATABASE_URL must not be empty");
        }
        if self.auth_secret.trim().is_empty() {
            bail!("AUTH_SECRET must not be empty");
        }
        if self.db_max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        Ok(())
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with(MEMORY_DATABASE_PREFIX)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("run_migrations", &self.run_migrations)
            .field("session_cookie_secure", &self.session_cookie_secure)
            .finish_non_exhaustive()
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}
