use figment::{providers::Env, value::UncasedStr, Figment};
use serde::Deserialize;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),
    #[error("BCRYPT_COST must be between {min} and {max}, got {0}", min = crate::password::MIN_BCRYPT_COST, max = crate::password::MAX_BCRYPT_COST)]
    InvalidBcryptCost(u32),
    #[error("{0} must not be empty")]
    EmptySecret(&'static str),
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    /// Postgres connection - if None, everything is kept in memory
    pub database: Option<DatabaseConfig>,
    /// Server port
    pub port: u16,
    /// Server host address
    pub host: std::net::IpAddr,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u32,
    /// Signs the session JWTs
    pub jwt_secret: String,
    /// Signs the cookie carrying the JWT
    pub cookie_secret: String,
    pub bcrypt_cost: u32,
    /// Insert the default levels, frames and postures when their tables are empty
    pub seed_defaults: bool,
    /// Mark cookies `Secure` and `SameSite=None`
    pub secure_cookies: bool,
}

/// Raw configuration loaded directly from environment variables
#[derive(Debug, Deserialize)]
struct RawConfig {
    database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    database_max_connections: u32,

    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_host")]
    host: std::net::IpAddr,
    #[serde(default = "default_shutdown_timeout")]
    shutdown_timeout_seconds: u32,

    #[serde(default = "default_bcrypt_cost")]
    bcrypt_cost: u32,
    #[serde(default = "default_true")]
    seed_defaults: bool,
    #[serde(default = "default_secure_cookies")]
    secure_cookies: bool,

    // Required
    jwt_secret: String,
    cookie_secret: String,
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        if !(crate::password::MIN_BCRYPT_COST..=crate::password::MAX_BCRYPT_COST).contains(&raw.bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(raw.bcrypt_cost));
        }
        if raw.jwt_secret.is_empty() {
            return Err(ConfigError::EmptySecret("JWT_SECRET"));
        }
        if raw.cookie_secret.is_empty() {
            return Err(ConfigError::EmptySecret("COOKIE_SECRET"));
        }

        let database = raw
            .database_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseConfig {
                url,
                max_connections: raw.database_max_connections,
            });

        Ok(Config {
            database,
            port: raw.port,
            host: raw.host,
            shutdown_timeout_seconds: raw.shutdown_timeout_seconds,
            jwt_secret: raw.jwt_secret,
            cookie_secret: raw.cookie_secret,
            bcrypt_cost: raw.bcrypt_cost,
            seed_defaults: raw.seed_defaults,
            secure_cookies: raw.secure_cookies,
        })
    }
}

fn default_host() -> std::net::IpAddr {
    std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u32 {
    5
}

fn default_max_connections() -> u32 {
    10
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_secure_cookies() -> bool {
    !cfg!(debug_assertions)
}

fn figment() -> Figment {
    Figment::new().merge(Env::raw().map(|key| {
        if key == UncasedStr::new("RAILWAY_DEPLOYMENT_DRAINING_SECONDS") {
            "SHUTDOWN_TIMEOUT_SECONDS".into()
        } else {
            key.into()
        }
    }))
}

pub fn load_config() -> Result<Config, ConfigError> {
    figment().extract().map_err(|e| ConfigError::Figment(Box::new(e)))
}

/// A configuration for tests: in-memory storage and the cheapest bcrypt cost.
pub fn test_config() -> Config {
    Config {
        database: None,
        port: 0,
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
        shutdown_timeout_seconds: 5,
        jwt_secret: "test_jwt_secret_key_for_testing_only".to_string(),
        cookie_secret: "test_cookie_secret_for_testing_only".to_string(),
        bcrypt_cost: crate::password::MIN_BCRYPT_COST,
        seed_defaults: true,
        secure_cookies: false,
    }
}
