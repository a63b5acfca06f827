//! Application settings and configuration structures.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// Redis configuration
    pub redis: RedisSettings,

    /// Which backends hold entities and one-time passcodes
    pub storage: StorageSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// One-time passcode settings
    pub otp: OtpSettings,

    /// Mail relay settings
    pub email: EmailSettings,

    /// Captcha verification settings
    pub captcha: CaptchaSettings,

    /// Remote log collector settings
    pub log_shipping: LogShippingSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,

    /// Apply pending migrations at startup
    pub run_migrations: bool,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    /// Redis connection URL
    pub url: String,

    /// Key prefix for cached passcodes
    pub otp_prefix: String,
}

/// Entity store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Passcode cache backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpCacheBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub otp_cache: OtpCacheBackend,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Bearer token lifetime in minutes
    pub token_expiry_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtpSettings {
    /// How long a generated passcode stays valid
    pub ttl_seconds: u64,

    /// Subject line of the passcode email
    pub email_subject: String,
}

impl OtpSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Mail relay configuration.
///
/// Messages are posted as JSON to `relay_url`. Sending fails with a
/// configuration error while the URL or the sender address is unset.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    pub relay_url: Option<String>,
    pub api_key: Option<String>,
    pub from_address: Option<String>,
    pub timeout_secs: u64,
}

/// reCAPTCHA-compatible verification endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaSettings {
    pub verify_url: String,
    pub secret: Option<String>,
    pub timeout_secs: u64,
}

/// Remote log collector.
///
/// With no endpoint configured, log entries only go to `tracing`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogShippingSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env); empty allows any origin
    pub allowed_origins: Vec<String>,
    /// How long browsers may cache a preflight answer
    pub max_age_secs: u64,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::builder(&environment)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=3000 -> server.port = 3000
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("redis.url", std::env::var("REDIS_URL").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .build()?
            .try_deserialize()
            .and_then(Self::validated)
    }

    /// Settings built from defaults only, with the given JWT secret.
    ///
    /// Both backends are in memory, so nothing external is required.
    pub fn in_memory(jwt_secret: &str) -> Result<Self, ConfigError> {
        Self::builder("test")?
            .set_override("storage.backend", "memory")?
            .set_override("storage.otp_cache", "memory")?
            .set_override("jwt.secret", jwt_secret)?
            .build()?
            .try_deserialize()
            .and_then(Self::validated)
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "postgres://localhost:5432/auth_backend")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("redis.otp_prefix", "otp:")?
            .set_default("storage.backend", "postgres")?
            .set_default("storage.otp_cache", "redis")?
            .set_default("jwt.secret", "")?
            .set_default("jwt.token_expiry_minutes", 60)?
            .set_default("otp.ttl_seconds", 300)?
            .set_default("otp.email_subject", "Your one-time passcode")?
            .set_default("email.timeout_secs", 10)?
            .set_default(
                "captcha.verify_url",
                "https://www.google.com/recaptcha/api/siteverify",
            )?
            .set_default("captcha.timeout_secs", 10)?
            .set_default("log_shipping.timeout_secs", 5)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])?
            .set_default("cors.max_age_secs", 3600)
    }

    fn validated(settings: Self) -> Result<Self, ConfigError> {
        if settings.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters for security. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                settings.jwt.secret.len()
            )));
        }
        if settings.otp.ttl_seconds == 0 {
            return Err(ConfigError::Message(
                "otp.ttl_seconds must be greater than zero".into(),
            ));
        }
        Ok(settings)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerSettings {
    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
