/// Configuration management for Status Service
///
/// This module handles loading and managing configuration from environment variables.
/// A `.env` file is honoured in development through `dotenvy` (see `main.rs`).
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard ceiling on feed pages and batched identity lookups.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Redis configuration (rate limiter backend)
    pub redis: RedisConfig,
    /// Post rate limit policy
    pub rate_limit: RateLimitConfig,
    /// Identity provider API
    pub identity: IdentityConfig,
    /// Session token verification
    pub session: SessionConfig,
    /// Feed page sizing
    pub feed: FeedConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Actix worker count
    pub workers: usize,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Timeout for acquiring a connection
    pub connect_timeout_secs: u64,
    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL
    pub url: String,
}

/// Sliding-window limit applied to post creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Admissions allowed per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_seconds: u64,
    /// Key namespace inside the shared Redis
    pub prefix: String,
    /// Redis round-trip budget; exceeding it fails the write
    pub timeout_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 3,
            window_seconds: 60,
            prefix: "status-service:ratelimit:posts".to_string(),
            timeout_ms: 500,
        }
    }
}

/// Identity provider API
#[derive(Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the user directory API
    pub api_url: String,
    /// Backend secret key sent as bearer token
    pub secret_key: String,
    /// Per-request timeout
    pub timeout_ms: u64,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_url", &self.api_url)
            .field("secret_key", &"[REDACTED]")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Session token verification
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// RS256 public key (PEM) of the identity provider
    pub public_key_pem: Option<String>,
    /// HS256 shared secret, development only
    pub hmac_secret: Option<String>,
    /// Expected `iss` claim
    pub issuer: Option<String>,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("public_key_pem", &self.public_key_pem.as_ref().map(|_| "[SET]"))
            .field("hmac_secret", &self.hmac_secret.as_ref().map(|_| "[REDACTED]"))
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Posts per feed read
    pub page_size: i64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("STATUS_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("STATUS_SERVICE_PORT", 8080)?,
                workers: parse_env_or_default("STATUS_SERVICE_WORKERS", 4)?,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/status".to_string()),
                max_connections: parse_env_or_default("DATABASE_MAX_CONNECTIONS", 10)?,
                connect_timeout_secs: parse_env_or_default("DATABASE_CONNECT_TIMEOUT_SECS", 5)?,
                run_migrations: parse_env_or_default("DATABASE_RUN_MIGRATIONS", true)?,
            },
            redis: RedisConfig {
                url: std::env::var("REDIS_URL")
                    .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            },
            rate_limit: {
                let defaults = RateLimitConfig::default();
                let cfg = RateLimitConfig {
                    max_requests: parse_env_or_default(
                        "POST_RATE_LIMIT_MAX_REQUESTS",
                        defaults.max_requests,
                    )?,
                    window_seconds: parse_env_or_default(
                        "POST_RATE_LIMIT_WINDOW_SECS",
                        defaults.window_seconds,
                    )?,
                    prefix: std::env::var("POST_RATE_LIMIT_PREFIX").unwrap_or(defaults.prefix),
                    timeout_ms: parse_env_or_default(
                        "POST_RATE_LIMIT_TIMEOUT_MS",
                        defaults.timeout_ms,
                    )?,
                };
                if cfg.max_requests == 0 || cfg.window_seconds == 0 {
                    return Err(
                        "POST_RATE_LIMIT_MAX_REQUESTS and POST_RATE_LIMIT_WINDOW_SECS must be positive"
                            .to_string(),
                    );
                }
                cfg
            },
            identity: {
                let secret_key = std::env::var("IDENTITY_SECRET_KEY").unwrap_or_default();
                if production && secret_key.trim().is_empty() {
                    return Err("IDENTITY_SECRET_KEY must be set in production".to_string());
                }

                IdentityConfig {
                    api_url: std::env::var("IDENTITY_API_URL")
                        .unwrap_or_else(|_| "https://api.clerk.com".to_string()),
                    secret_key,
                    timeout_ms: parse_env_or_default("IDENTITY_TIMEOUT_MS", 3_000)?,
                }
            },
            session: {
                let cfg = SessionConfig {
                    public_key_pem: non_empty_env("SESSION_JWT_PUBLIC_KEY")
                        .map(|pem| pem.replace("\\n", "\n")),
                    hmac_secret: non_empty_env("SESSION_JWT_SECRET"),
                    issuer: non_empty_env("SESSION_JWT_ISSUER"),
                };
                if production && cfg.public_key_pem.is_none() {
                    return Err("SESSION_JWT_PUBLIC_KEY must be set in production".to_string());
                }
                cfg
            },
            feed: FeedConfig {
                page_size: parse_env_or_default("FEED_PAGE_SIZE", MAX_PAGE_SIZE)?
                    .clamp(1, MAX_PAGE_SIZE),
            },
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
