use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;

use super::InfraError;

pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub redis_url: String,
    /// Lifetime of the cached active-meetings listing.
    pub listing_cache_ttl_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    /// Whether to trust X-Forwarded-For headers. Only enable behind a reverse proxy.
    pub trust_proxy: bool,
    /// JSON log file. Empty disables file logging.
    pub log_file: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());

        let access_token_ttl_secs: i64 = get_env_default("ACCESS_TOKEN_TTL_SECS", 30 * 86_400);

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid { var: "CORS_ORIGIN" })?;

        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3001)));
        let database_url: String = get_env("DATABASE_URL");
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 5);
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let listing_cache_ttl_secs: u64 = get_env_default("LISTING_CACHE_TTL_SECS", 300);
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 120);
        // Default to false - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);
        let log_file: String = get_env_default("LOG_FILE", "app.log".to_string());

        if listing_cache_ttl_secs == 0 {
            return Err(InfraError::ConfigInvalid {
                var: "LISTING_CACHE_TTL_SECS",
            });
        }

        Ok(Self {
            jwt_secret,
            access_token_ttl: Duration::seconds(access_token_ttl_secs),
            cors_origin,
            bind_addr,
            database_url,
            db_max_connections,
            redis_url,
            listing_cache_ttl_secs,
            rate_limit_window_secs,
            rate_limit_per_ip,
            trust_proxy,
            log_file,
        })
    }
}
