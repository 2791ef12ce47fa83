use std::env;
use std::str::FromStr;

use thiserror::Error;

const DEV_JWT_SECRET: &str = "development-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Required(&'static str),
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,
    pub app_env: String,
    pub seed_demo_account: bool,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub name_cache_ttl: u64,
    pub time_option_interval: u32,
    pub log_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:3001".to_string(),
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_token_ttl: 86_400, // 24h
            app_env: "development".to_string(),
            seed_demo_account: true,
            rate_login_per_min: 60,
            rate_protected_per_min: 1000,
            name_cache_ttl: 300,
            time_option_interval: 15,
            log_dir: "logs".to_string(),
        }
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// True when `JWT_SECRET` was not set outside production.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let app_env = env::var("APP_ENV").unwrap_or(defaults.app_env);
        let production = app_env == "production";

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if production => return Err(ConfigError::Required("JWT_SECRET")),
            _ => defaults.jwt_secret,
        };

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret,
            access_token_ttl: parse_var("ACCESS_TOKEN_TTL", defaults.access_token_ttl)?,
            seed_demo_account: parse_var("SEED_DEMO_ACCOUNT", !production)?,
            app_env,

            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", defaults.rate_login_per_min)?,
            rate_protected_per_min: parse_var(
                "RATE_PROTECTED_PER_MIN",
                defaults.rate_protected_per_min,
            )?,

            name_cache_ttl: parse_var("NAME_CACHE_TTL", defaults.name_cache_ttl)?,
            time_option_interval: parse_var(
                "TIME_OPTION_INTERVAL",
                defaults.time_option_interval,
            )?,
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
        })
    }
}
