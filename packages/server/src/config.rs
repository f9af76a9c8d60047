use anyhow::{Context, Result};
use chrono::Duration as ChronoDuration;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domains::auth::HashingCost;
use crate::kernel::TokenTtls;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub env: String,
    pub db_max_connections: u32,
    pub store_timeout: Duration,
    pub request_timeout: Duration,
    pub activation_token_ttl_hours: i64,
    pub auth_token_ttl_minutes: i64,
    pub password_hash_iterations: u32,
    pub password_hash_memory_kib: u32,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_or("PORT", 8081)?,
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            store_timeout: Duration::from_secs(parse_or("STORE_TIMEOUT_SECS", 3)?),
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 10)?),
            activation_token_ttl_hours: parse_or("ACTIVATION_TOKEN_TTL_HOURS", 72)?,
            auth_token_ttl_minutes: parse_or("AUTH_TOKEN_TTL_MINUTES", 60)?,
            password_hash_iterations: parse_or("PASSWORD_HASH_ITERATIONS", 3)?,
            password_hash_memory_kib: parse_or("PASSWORD_HASH_MEMORY_KIB", 19 * 1024)?,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
        })
    }

    pub fn token_ttls(&self) -> TokenTtls {
        TokenTtls {
            activation: ChronoDuration::hours(self.activation_token_ttl_hours),
            authentication: ChronoDuration::minutes(self.auth_token_ttl_minutes),
        }
    }

    pub fn hashing_cost(&self) -> HashingCost {
        HashingCost {
            iterations: self.password_hash_iterations,
            memory_kib: self.password_hash_memory_kib,
            ..HashingCost::default()
        }
    }
}

fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list("http://localhost:3000, https://dishes.example.com,"),
            vec!["http://localhost:3000", "https://dishes.example.com"]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_parse_or_default_and_error() {
        assert_eq!(parse_or::<u16>("DISHES_TEST_UNSET_VARIABLE", 42).unwrap(), 42);

        env::set_var("DISHES_TEST_BAD_NUMBER", "twelve");
        let err = parse_or::<u32>("DISHES_TEST_BAD_NUMBER", 1).unwrap_err();
        assert!(err.to_string().contains("DISHES_TEST_BAD_NUMBER"));
        env::remove_var("DISHES_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_derived_settings() {
        let config = Config {
            database_url: "postgres://localhost/dishes".into(),
            port: 8081,
            env: "test".into(),
            db_max_connections: 10,
            store_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(10),
            activation_token_ttl_hours: 72,
            auth_token_ttl_minutes: 60,
            password_hash_iterations: 2,
            password_hash_memory_kib: 1024,
            allowed_origins: vec![],
        };

        assert_eq!(config.token_ttls(), TokenTtls::default());
        let cost = config.hashing_cost();
        assert_eq!((cost.iterations, cost.memory_kib, cost.parallelism), (2, 1024, 1));
    }
}
