use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Where ranked match lists are cached between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            other => bail!("CACHE_BACKEND must be 'redis' or 'memory', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub cache_backend: CacheBackend,
    pub port: u16,
    pub rust_log: String,
    pub match_cache_ttl: Duration,
    pub job_write_timeout: Duration,
    /// How many jobs the matching-jobs widget shows.
    pub matching_jobs_limit: usize,
    /// Jobs younger than this carry the "NEW" badge.
    pub new_job_window: chrono::Duration,
    /// Upper bound on job postings read per match computation.
    pub job_fetch_limit: i64,
    pub enable_realtime: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let cache_backend: CacheBackend = optional_env("CACHE_BACKEND", CacheBackend::Redis)?;
        let redis_url = match cache_backend {
            CacheBackend::Redis => Some(require_env("REDIS_URL")?),
            CacheBackend::Memory => std::env::var("REDIS_URL").ok(),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url,
            cache_backend,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            match_cache_ttl: Duration::from_secs(optional_env("MATCH_CACHE_TTL_SECS", 300)?),
            job_write_timeout: Duration::from_secs(optional_env("JOB_WRITE_TIMEOUT_SECS", 10)?),
            matching_jobs_limit: optional_env("MATCHING_JOBS_LIMIT", 6)?,
            new_job_window: chrono::Duration::hours(optional_env("NEW_JOB_WINDOW_HOURS", 24)?),
            job_fetch_limit: optional_env("JOB_FETCH_LIMIT", 200)?,
            enable_realtime: optional_env("ENABLE_REALTIME", true)?,
        })
    }

    /// Defaults for tests: in-memory cache, no realtime listener.
    #[cfg(test)]
    pub fn for_local(database_url: &str) -> Self {
        Config {
            database_url: database_url.to_string(),
            redis_url: None,
            cache_backend: CacheBackend::Memory,
            port: 8080,
            rust_log: "info".to_string(),
            match_cache_ttl: Duration::from_secs(300),
            job_write_timeout: Duration::from_secs(10),
            matching_jobs_limit: 6,
            new_job_window: chrono::Duration::hours(24),
            job_fetch_limit: 200,
            enable_realtime: false,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}
