use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// Origin of the local frontend dev server, always allowed by CORS.
pub const DEV_CLIENT_ORIGIN: &str = "http://localhost:5173";

/// Argon2id cost parameters used when hashing new passwords.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// Secret used to sign session tokens.
    pub access_token_secret: Zeroizing<Vec<u8>>,
    /// Frontend origin allowed to make credentialed cross-origin requests.
    pub client_url: Option<String>,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Lifetime of the session cookie in days.
    pub session_duration_days: i64,
    pub hashing: HashingConfig,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        let secret = env::var("ACCESS_TOKEN_SECRET")
            .context("ACCESS_TOKEN_SECRET must be set (generate with: openssl rand -hex 32)")?;
        if secret.is_empty() {
            anyhow::bail!("ACCESS_TOKEN_SECRET must not be empty");
        }

        let defaults = HashingConfig::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            access_token_secret: Zeroizing::new(secret.into_bytes()),
            client_url: env::var("CLIENT_URL").ok().filter(|url| !url.trim().is_empty()),
            port: parse_or("PORT", 3000)?,
            session_duration_days: parse_or("SESSION_DURATION_DAYS", 7)?,
            hashing: HashingConfig {
                memory_kib: parse_or("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
                iterations: parse_or("ARGON2_ITERATIONS", defaults.iterations)?,
                parallelism: parse_or("ARGON2_PARALLELISM", defaults.parallelism)?,
            },
        })
    }

    /// Origins allowed by the CORS layer, configured client first.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = self.client_url.iter().cloned().collect();
        if !origins.iter().any(|o| o == DEV_CLIENT_ORIGIN) {
            origins.push(DEV_CLIENT_ORIGIN.to_string());
        }
        origins
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}")),
        Err(_) => Ok(default),
    }
}
