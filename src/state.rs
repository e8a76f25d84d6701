use std::sync::Arc;

use crate::config::{Config, HashingConfig};
use crate::crypto::{password, token::TokenSigner};
use crate::error::Result;
use crate::repositories::user::UserStore;

/// The application's state, cloned into every request.
///
/// The store handle and token secret are injected here rather than read from
/// globals, so handlers can run against any [`UserStore`].
#[derive(Clone)]
pub struct AppState {
    /// The credential store.
    pub users: Arc<dyn UserStore>,
    /// Signs session tokens.
    pub tokens: TokenSigner,
    /// Argon2 parameters for new hashes.
    pub hashing: HashingConfig,
    /// Hash verified when a signin names an unknown user. Built with `hashing`.
    pub dummy_hash: Arc<str>,
    /// Lifetime of the session cookie in days.
    pub session_duration_days: i64,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    /// * `users` - The credential store to authenticate against.
    pub fn new(config: &Config, users: Arc<dyn UserStore>) -> Result<Self> {
        let tokens = TokenSigner::new(&config.access_token_secret);
        tracing::info!("✅ Token signer initialized");

        Self::from_parts(users, tokens, config.hashing, config.session_duration_days)
    }

    /// Assembles a state from already-built parts.
    pub fn from_parts(
        users: Arc<dyn UserStore>,
        tokens: TokenSigner,
        hashing: HashingConfig,
        session_duration_days: i64,
    ) -> Result<Self> {
        let dummy_hash = password::dummy_hash(&hashing)?;

        Ok(Self {
            users,
            tokens,
            hashing,
            dummy_hash: Arc::from(dummy_hash),
            session_duration_days,
        })
    }
}
