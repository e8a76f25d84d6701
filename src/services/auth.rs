use chrono::Utc;

use crate::crypto::password;
use crate::error::{AppError, Result};
use crate::models::user::{NewUser, User};
use crate::repositories::user::USER_EXISTS_MESSAGE;
use crate::state::AppState;

/// A user together with the session token issued to them.
#[derive(Debug)]
pub struct IssuedSession {
    pub user: User,
    pub token: String,
}

/// Registers a new user and issues their first session token.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `fullname` - The user's full name.
/// * `username` - The requested username.
/// * `password` - The plaintext password. Only its hash is stored.
///
/// # Returns
///
/// The persisted user and a signed token, or [`AppError::Conflict`] when the
/// username is taken.
pub async fn signup(
    state: &AppState,
    fullname: String,
    username: String,
    password: String,
) -> Result<IssuedSession> {
    tracing::debug!("🔐 Creating user: {}", username);

    // Best-effort pre-check; the store closes the race.
    if state.users.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict(USER_EXISTS_MESSAGE.to_string()));
    }

    let hashed_password = password::hash_password(&password, &state.hashing)?;

    let user = state
        .users
        .create(NewUser {
            fullname,
            username,
            password: hashed_password,
        })
        .await?;

    let token = state.tokens.sign(&user.username)?;

    tracing::info!("✅ User created with ID: {}", user.id);
    Ok(IssuedSession { user, token })
}

/// Authenticates a user, records the signin time and issues a session token.
///
/// Unknown usernames and wrong passwords both yield
/// [`AppError::InvalidCredentials`], after the same amount of hashing work.
pub async fn signin(state: &AppState, username: &str, password: &str) -> Result<IssuedSession> {
    tracing::debug!("🔐 Authenticating user: {}", username);

    let Some(mut user) = state.users.find_by_username(username).await? else {
        password::verify_dummy(&state.dummy_hash, password);
        return Err(AppError::InvalidCredentials);
    };

    if !password::verify_password(password, &user.password)? {
        return Err(AppError::InvalidCredentials);
    }

    let now = Utc::now();
    user.last_sign_in = Some(match user.last_sign_in {
        Some(previous) if previous > now => previous,
        _ => now,
    });
    let user = state.users.save(&user).await?;

    let token = state.tokens.sign(&user.username)?;

    tracing::info!("✅ User authenticated: {}", user.id);
    Ok(IssuedSession { user, token })
}
