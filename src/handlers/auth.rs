use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::{SameSite, time::Duration};
use tower_cookies::{Cookie, Cookies};

use crate::{
    error::{AppError, Result},
    services::auth as auth_service,
    state::AppState,
    validation::auth::validate_request,
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// The request payload for user registration.
///
/// Absent fields default to empty so the presence checks report them.
#[derive(Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupRequest {
    #[garde(length(min = 1))]
    pub fullname: String,
    #[garde(length(min = 1))]
    pub username: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// The request payload for user signin.
#[derive(Default, Deserialize, Validate)]
#[serde(default)]
pub struct SigninRequest {
    #[garde(length(min = 1))]
    pub username: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn ok(message: &str) -> Response {
        (
            StatusCode::OK,
            Json(MessageResponse {
                message: message.to_string(),
            }),
        )
            .into_response()
    }
}

/// Unwraps a JSON body, turning axum's rejection into a 400 with a message body.
fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Builds the session cookie. Issuance and removal share this attribute set,
/// otherwise browsers would keep the original cookie on logout.
fn session_cookie(value: String, max_age_days: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::None);
    cookie.set_path("/");
    cookie.set_max_age(Duration::days(max_age_days));
    cookie
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Response> {
    let payload = json_body(payload)?;
    tracing::info!("📝 Signup attempt for: {}", payload.username);
    validate_request(&payload)?;

    let issued = auth_service::signup(
        &state,
        payload.fullname,
        payload.username,
        payload.password,
    )
    .await?;

    cookies.add(session_cookie(issued.token, state.session_duration_days));
    tracing::info!("✅ User registered: {}", issued.user.username);

    Ok(MessageResponse::ok("User registered successfully"))
}

/// Handles user signin.
#[axum::debug_handler]
pub async fn signin(
    State(state): State<AppState>,
    cookies: Cookies,
    payload: std::result::Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Response> {
    let payload = json_body(payload)?;
    tracing::info!("🔐 Signin attempt for: {}", payload.username);
    validate_request(&payload)?;

    let issued = auth_service::signin(&state, &payload.username, &payload.password).await?;

    cookies.add(session_cookie(issued.token, state.session_duration_days));
    tracing::info!("✅ User signed in: {}", issued.user.username);

    Ok(MessageResponse::ok("User signed in successfully"))
}

/// Handles user logout.
///
/// Always sends a removal cookie, whether or not the request carried one.
/// The token itself stays valid; there is no server-side revocation.
#[axum::debug_handler]
pub async fn logout(cookies: Cookies) -> Response {
    let mut cookie = session_cookie(String::new(), 0);
    cookie.make_removal();
    cookies.add(cookie);

    tracing::info!("👋 Session cookie cleared");

    MessageResponse::ok("User logged out successfully")
}
