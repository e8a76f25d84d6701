use std::sync::Arc;

use auth_gate::{
    app,
    config::HashingConfig,
    crypto::token::TokenSigner,
    repositories::user::{MemoryUserStore, UserStore},
    state::AppState,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &[u8] = b"integration-test-secret";

// Shared test context
struct TestContext {
    router: Router,
    store: Arc<MemoryUserStore>,
    tokens: TokenSigner,
}

struct TestResponse {
    status: StatusCode,
    set_cookie: Vec<String>,
    body: Value,
}

impl TestContext {
    fn new() -> Self {
        let store = Arc::new(MemoryUserStore::new());
        let tokens = TokenSigner::new(SECRET);
        let state = AppState::from_parts(
            store.clone(),
            tokens.clone(),
            HashingConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            7,
        )
        .unwrap();

        Self {
            router: app(state),
            store,
            tokens,
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            set_cookie,
            body,
        }
    }

    async fn post(&self, path: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn signup(&self, fullname: &str, username: &str, password: &str) -> TestResponse {
        self.post(
            "/signup",
            json!({ "fullname": fullname, "username": username, "password": password }),
        )
        .await
    }

    async fn signin(&self, username: &str, password: &str) -> TestResponse {
        self.post(
            "/signin",
            json!({ "username": username, "password": password }),
        )
        .await
    }

    async fn logout(&self, cookie: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri("/logout");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }
}

impl TestResponse {
    fn token_cookie(&self) -> &str {
        self.set_cookie
            .iter()
            .find(|c| c.starts_with("token="))
            .expect("token cookie not set")
    }

    fn token(&self) -> &str {
        let cookie = self.token_cookie();
        let pair = cookie.split(';').next().unwrap();
        pair.trim_start_matches("token=")
    }
}

fn assert_session_attributes(cookie: &str) {
    assert!(cookie.contains("HttpOnly"), "{cookie}");
    assert!(cookie.contains("Secure"), "{cookie}");
    assert!(cookie.contains("SameSite=None"), "{cookie}");
    assert!(cookie.contains("Path=/"), "{cookie}");
}

#[tokio::test]
async fn signup_sets_session_cookie() {
    let context = TestContext::new();

    let response = context.signup("A B", "ab", "secret1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "message": "User registered successfully" }));

    let cookie = response.token_cookie();
    assert_session_attributes(cookie);
    assert!(cookie.contains("Max-Age=604800"), "{cookie}");

    let claims = context.tokens.verify(response.token()).unwrap();
    assert_eq!(claims.username, "ab");
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let context = TestContext::new();
    assert_eq!(context.signup("A B", "ab", "secret1").await.status, StatusCode::OK);

    let response = context.signup("Someone Else", "ab", "other-pass").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body, json!({ "message": "User already exists" }));
    assert!(response.set_cookie.is_empty());

    let stored = context.store.find_by_username("ab").await.unwrap().unwrap();
    assert_eq!(stored.fullname, "A B");
    assert_ne!(stored.password, "secret1");
}

#[tokio::test]
async fn signup_requires_every_field() {
    let context = TestContext::new();

    let response = context.signup("", "ab", "secret1").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].as_str().unwrap().contains("fullname"));
    assert!(context.store.is_empty().await);
}

#[tokio::test]
async fn signup_with_absent_field_is_a_json_400() {
    let context = TestContext::new();

    let response = context
        .post("/signup", json!({ "fullname": "A B", "username": "ab" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].as_str().unwrap().contains("password"));
    assert!(context.store.is_empty().await);
}

#[tokio::test]
async fn malformed_body_is_a_json_400() {
    let context = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/signin")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();
    let response = context.send(request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].is_string());
}

#[tokio::test]
async fn signin_with_correct_password() {
    let context = TestContext::new();
    context.signup("A B", "ab", "secret1").await;

    let response = context.signin("ab", "secret1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "message": "User signed in successfully" }));
    assert_session_attributes(response.token_cookie());
    assert_eq!(context.tokens.verify(response.token()).unwrap().username, "ab");

    let first = context
        .store
        .find_by_username("ab")
        .await
        .unwrap()
        .unwrap()
        .last_sign_in
        .expect("last_sign_in recorded");

    assert_eq!(context.signin("ab", "secret1").await.status, StatusCode::OK);
    let second = context
        .store
        .find_by_username("ab")
        .await
        .unwrap()
        .unwrap()
        .last_sign_in
        .unwrap();
    assert!(second >= first);
}

#[tokio::test]
async fn signin_failures_are_indistinguishable() {
    let context = TestContext::new();
    context.signup("A B", "ab", "secret1").await;

    let wrong_password = context.signin("ab", "wrong").await;
    let unknown_user = context.signin("nobody", "secret1").await;

    assert_eq!(wrong_password.status, StatusCode::NOT_FOUND);
    assert_eq!(
        wrong_password.body,
        json!({ "message": "Username or password is incorrect!" })
    );
    assert_eq!(unknown_user.status, wrong_password.status);
    assert_eq!(unknown_user.body, wrong_password.body);
    assert!(wrong_password.set_cookie.is_empty());
    assert!(unknown_user.set_cookie.is_empty());

    let stored = context.store.find_by_username("ab").await.unwrap().unwrap();
    assert!(stored.last_sign_in.is_none());
}

#[tokio::test]
async fn logout_clears_cookie_without_session() {
    let context = TestContext::new();

    let response = context.logout(None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "message": "User logged out successfully" }));

    let cookie = response.token_cookie();
    assert!(cookie.starts_with("token=;"), "{cookie}");
    assert!(cookie.contains("Max-Age=0"), "{cookie}");
    assert_session_attributes(cookie);
}

#[tokio::test]
async fn logout_after_signin_is_idempotent() {
    let context = TestContext::new();
    let signed_up = context.signup("A B", "ab", "secret1").await;
    let cookie = format!("token={}", signed_up.token());

    for _ in 0..2 {
        let response = context.logout(Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.token_cookie().contains("Max-Age=0"));
    }

    // No revocation: the token still verifies after logout.
    assert!(context.tokens.verify(signed_up.token()).is_ok());
}
