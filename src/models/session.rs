use serde::{Deserialize, Serialize};

/// Claims carried by the session token.
///
/// There is no `exp` claim: the token stays valid as long as its signature
/// does, and its practical lifetime is bounded by the cookie's max-age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The username the token was issued to.
    pub username: String,
    /// Issued at (Unix timestamp, seconds).
    pub iat: i64,
}
