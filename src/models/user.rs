use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents a user in the system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's full name.
    pub fullname: String,
    /// The user's username. Unique and never changed after creation.
    pub username: String,
    /// The user's hashed password (PHC string).
    pub password: String,
    /// The timestamp of the user's last successful signin.
    pub last_sign_in: Option<DateTime<Utc>>,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
}

/// A user that has not been persisted yet.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub fullname: String,
    pub username: String,
    /// Already hashed.
    pub password: String,
}
