//! Signup form rules for the web client.
//!
//! These checks are advisory and run before a request is ever sent; the
//! server does not rely on them.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Minimum length of the trimmed full name.
pub const MIN_NAME_LEN: usize = 2;
/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 6;
/// Length from which a password earns a strength point.
pub const STRONG_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email regex is valid")
});

/// A form field that can carry an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

/// The signup form as typed by the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Human-readable password strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strength {
    Empty,
    Weak,
    Medium,
    Strong,
}

impl Strength {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Strength::Empty,
            1 => Strength::Weak,
            2 => Strength::Medium,
            _ => Strength::Strong,
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strength::Empty => "Empty",
            Strength::Weak => "Weak",
            Strength::Medium => "Medium",
            Strength::Strong => "Strong",
        };
        f.write_str(label)
    }
}

/// Length as a browser reports it: UTF-16 code units, so an emoji counts twice.
pub fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Scores a password from 0 to 3.
///
/// One point each for: at least 8 UTF-16 code units, both ASCII upper and lower
/// case letters, an ASCII digit or any character outside `[A-Za-z0-9]`.
pub fn password_strength(password: &str) -> u8 {
    if password.is_empty() {
        return 0;
    }

    let mut score = 0;
    if text_len(password) >= STRONG_PASSWORD_LEN {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
    {
        score += 1;
    }
    if password
        .chars()
        .any(|c| c.is_ascii_digit() || !c.is_ascii_alphanumeric())
    {
        score += 1;
    }
    score
}

impl SignupForm {
    /// Errors shown while typing. Empty fields are not reported.
    pub fn field_errors(&self) -> BTreeMap<Field, &'static str> {
        let mut errors = BTreeMap::new();

        if !self.name.is_empty() && text_len(self.name.trim()) < MIN_NAME_LEN {
            errors.insert(Field::Name, "Enter at least 2 characters");
        }
        if !self.email.is_empty() && !is_valid_email(&self.email) {
            errors.insert(Field::Email, "Enter a valid email");
        }
        if !self.password.is_empty() && text_len(&self.password) < MIN_PASSWORD_LEN {
            errors.insert(Field::Password, "Password must be at least 6 characters");
        }
        if !self.confirm_password.is_empty() && self.password != self.confirm_password {
            errors.insert(Field::ConfirmPassword, "Passwords do not match");
        }

        errors
    }

    /// Whether the form may be submitted.
    pub fn is_valid(&self) -> bool {
        text_len(self.name.trim()) >= MIN_NAME_LEN
            && is_valid_email(&self.email)
            && text_len(&self.password) >= MIN_PASSWORD_LEN
            && self.password == self.confirm_password
    }

    pub fn strength(&self) -> Strength {
        Strength::from_score(password_strength(&self.password))
    }
}

/// An account created through the demo registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Please fix the errors above before continuing.")]
    Invalid,
    #[error("Email is already registered")]
    EmailTaken,
}

/// Client-side account list used by the demo flow in place of a server.
///
/// Passwords are never kept.
#[derive(Debug, Default)]
pub struct DemoRegistry {
    accounts: Vec<DemoAccount>,
}

impl DemoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accounts(&self) -> &[DemoAccount] {
        &self.accounts
    }

    /// Validates and stores the form. Emails are compared after Unicode lowercasing.
    pub fn submit(&mut self, form: &SignupForm) -> Result<DemoAccount, SubmitError> {
        if !form.is_valid() {
            return Err(SubmitError::Invalid);
        }

        let email = form.email.trim();
        let folded = email.to_lowercase();
        if self
            .accounts
            .iter()
            .any(|account| account.email.to_lowercase() == folded)
        {
            return Err(SubmitError::EmailTaken);
        }

        let account = DemoAccount {
            id: Uuid::new_v4(),
            name: form.name.trim().to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        self.accounts.push(account.clone());
        Ok(account)
    }
}
