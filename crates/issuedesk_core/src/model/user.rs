//! User and principal model.
//!
//! # Responsibility
//! - Describe registered users and the authenticated principal acting on
//!   the core.
//!
//! # Invariants
//! - `username` is unique and matches the account name charset.
//! - Users younger than `MIN_USER_AGE` cannot register.

use super::{check_text_length, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable user identifier.
pub type UserId = Uuid;

/// Minimum age accepted at registration.
pub const MIN_USER_AGE: u32 = 15;

const USERNAME_MAX_CHARS: usize = 150;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Registered user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub age: u32,
    pub can_be_contacted: bool,
    pub can_data_be_shared: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub age: u32,
    #[serde(default)]
    pub can_be_contacted: bool,
    #[serde(default)]
    pub can_data_be_shared: bool,
}

impl NewUser {
    /// Creates a registration payload with both consent flags off.
    pub fn new(username: impl Into<String>, age: u32) -> Self {
        Self {
            username: username.into(),
            age,
            can_be_contacted: false,
            can_data_be_shared: false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_username(&self.username)?;
        check_age(self.age)
    }
}

/// Partial profile update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub can_be_contacted: Option<bool>,
    #[serde(default)]
    pub can_data_be_shared: Option<bool>,
}

impl UserPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(username) = self.username.as_deref() {
            check_username(username)?;
        }
        if let Some(age) = self.age {
            check_age(age)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, user: &mut User) {
        if let Some(username) = self.username.as_ref() {
            user.username = username.clone();
        }
        if let Some(age) = self.age {
            user.age = age;
        }
        if let Some(can_be_contacted) = self.can_be_contacted {
            user.can_be_contacted = can_be_contacted;
        }
        if let Some(can_data_be_shared) = self.can_data_be_shared {
            user.can_data_be_shared = can_data_be_shared;
        }
    }
}

fn check_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::new("username", "this field may not be blank"));
    }
    check_text_length("username", username, USERNAME_MAX_CHARS)?;
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::new(
            "username",
            "enter a valid username: letters, digits and @/./+/-/_ only",
        ));
    }
    Ok(())
}

fn check_age(age: u32) -> Result<(), ValidationError> {
    if age < MIN_USER_AGE {
        return Err(ValidationError::new(
            "age",
            format!("users must be at least {MIN_USER_AGE} years old"),
        ));
    }
    Ok(())
}

/// Authenticated identity on whose behalf a request runs.
///
/// Resolved by the caller's identity layer; the core never creates one
/// from credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    user_id: UserId,
}

impl Principal {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Whether this principal is the given user.
    pub fn is(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::{NewUser, UserPatch, MIN_USER_AGE};

    #[test]
    fn accepts_minimum_age() {
        NewUser::new("new_user", MIN_USER_AGE)
            .validate()
            .expect("15 years old should register");
    }

    #[test]
    fn rejects_users_younger_than_fifteen() {
        let err = NewUser::new("new_user", 12)
            .validate()
            .expect_err("12 years old must be rejected");
        assert_eq!(err.field, "age");
    }

    #[test]
    fn rejects_username_with_spaces() {
        let err = NewUser::new("new user", 27)
            .validate()
            .expect_err("space is not allowed");
        assert_eq!(err.field, "username");
    }

    #[test]
    fn accepts_punctuated_username() {
        NewUser::new("jane.doe+tracker@example", 30)
            .validate()
            .expect("punctuation charset should pass");
    }

    #[test]
    fn patch_revalidates_only_supplied_fields() {
        UserPatch {
            can_be_contacted: Some(true),
            ..UserPatch::default()
        }
        .validate()
        .expect("consent-only patch has nothing to check");

        let err = UserPatch {
            age: Some(MIN_USER_AGE - 1),
            ..UserPatch::default()
        }
        .validate()
        .expect_err("underage patch must fail");
        assert_eq!(err.field, "age");
    }
}
