//! Registered user model.

use serde::Deserialize;

use crate::entity::Entity;
use crate::id::{BlogId, UserId};
use crate::validation::{FieldViolation, ValidationFailure, Validator};

/// Minimum length (in characters) for usernames and passwords.
pub const MIN_CREDENTIAL_LENGTH: usize = 3;

/// A registered user.
///
/// The password is only ever held as a salted hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub name: Option<String>,
    pub password_hash: String,
    /// Owned blog posts, in creation order.
    pub blogs: Vec<BlogId>,
}

impl User {
    pub fn new(username: String, name: Option<String>, password_hash: String) -> Self {
        Self {
            id: UserId::new(),
            username,
            name,
            password_hash,
            blogs: Vec::new(),
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Unvalidated registration input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistrationDraft {
    pub username: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Validated registration, still carrying the plaintext password to be hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub name: Option<String>,
    pub password: String,
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RegistrationDraft {
    pub const MODEL: &'static str = "User";

    /// Checks presence and minimum length of `username` and `password`.
    ///
    /// Uniqueness needs storage and is reported via [`RegistrationDraft::duplicate_username`].
    pub fn validate(self) -> Result<Registration, ValidationFailure> {
        let mut v = Validator::new(Self::MODEL);

        let username = v.required("username", self.username);
        if !username.is_empty() {
            v.min_length("username", &username, MIN_CREDENTIAL_LENGTH, true);
        }

        let password = v.required("password", self.password);
        if !password.is_empty() {
            v.min_length("password", &password, MIN_CREDENTIAL_LENGTH, false);
        }

        v.finish()?;

        Ok(Registration {
            username,
            name: self.name,
            password,
        })
    }

    pub fn duplicate_username(username: impl Into<String>) -> ValidationFailure {
        ValidationFailure::single(
            Self::MODEL,
            FieldViolation::NotUnique {
                field: "username",
                value: username.into(),
            },
        )
    }
}
