//! User data model.
//!
//! A user owns recipes and participates in favorites, shopping carts, and
//! subscriptions. Field validation mirrors the registration contract: email
//! and username are globally unique (enforced by the storage layer), names
//! and credentials are length-bounded.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum length for email addresses.
pub const EMAIL_MAX: usize = 254;
/// Maximum length for usernames, names, and passwords.
pub const NAME_MAX: usize = 150;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyEmail,
    InvalidEmail,
    EmailTooLong { max: usize },
    EmptyUsername,
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    EmptyName { field: &'static str },
    NameTooLong { field: &'static str, max: usize },
    EmptyPassword,
    PasswordTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email is not a valid address"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, digits, and @/./+/-/_ characters",
            ),
            Self::EmptyName { field } => write!(f, "{field} must not be empty"),
            Self::NameTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = r"^[\w.@+-]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Deliberately permissive; delivery is the only real validator.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`] from owned input.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`] from owned input.
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.chars().count() > NAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: NAME_MAX });
        }
        if !username_regex().is_match(&username) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validate a first or last name component.
pub fn validate_person_name(
    field: &'static str,
    value: &str,
) -> Result<(), UserValidationError> {
    if value.trim().is_empty() {
        return Err(UserValidationError::EmptyName { field });
    }
    if value.chars().count() > NAME_MAX {
        return Err(UserValidationError::NameTooLong {
            field,
            max: NAME_MAX,
        });
    }
    Ok(())
}

/// Validate a raw registration password.
pub fn validate_password(value: &str) -> Result<(), UserValidationError> {
    if value.is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }
    if value.chars().count() > NAME_MAX {
        return Err(UserValidationError::PasswordTooLong { max: NAME_MAX });
    }
    Ok(())
}

/// Public profile of a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Globally unique email address.
    pub email: Email,
    /// Globally unique username.
    pub username: Username,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// Validated registration payload.
///
/// The raw password is carried here exactly once, on the way to the hasher;
/// it never appears in any read model.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: Email,
    pub username: Username,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl Registration {
    /// Validate and assemble a registration from raw field values.
    pub fn try_from_parts(
        email: &str,
        username: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> Result<Self, UserValidationError> {
        let email = Email::new(email)?;
        let username = Username::new(username)?;
        validate_person_name("first name", first_name)?;
        validate_person_name("last name", last_name)?;
        validate_password(password)?;
        Ok(Self {
            email,
            username,
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            password: password.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ada@example.com", true)]
    #[case("ada.lovelace+recipes@example.co.uk", true)]
    #[case("not-an-email", false)]
    #[case("two@@example.com", false)]
    #[case("", false)]
    fn email_validation(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(Email::new(input).is_ok(), ok, "input: {input:?}");
    }

    #[rstest]
    #[case("ada", true)]
    #[case("ada.lovelace", true)]
    #[case("ada+l@node-1", true)]
    #[case("ada lovelace", false)]
    #[case("", false)]
    fn username_validation(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(Username::new(input).is_ok(), ok, "input: {input:?}");
    }

    #[rstest]
    fn username_rejects_overlong_input() {
        let long = "a".repeat(NAME_MAX + 1);
        assert_eq!(
            Username::new(long),
            Err(UserValidationError::UsernameTooLong { max: NAME_MAX })
        );
    }

    #[rstest]
    fn registration_collects_field_errors() {
        let result = Registration::try_from_parts("ada@example.com", "ada", "", "Lovelace", "pw");
        assert_eq!(
            result.map(|_| ()),
            Err(UserValidationError::EmptyName {
                field: "first name"
            })
        );
    }

    #[rstest]
    fn registration_accepts_valid_input() {
        let registration =
            Registration::try_from_parts("ada@example.com", "ada", "Ada", "Lovelace", "s3cret")
                .expect("valid registration");
        assert_eq!(registration.username.as_ref(), "ada");
    }
}
