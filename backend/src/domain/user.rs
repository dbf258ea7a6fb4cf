//! User data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors returned by the fallible constructors in this module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    EmptyName,
    EmptyEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
///
/// Generated server-side at creation and immutable thereafter. Serialises
/// as the canonical hyphenated string; anything else is rejected on the way
/// in, so persisted records and route parameters stay honest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its string form.
    pub fn parse(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
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
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Free-text display name.
///
/// The only invariant is presence: whitespace-only input is accepted
/// because the public contract is a presence check, not a format check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Free-text email address; non-empty, no format validation beyond that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated `(name, email)` pair accepted by create and replace.
///
/// Handlers can only reach the persistence port through a draft, so the
/// write-time presence invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    name: UserName,
    email: EmailAddress,
}

impl UserDraft {
    /// Validate both fields and construct a draft.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            name: UserName::new(name)?,
            email: EmailAddress::new(email)?,
        })
    }

    /// Name carried by the draft.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Email carried by the draft.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Decompose into the validated components.
    pub fn into_parts(self) -> (UserName, EmailAddress) {
        let Self { name, email } = self;
        (name, email)
    }
}

/// Application user, the sole persisted entity.
///
/// ## Invariants
/// - `id` is a valid UUID, assigned by the server at creation and never
///   supplied by clients.
/// - `name` and `email` are non-empty.
///
/// Wire shape: `{"id": "...", "name": "...", "email": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(value_type = String, example = "Ann")]
    name: UserName,
    #[schema(value_type = String, example = "ann@x.com")]
    email: EmailAddress,
}

impl User {
    /// Build a [`User`] by binding an identifier to a validated draft.
    pub fn new(id: UserId, draft: UserDraft) -> Self {
        let (name, email) = draft.into_parts();
        Self { id, name, email }
    }

    /// Fallible constructor from raw strings, used when decoding stored
    /// records.
    pub fn try_from_strings(
        id: impl AsRef<str>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let id = UserId::parse(id)?;
        let draft = UserDraft::new(name, email)?;
        Ok(Self::new(id, draft))
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDto {
    id: String,
    name: String,
    email: String,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User { id, name, email } = value;
        Self {
            id: id.to_string(),
            name: name.into(),
            email: email.into(),
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        User::try_from_strings(value.id, value.name, value.email)
    }
}
