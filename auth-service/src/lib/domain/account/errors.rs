use auth::AuthenticationError;
use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Username contains invalid characters (only letters, digits, and underscore allowed)")]
    InvalidCharacters,
}

/// Error for DisplayName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("Display name is required")]
    Empty,

    #[error("Display name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for registration password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown identity provider: {0}")]
pub struct UnknownProviderError(pub String);

/// Request shape violations, detected before any storage access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid account ID: {0}")]
    AccountId(#[from] AccountIdError),

    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid display name: {0}")]
    DisplayName(#[from] DisplayNameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordPolicyError),

    #[error("{0}")]
    Provider(#[from] UnknownProviderError),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Failures reported by a credential store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Provider identity already linked to another account")]
    DuplicateProviderLink,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Failures reported by an identity provider exchange.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Request to identity provider failed: {0}")]
    Http(String),

    #[error("Identity provider rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Identity provider returned a malformed profile: {0}")]
    MalformedProfile(String),

    #[error("Identity provider did not return an email address")]
    MissingEmail,
}

/// Top-level error for all authentication use cases.
///
/// `StorageFailure`, `ProviderExchangeFailed` and `Internal` keep their detail
/// for logs; their `Display` text never includes it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Identity provider exchange failed")]
    ProviderExchangeFailed(String),

    #[error("Invalid or expired state parameter")]
    StateInvalidOrExpired,

    #[error("Storage failure")]
    StorageFailure(String),

    #[error("Internal error")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::DuplicateUsername => AuthError::DuplicateUsername,
            other => AuthError::StorageFailure(other.to_string()),
        }
    }
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        AuthError::ProviderExchangeFailed(err.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidToken => AuthError::TokenInvalid,
            JwtError::TokenExpired => AuthError::TokenExpired,
            JwtError::EncodingFailed(detail) => AuthError::Internal(detail),
        }
    }
}

impl From<AuthenticationError> for AuthError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => AuthError::InvalidCredentials,
            AuthenticationError::JwtError(e) => e.into(),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooLong { max, actual } => {
                AuthError::ValidationFailed(ValidationError::Password(
                    PasswordPolicyError::TooLong { max, actual },
                ))
            }
            other => AuthError::Internal(other.to_string()),
        }
    }
}

macro_rules! validation_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for AuthError {
                fn from(err: $source) -> Self {
                    AuthError::ValidationFailed(ValidationError::from(err))
                }
            }
        )*
    };
}

validation_from!(
    AccountIdError,
    UsernameError,
    DisplayNameError,
    EmailError,
    PasswordPolicyError,
    UnknownProviderError,
);
