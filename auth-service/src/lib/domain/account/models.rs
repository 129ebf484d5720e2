use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use auth::IssuedToken;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::account::errors::AccountIdError;
use crate::account::errors::DisplayNameError;
use crate::account::errors::EmailError;
use crate::account::errors::PasswordPolicyError;
use crate::account::errors::UnknownProviderError;
use crate::account::errors::UsernameError;

/// Account aggregate entity.
///
/// `password_hash` is `None` for accounts created through an identity
/// provider; such accounts can only sign in through a linked provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    pub display_name: DisplayName,
    pub email: EmailAddress,
    pub password_hash: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub providers: LinkedProviders,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// True when the account has no password and at least one linked provider.
    pub fn is_oauth_only(&self) -> bool {
        self.password_hash.is_none() && !self.providers.is_empty()
    }

    /// Public view of the account, without the password hash.
    pub fn into_profile(self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            username: self.username,
            display_name: self.display_name,
            email: self.email,
            bio: self.bio,
            profile_image_url: self.profile_image_url,
            providers: self.providers,
            created_at: self.created_at,
        }
    }
}

/// Account as it may leave the service: everything except the password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountProfile {
    pub id: AccountId,
    pub username: Username,
    pub display_name: DisplayName,
    pub email: EmailAddress,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub providers: LinkedProviders,
    pub created_at: DateTime<Utc>,
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// 3-50 characters, letters, digits and underscore only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 50;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 50 characters
    /// * `InvalidCharacters` - Contains characters other than letters, digits and `_`
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    /// Whether `c` may appear in a username.
    pub fn is_allowed_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username.chars().all(Self::is_allowed_char) {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type (1-100 characters, not blank).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub const MAX_LENGTH: usize = 100;

    /// # Errors
    /// * `Empty` - Name is empty or whitespace only
    /// * `TooLong` - Name longer than 100 characters
    pub fn new(name: String) -> Result<Self, DisplayNameError> {
        let length = name.chars().count();
        if name.trim().is_empty() {
            Err(DisplayNameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    /// A username always satisfies the display name bounds.
    pub fn from_username(username: &Username) -> Self {
        Self(username.as_str().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the `@`.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password accepted at registration.
///
/// Never printed; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 6;
    pub const MAX_LENGTH: usize = 128;

    /// # Errors
    /// * `TooShort` - Fewer than 6 characters
    /// * `TooLong` - More than 128 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(password))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Supported external identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::Facebook];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = UnknownProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| UnknownProviderError(s.to_string()))
    }
}

/// External identity linked to an account for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedProvider {
    #[serde(rename = "id")]
    pub external_id: String,
    pub email: String,
}

/// Provider name to linked identity. At most one entry per provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkedProviders(BTreeMap<Provider, LinkedProvider>);

impl LinkedProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Providers map holding a single link.
    pub fn single(provider: Provider, link: LinkedProvider) -> Self {
        let mut providers = Self::new();
        providers.link(provider, link);
        providers
    }

    /// Attach or replace the link for `provider`; other providers are kept.
    /// Returns the link it replaced, if any.
    pub fn link(&mut self, provider: Provider, link: LinkedProvider) -> Option<LinkedProvider> {
        self.0.insert(provider, link)
    }

    pub fn get(&self, provider: Provider) -> Option<&LinkedProvider> {
        self.0.get(&provider)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Provider, &LinkedProvider)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Identity asserted by a provider after a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub provider: Provider,
    pub external_id: String,
    pub email: String,
    pub display_name: String,
    pub picture_url: Option<String>,
}

/// Command to register a password account with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub display_name: DisplayName,
    pub email: EmailAddress,
    pub password: Password,
}

/// Command to sign in with email and password.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: String,
}

/// Command to update profile fields.
///
/// All fields are optional to support partial updates.
/// Only provided fields will be updated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProfileCommand {
    pub display_name: Option<DisplayName>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Authenticated account plus the bearer token issued for it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub account: AccountProfile,
    pub token: IssuedToken,
}

/// Where to send the browser to start a provider sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRedirect {
    pub authorization_url: String,
    pub state: String,
}
