use async_trait::async_trait;

use crate::account::errors::AuthError;
use crate::account::errors::ProviderError;
use crate::account::errors::StoreError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountProfile;
use crate::account::models::AuthSession;
use crate::account::models::AuthorizationRedirect;
use crate::account::models::EmailAddress;
use crate::account::models::ExternalIdentity;
use crate::account::models::LinkedProviders;
use crate::account::models::LoginCommand;
use crate::account::models::Provider;
use crate::account::models::RegisterCommand;
use crate::account::models::UpdateProfileCommand;
use crate::account::models::Username;

/// Port for authentication use cases.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a password account and sign it in.
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `DuplicateUsername` - Username is already taken
    /// * `StorageFailure` - Credential store failed
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError>;

    /// Sign in with email and password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (not distinguished)
    /// * `StorageFailure` - Credential store failed
    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError>;

    /// Start a provider sign-in: issue a state nonce and build the redirect URL.
    ///
    /// # Errors
    /// * `ProviderExchangeFailed` - Provider is not configured
    fn begin_oauth(&self, provider: Provider) -> Result<AuthorizationRedirect, AuthError>;

    /// Complete a provider sign-in.
    ///
    /// # Errors
    /// * `ValidationFailed` - Code or state missing
    /// * `StateInvalidOrExpired` - State unknown, replayed, or expired
    /// * `ProviderExchangeFailed` - Code exchange or profile fetch failed
    /// * `DuplicateUsername` / `DuplicateEmail` - Lost a race creating the account
    /// * `StorageFailure` - Credential store failed
    async fn oauth_callback(
        &self,
        provider: Provider,
        code: &str,
        state: &str,
    ) -> Result<AuthSession, AuthError>;

    /// Validate a bearer token and load the account it names.
    ///
    /// # Errors
    /// * `TokenInvalid` - Signature or structure invalid
    /// * `TokenExpired` - Token past its expiry
    /// * `AccountNotFound` - Account no longer exists
    async fn validate_token(&self, token: &str) -> Result<AccountProfile, AuthError>;

    /// # Errors
    /// * `AccountNotFound` - Account does not exist
    async fn get_profile(&self, id: &AccountId) -> Result<AccountProfile, AuthError>;

    /// Update profile fields; absent fields are left unchanged.
    ///
    /// # Errors
    /// * `AccountNotFound` - Account does not exist
    async fn update_profile(
        &self,
        id: &AccountId,
        command: UpdateProfileCommand,
    ) -> Result<AccountProfile, AuthError>;

    /// # Errors
    /// * `AccountNotFound` - No account with this username
    async fn get_account_by_username(
        &self,
        username: &Username,
    ) -> Result<AccountProfile, AuthError>;
}

/// Persistence operations for the account aggregate.
///
/// Lookups return `Ok(None)` when nothing matches. Writes report uniqueness
/// conflicts as the matching `StoreError` variant.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// # Errors
    /// * `DuplicateEmail` / `DuplicateUsername` / `DuplicateProviderLink` - Uniqueness conflict
    /// * `Backend` - Storage operation failed
    async fn create_account(&self, account: Account) -> Result<Account, StoreError>;

    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, StoreError>;

    async fn get_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, StoreError>;

    async fn get_by_username(&self, username: &Username) -> Result<Option<Account>, StoreError>;

    /// Find the account holding the (provider, external id) link.
    async fn get_by_provider(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> Result<Option<Account>, StoreError>;

    /// Apply the provided profile fields. Returns `None` if the account does not exist.
    async fn update_profile(
        &self,
        id: &AccountId,
        command: &UpdateProfileCommand,
    ) -> Result<Option<Account>, StoreError>;

    /// Replace the provider map. Returns `None` if the account does not exist.
    ///
    /// # Errors
    /// * `DuplicateProviderLink` - A link is already held by another account
    async fn update_providers(
        &self,
        id: &AccountId,
        providers: &LinkedProviders,
    ) -> Result<Option<Account>, StoreError>;

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, StoreError>;

    async fn username_exists(&self, username: &Username) -> Result<bool, StoreError>;
}

/// One external identity provider's half of the authorization-code flow.
#[async_trait]
pub trait IdentityProviderExchange: Send + Sync + 'static {
    fn provider(&self) -> Provider;

    /// URL to redirect the browser to, carrying `state`.
    fn authorization_url(&self, state: &str) -> String;

    /// Trade an authorization code for the caller's verified identity.
    ///
    /// # Errors
    /// * `Http` / `Rejected` - Provider unreachable or refused the code
    /// * `MalformedProfile` / `MissingEmail` - Profile unusable
    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity, ProviderError>;
}
