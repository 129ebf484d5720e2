use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::OAuthStateStore;
use chrono::Utc;

use crate::account::errors::AuthError;
use crate::account::errors::ValidationError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountProfile;
use crate::account::models::AuthSession;
use crate::account::models::AuthorizationRedirect;
use crate::account::models::LinkedProviders;
use crate::account::models::LoginCommand;
use crate::account::models::Provider;
use crate::account::models::RegisterCommand;
use crate::account::models::UpdateProfileCommand;
use crate::account::models::Username;
use crate::account::ports::AuthServicePort;
use crate::account::ports::CredentialStore;
use crate::account::ports::IdentityProviderExchange;
use crate::account::resolver::OAuthResolver;

/// Domain service implementation for authentication use cases.
///
/// Concrete implementation of AuthServicePort with dependency injection.
pub struct AuthService<CS>
where
    CS: CredentialStore,
{
    store: Arc<CS>,
    authenticator: Arc<Authenticator>,
    states: Arc<OAuthStateStore>,
    resolver: OAuthResolver<CS>,
    providers: HashMap<Provider, Arc<dyn IdentityProviderExchange>>,
}

impl<CS> AuthService<CS>
where
    CS: CredentialStore,
{
    /// Create an auth service with no identity providers configured.
    ///
    /// # Arguments
    /// * `store` - Account persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    /// * `states` - OAuth state nonce cache, process-local
    pub fn new(
        store: Arc<CS>,
        authenticator: Arc<Authenticator>,
        states: Arc<OAuthStateStore>,
    ) -> Self {
        Self {
            resolver: OAuthResolver::new(Arc::clone(&store)),
            store,
            authenticator,
            states,
            providers: HashMap::new(),
        }
    }

    /// Register an identity provider exchange, replacing any previous one
    /// for the same provider.
    pub fn with_provider(mut self, exchange: Arc<dyn IdentityProviderExchange>) -> Self {
        self.providers.insert(exchange.provider(), exchange);
        self
    }

    fn exchange(&self, provider: Provider) -> Result<&Arc<dyn IdentityProviderExchange>, AuthError> {
        self.providers.get(&provider).ok_or_else(|| {
            tracing::error!(provider = %provider, "Identity provider is not configured");
            AuthError::ProviderExchangeFailed(format!("{provider} is not configured"))
        })
    }

    fn session(&self, account: Account) -> Result<AuthSession, AuthError> {
        let token = self.authenticator.issue_token(
            account.id,
            account.username.as_str(),
            account.email.as_str(),
        )?;

        Ok(AuthSession {
            account: account.into_profile(),
            token,
        })
    }
}

#[async_trait]
impl<CS> AuthServicePort for AuthService<CS>
where
    CS: CredentialStore,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError> {
        if self.store.email_exists(&command.email).await? {
            return Err(AuthError::DuplicateEmail);
        }
        if self.store.username_exists(&command.username).await? {
            return Err(AuthError::DuplicateUsername);
        }

        let password_hash = self
            .authenticator
            .hash_password(command.password.expose())?;

        let account = Account {
            id: AccountId::new(),
            username: command.username,
            display_name: command.display_name,
            email: command.email,
            password_hash: Some(password_hash),
            bio: None,
            profile_image_url: None,
            providers: LinkedProviders::new(),
            created_at: Utc::now(),
        };

        let account = self.store.create_account(account).await?;

        tracing::info!(
            account_id = %account.id,
            username = %account.username,
            "Registered account"
        );

        self.session(account)
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError> {
        let Some(account) = self.store.get_by_email(&command.email).await? else {
            tracing::info!("Login rejected");
            return Err(self.authenticator.reject_unknown(&command.password).into());
        };

        let token = self
            .authenticator
            .authenticate(
                &command.password,
                account.password_hash.as_deref().unwrap_or_default(),
                account.id,
                account.username.as_str(),
                account.email.as_str(),
            )
            .map_err(|e| {
                tracing::info!(account_id = %account.id, "Login rejected");
                AuthError::from(e)
            })?;

        Ok(AuthSession {
            account: account.into_profile(),
            token,
        })
    }

    fn begin_oauth(&self, provider: Provider) -> Result<AuthorizationRedirect, AuthError> {
        let exchange = self.exchange(provider)?;
        let state = self.states.issue();

        Ok(AuthorizationRedirect {
            authorization_url: exchange.authorization_url(&state),
            state,
        })
    }

    async fn oauth_callback(
        &self,
        provider: Provider,
        code: &str,
        state: &str,
    ) -> Result<AuthSession, AuthError> {
        if code.is_empty() {
            return Err(ValidationError::MissingField("code").into());
        }
        if state.is_empty() {
            return Err(ValidationError::MissingField("state").into());
        }

        if !self.states.consume(state) {
            tracing::warn!(provider = %provider, "Rejected OAuth callback with unknown or expired state");
            return Err(AuthError::StateInvalidOrExpired);
        }

        let exchange = self.exchange(provider)?;
        let identity = exchange.exchange_code(code).await.map_err(|e| {
            tracing::error!(provider = %provider, error = %e, "Identity provider exchange failed");
            AuthError::from(e)
        })?;

        let resolution = self.resolver.resolve(identity).await.map_err(|e| {
            if let AuthError::StorageFailure(detail) = &e {
                tracing::error!(provider = %provider, error = %detail, "Account resolution failed");
            }
            e
        })?;

        tracing::debug!(
            account_id = %resolution.account.id,
            outcome = ?resolution.outcome,
            "Resolved provider identity"
        );

        self.session(resolution.account)
    }

    async fn validate_token(&self, token: &str) -> Result<AccountProfile, AuthError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Token validation failed");
            AuthError::from(e)
        })?;

        let id = AccountId::from_string(&claims.sub).map_err(|_| AuthError::TokenInvalid)?;

        self.store
            .get_by_id(&id)
            .await?
            .map(Account::into_profile)
            .ok_or_else(|| {
                tracing::warn!(account_id = %id, "Valid token for missing account");
                AuthError::AccountNotFound
            })
    }

    async fn get_profile(&self, id: &AccountId) -> Result<AccountProfile, AuthError> {
        self.store
            .get_by_id(id)
            .await?
            .map(Account::into_profile)
            .ok_or(AuthError::AccountNotFound)
    }

    async fn update_profile(
        &self,
        id: &AccountId,
        command: UpdateProfileCommand,
    ) -> Result<AccountProfile, AuthError> {
        self.store
            .update_profile(id, &command)
            .await?
            .map(Account::into_profile)
            .ok_or(AuthError::AccountNotFound)
    }

    async fn get_account_by_username(
        &self,
        username: &Username,
    ) -> Result<AccountProfile, AuthError> {
        self.store
            .get_by_username(username)
            .await?
            .map(Account::into_profile)
            .ok_or(AuthError::AccountNotFound)
    }
}
