use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::AuthError;
use crate::account::errors::ProviderError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::ExternalIdentity;
use crate::account::models::LinkedProvider;
use crate::account::models::LinkedProviders;
use crate::account::models::Username;
use crate::account::ports::CredentialStore;

/// Numbered suffixes tried after the bare base candidate.
const MAX_NUMBERED_ATTEMPTS: u32 = 1000;
/// Random-suffix candidates tried once numbered suffixes are exhausted.
const MAX_RANDOM_ATTEMPTS: u32 = 5;
const RANDOM_SUFFIX_LENGTH: usize = 8;
/// Leaves room for `_` plus a random suffix, or four digits, under the maximum.
const MAX_BASE_LENGTH: usize = Username::MAX_LENGTH - RANDOM_SUFFIX_LENGTH - 2;
const SHORT_BASE_PREFIX: &str = "user";

/// Which branch of resolution produced the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The provider identity was already linked.
    Existing,
    /// The provider identity was attached to an account with the same email.
    Linked,
    /// As `Linked`, but the account already held a different identity for
    /// that provider, which was replaced.
    Rebound,
    /// A new provider-only account was created.
    Created,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub account: Account,
    pub outcome: ResolutionOutcome,
}

/// Maps a verified external identity onto a local account.
///
/// Tries, in order: the exact (provider, external id) link, an account with
/// the same email, then a new account with a generated unique username.
pub struct OAuthResolver<CS>
where
    CS: CredentialStore,
{
    store: Arc<CS>,
}

impl<CS> OAuthResolver<CS>
where
    CS: CredentialStore,
{
    pub fn new(store: Arc<CS>) -> Self {
        Self { store }
    }

    /// # Errors
    /// * `ProviderExchangeFailed` - Provider asserted an unusable email
    /// * `DuplicateUsername` - No free username could be generated
    /// * `StorageFailure` - Credential store failed
    pub async fn resolve(&self, identity: ExternalIdentity) -> Result<Resolution, AuthError> {
        if let Some(account) = self
            .store
            .get_by_provider(identity.provider, &identity.external_id)
            .await?
        {
            return Ok(Resolution {
                account,
                outcome: ResolutionOutcome::Existing,
            });
        }

        let email = EmailAddress::new(identity.email.clone())
            .map_err(|e| ProviderError::MalformedProfile(e.to_string()))?;

        if let Some(account) = self.store.get_by_email(&email).await? {
            return self.link(account, &identity).await;
        }

        self.create(identity, email).await
    }

    async fn link(
        &self,
        account: Account,
        identity: &ExternalIdentity,
    ) -> Result<Resolution, AuthError> {
        let mut providers = account.providers.clone();
        let replaced = providers
            .link(
                identity.provider,
                LinkedProvider {
                    external_id: identity.external_id.clone(),
                    email: identity.email.clone(),
                },
            )
            .filter(|previous| previous.external_id != identity.external_id);

        let account = self
            .store
            .update_providers(&account.id, &providers)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let outcome = match replaced {
            Some(previous) => {
                tracing::warn!(
                    account_id = %account.id,
                    provider = %identity.provider,
                    previous_external_id = %previous.external_id,
                    external_id = %identity.external_id,
                    "Replaced identity provider link on existing account"
                );
                ResolutionOutcome::Rebound
            }
            None => {
                tracing::info!(
                    account_id = %account.id,
                    provider = %identity.provider,
                    "Linked identity provider to existing account"
                );
                ResolutionOutcome::Linked
            }
        };

        Ok(Resolution { account, outcome })
    }

    async fn create(
        &self,
        identity: ExternalIdentity,
        email: EmailAddress,
    ) -> Result<Resolution, AuthError> {
        let username = self.unique_username(&identity).await?;
        let display_name = provider_display_name(&identity.display_name, &username);

        let account = Account {
            id: AccountId::new(),
            username,
            display_name,
            email,
            password_hash: None,
            bio: None,
            profile_image_url: identity.picture_url,
            providers: LinkedProviders::single(
                identity.provider,
                LinkedProvider {
                    external_id: identity.external_id,
                    email: identity.email,
                },
            ),
            created_at: Utc::now(),
        };

        let account = self.store.create_account(account).await?;

        tracing::info!(
            account_id = %account.id,
            username = %account.username,
            provider = %identity.provider,
            "Created account from identity provider"
        );

        Ok(Resolution {
            account,
            outcome: ResolutionOutcome::Created,
        })
    }

    /// First free candidate among `base`, `base1` .. `base1000`, then a few
    /// `base_xxxxxxxx` random candidates, each checked against the store.
    async fn unique_username(&self, identity: &ExternalIdentity) -> Result<Username, AuthError> {
        let base = base_username(&identity.display_name, &identity.email);

        let numbered = std::iter::once(base.clone())
            .chain((1..=MAX_NUMBERED_ATTEMPTS).map(|n| format!("{base}{n}")));
        for candidate in numbered {
            let username = Username::new(candidate)?;
            if !self.store.username_exists(&username).await? {
                return Ok(username);
            }
        }

        tracing::warn!(base = %base, "Numbered usernames exhausted, trying random suffixes");

        for _ in 0..MAX_RANDOM_ATTEMPTS {
            let suffix = Uuid::new_v4().simple().to_string();
            let username = Username::new(format!("{base}_{}", &suffix[..RANDOM_SUFFIX_LENGTH]))?;
            if !self.store.username_exists(&username).await? {
                return Ok(username);
            }
        }

        Err(AuthError::DuplicateUsername)
    }
}

/// Lower-cased display name without whitespace or disallowed characters,
/// falling back to the email local part. Short results get a `user` prefix.
pub fn base_username(display_name: &str, email: &str) -> String {
    let from_name = sanitize(display_name);
    let base = if from_name.is_empty() {
        sanitize(email.split('@').next().unwrap_or_default())
    } else {
        from_name
    };

    let base = if base.chars().count() < Username::MIN_LENGTH {
        format!("{SHORT_BASE_PREFIX}{base}")
    } else {
        base
    };

    base.chars().take(MAX_BASE_LENGTH).collect()
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .filter(|c| Username::is_allowed_char(*c))
        .collect()
}

fn provider_display_name(raw: &str, username: &Username) -> DisplayName {
    let trimmed: String = raw.trim().chars().take(DisplayName::MAX_LENGTH).collect();
    DisplayName::new(trimmed).unwrap_or_else(|_| DisplayName::from_username(username))
}
