use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::StoreError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::LinkedProviders;
use crate::account::models::Provider;
use crate::account::models::UpdateProfileCommand;
use crate::account::models::Username;
use crate::account::ports::CredentialStore;

const ACCOUNT_COLUMNS: &str = "id, username, display_name, email, password_hash, bio, \
                               profile_image_url, oauth_providers, created_at";

const USERNAME_CONSTRAINT: &str = "accounts_username_key";
const EMAIL_CONSTRAINT: &str = "accounts_email_key";
const PROVIDER_LINK_CONSTRAINTS: [&str; 2] =
    ["accounts_google_id_key", "accounts_facebook_id_key"];

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {predicate}");

        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(Account::try_from)
            .transpose()
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    display_name: String,
    email: String,
    password_hash: Option<String>,
    bio: Option<String>,
    profile_image_url: Option<String>,
    oauth_providers: Json<LinkedProviders>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: AccountId(row.id),
            username: Username::new(row.username).map_err(corrupt)?,
            display_name: DisplayName::new(row.display_name).map_err(corrupt)?,
            email: EmailAddress::new(row.email).map_err(corrupt)?,
            password_hash: row.password_hash.filter(|hash| !hash.is_empty()),
            bio: row.bio,
            profile_image_url: row.profile_image_url,
            providers: row.oauth_providers.0,
            created_at: row.created_at,
        })
    }
}

fn corrupt(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("Stored account is invalid: {}", err))
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Map unique violations to their domain conflict, everything else to `Backend`.
fn write_error(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => return StoreError::DuplicateUsername,
                Some(EMAIL_CONSTRAINT) => return StoreError::DuplicateEmail,
                Some(name) if PROVIDER_LINK_CONSTRAINTS.contains(&name) => {
                    return StoreError::DuplicateProviderLink
                }
                _ => {}
            }
        }
    }
    backend(err)
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn create_account(&self, account: Account) -> Result<Account, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, display_name, email, password_hash, bio,
                                  profile_image_url, oauth_providers, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(account.id.0)
        .bind(account.username.as_str())
        .bind(account.display_name.as_str())
        .bind(account.email.as_str())
        .bind(account.password_hash.as_deref())
        .bind(account.bio.as_deref())
        .bind(account.profile_image_url.as_deref())
        .bind(Json(&account.providers))
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(account)
    }

    async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");

        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(Account::try_from)
            .transpose()
    }

    async fn get_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, StoreError> {
        self.fetch_one_where("email = $1", email.as_str()).await
    }

    async fn get_by_username(&self, username: &Username) -> Result<Option<Account>, StoreError> {
        self.fetch_one_where("username = $1", username.as_str()).await
    }

    async fn get_by_provider(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> Result<Option<Account>, StoreError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE oauth_providers -> $1 ->> 'id' = $2"
        );

        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(provider.as_str())
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(Account::try_from)
            .transpose()
    }

    async fn update_profile(
        &self,
        id: &AccountId,
        command: &UpdateProfileCommand,
    ) -> Result<Option<Account>, StoreError> {
        let sql = format!(
            r#"
            UPDATE accounts
            SET display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                profile_image_url = COALESCE($4, profile_image_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .bind(command.display_name.as_ref().map(DisplayName::as_str))
            .bind(command.bio.as_deref())
            .bind(command.profile_image_url.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(write_error)?
            .map(Account::try_from)
            .transpose()
    }

    async fn update_providers(
        &self,
        id: &AccountId,
        providers: &LinkedProviders,
    ) -> Result<Option<Account>, StoreError> {
        let sql = format!(
            r#"
            UPDATE accounts
            SET oauth_providers = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id.0)
            .bind(Json(providers))
            .fetch_optional(&self.pool)
            .await
            .map_err(write_error)?
            .map(Account::try_from)
            .transpose()
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(backend)
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)",
        )
        .bind(username.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)
    }
}
