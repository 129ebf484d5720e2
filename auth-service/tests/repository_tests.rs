mod common;

use auth_service::account::errors::StoreError;
use auth_service::account::models::Account;
use auth_service::account::models::AccountId;
use auth_service::account::models::DisplayName;
use auth_service::account::models::EmailAddress;
use auth_service::account::models::LinkedProvider;
use auth_service::account::models::LinkedProviders;
use auth_service::account::models::Provider;
use auth_service::account::models::UpdateProfileCommand;
use auth_service::account::models::Username;
use auth_service::account::ports::CredentialStore;
use auth_service::repositories::PostgresCredentialStore;
use chrono::Utc;
use common::TestDb;

fn account(username: &str, email: &str) -> Account {
    Account {
        id: AccountId::new(),
        username: Username::new(username.to_string()).unwrap(),
        display_name: DisplayName::new("Test User".to_string()).unwrap(),
        email: EmailAddress::new(email.to_string()).unwrap(),
        password_hash: Some("$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string()),
        bio: None,
        profile_image_url: None,
        providers: LinkedProviders::new(),
        created_at: Utc::now(),
    }
}

fn google_link(external_id: &str, email: &str) -> LinkedProviders {
    LinkedProviders::single(
        Provider::Google,
        LinkedProvider {
            external_id: external_id.to_string(),
            email: email.to_string(),
        },
    )
}

#[tokio::test]
async fn test_create_and_fetch_account() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());

    let created = store
        .create_account(account("nicola", "nicola@example.com"))
        .await
        .expect("Failed to create account");

    let by_id = store.get_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, created.username);
    assert_eq!(by_id.password_hash, created.password_hash);

    let by_email = store.get_by_email(&created.email).await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);

    let by_username = store
        .get_by_username(&created.username)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_username.id, created.id);

    assert!(store.email_exists(&created.email).await.unwrap());
    assert!(store.username_exists(&created.username).await.unwrap());

    let nobody = EmailAddress::new("nobody@example.com".to_string()).unwrap();
    assert!(store.get_by_email(&nobody).await.unwrap().is_none());
    assert!(!store.email_exists(&nobody).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_username_is_reported_at_write() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());

    store
        .create_account(account("nicola", "nicola@example.com"))
        .await
        .unwrap();

    let result = store
        .create_account(account("nicola", "other@example.com"))
        .await;

    assert_eq!(result, Err(StoreError::DuplicateUsername));
}

#[tokio::test]
async fn test_duplicate_email_is_reported_at_write() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());

    store
        .create_account(account("nicola", "nicola@example.com"))
        .await
        .unwrap();

    let result = store
        .create_account(account("nicola2", "nicola@example.com"))
        .await;

    assert_eq!(result, Err(StoreError::DuplicateEmail));
}

#[tokio::test]
async fn test_get_by_provider_finds_linked_account() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());

    let mut linked = account("jane", "jane@example.com");
    linked.password_hash = None;
    linked.providers = google_link("g-42", "jane@example.com");
    let created = store.create_account(linked).await.unwrap();

    let found = store
        .get_by_provider(Provider::Google, "g-42")
        .await
        .unwrap()
        .expect("Linked account not found");
    assert_eq!(found.id, created.id);
    assert!(found.password_hash.is_none());
    assert_eq!(
        found.providers.get(Provider::Google).unwrap().email,
        "jane@example.com"
    );

    assert!(store
        .get_by_provider(Provider::Facebook, "g-42")
        .await
        .unwrap()
        .is_none());
    assert!(store
        .get_by_provider(Provider::Google, "g-43")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_provider_identity_links_to_one_account() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());

    let mut first = account("jane", "jane@example.com");
    first.providers = google_link("g-42", "jane@example.com");
    store.create_account(first).await.unwrap();

    let mut second = account("jane2", "jane2@example.com");
    second.providers = google_link("g-42", "jane2@example.com");
    let created = store.create_account(second).await;
    assert_eq!(created, Err(StoreError::DuplicateProviderLink));

    let other = store
        .create_account(account("john", "john@example.com"))
        .await
        .unwrap();
    let relinked = store
        .update_providers(&other.id, &google_link("g-42", "john@example.com"))
        .await;
    assert_eq!(relinked, Err(StoreError::DuplicateProviderLink));
}

#[tokio::test]
async fn test_update_providers_keeps_existing_links() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());

    let created = store
        .create_account(account("nicola", "nicola@example.com"))
        .await
        .unwrap();

    let mut providers = google_link("g-1", "nicola@example.com");
    providers.link(
        Provider::Facebook,
        LinkedProvider {
            external_id: "fb-1".to_string(),
            email: "nicola@example.com".to_string(),
        },
    );

    let updated = store
        .update_providers(&created.id, &providers)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.providers, providers);
    assert_eq!(updated.password_hash, created.password_hash);

    let missing = store
        .update_providers(&AccountId::new(), &providers)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_update_profile_changes_only_provided_fields() {
    let db = TestDb::new().await;
    let store = PostgresCredentialStore::new(db.pool.clone());

    let created = store
        .create_account(account("nicola", "nicola@example.com"))
        .await
        .unwrap();

    store
        .update_profile(
            &created.id,
            &UpdateProfileCommand {
                bio: Some("Rustacean".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    let updated = store
        .update_profile(
            &created.id,
            &UpdateProfileCommand {
                display_name: Some(DisplayName::new("Nicola B".to_string()).unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.display_name.as_str(), "Nicola B");
    assert_eq!(updated.bio.as_deref(), Some("Rustacean"));
    assert_eq!(updated.profile_image_url, None);
    assert_eq!(updated.email, created.email);

    let missing = store
        .update_profile(&AccountId::new(), &UpdateProfileCommand::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}
