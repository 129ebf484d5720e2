use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::OAuthStateStore;
use auth::PasswordHasher;
use auth::TokenManager;
use auth_service::account::ports::AuthServicePort;
use auth_service::account::service::AuthService;
use auth_service::config::Config;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::identity::FacebookIdentityExchange;
use auth_service::outbound::identity::GoogleIdentityExchange;
use auth_service::repositories::PostgresCredentialStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_hours = config.jwt.expiration_hours,
        state_ttl_seconds = config.oauth.state_ttl_seconds,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let password_hasher = PasswordHasher::with_cost(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;
    // Compute the decoy digest now rather than inside the first rejected login.
    password_hasher.decoy_hash();
    let token_manager = TokenManager::with_expiration_hours(
        config.jwt.secret.as_bytes(),
        config.jwt.expiration_hours,
    );
    let authenticator = Arc::new(Authenticator::new(password_hasher, token_manager));
    let states = Arc::new(OAuthStateStore::with_ttl(Duration::from_secs(
        config.oauth.state_ttl_seconds,
    )));
    let store = Arc::new(PostgresCredentialStore::new(pg_pool));

    let mut auth_service = AuthService::new(store, authenticator, states);

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    if let Some(google) = config.oauth.google.as_ref().filter(|c| c.is_enabled()) {
        auth_service = auth_service.with_provider(Arc::new(GoogleIdentityExchange::new(
            http_client.clone(),
            google,
        )));
        tracing::info!(provider = "google", "Identity provider enabled");
    }
    if let Some(facebook) = config.oauth.facebook.as_ref().filter(|c| c.is_enabled()) {
        auth_service = auth_service.with_provider(Arc::new(FacebookIdentityExchange::new(
            http_client.clone(),
            facebook,
        )));
        tracing::info!(provider = "facebook", "Identity provider enabled");
    }

    let auth_service: Arc<dyn AuthServicePort> = Arc::new(auth_service);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    if let Err(e) = axum::serve(http_listener, create_router(auth_service)).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
