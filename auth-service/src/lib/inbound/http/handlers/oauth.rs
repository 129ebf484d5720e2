use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::account::models::Provider;
use crate::inbound::http::router::AppState;

/// Start a provider sign-in. The client redirects the browser to `auth_url`.
pub async fn begin_oauth(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<ApiSuccess<AuthorizationData>, ApiError> {
    let provider: Provider = provider.parse()?;

    state
        .auth_service
        .begin_oauth(provider)
        .map_err(ApiError::from)
        .map(|redirect| {
            ApiSuccess::new(
                StatusCode::OK,
                AuthorizationData {
                    auth_url: redirect.authorization_url,
                    state: redirect.state,
                },
            )
        })
}

/// Provider redirect target after the user grants (or denies) consent.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let provider: Provider = provider.parse()?;

    if let Some(error) = params.error {
        tracing::info!(provider = %provider, error = %error, "Provider sign-in was not completed");
        return Err(ApiError::BadRequest(format!(
            "{provider} sign-in was not completed"
        )));
    }

    state
        .auth_service
        .oauth_callback(
            provider,
            params.code.as_deref().unwrap_or_default(),
            params.state.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(ApiError::from)
        .map(|session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationData {
    pub auth_url: String,
    pub state: String,
}
