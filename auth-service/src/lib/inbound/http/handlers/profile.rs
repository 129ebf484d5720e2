use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::ValidationError;
use crate::account::models::DisplayName;
use crate::account::models::UpdateProfileCommand;
use crate::account::models::Username;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(authenticated): Extension<AuthenticatedAccount>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    state
        .auth_service
        .get_profile(&authenticated.account.id)
        .await
        .map_err(ApiError::from)
        .map(|account| ApiSuccess::new(StatusCode::OK, account.into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(authenticated): Extension<AuthenticatedAccount>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    let command = body.try_into_command()?;

    state
        .auth_service
        .update_profile(&authenticated.account.id, command)
        .await
        .map_err(ApiError::from)
        .map(|account| ApiSuccess::new(StatusCode::OK, account.into()))
}

pub async fn get_account_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    // No valid username can belong to an account.
    let username =
        Username::new(username).map_err(|_| ApiError::NotFound("Account not found".to_string()))?;

    state
        .auth_service
        .get_account_by_username(&username)
        .await
        .map_err(ApiError::from)
        .map(|account| ApiSuccess::new(StatusCode::OK, account.into()))
}

/// HTTP request body for a partial profile update (raw JSON)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateProfileRequest {
    display_name: Option<String>,
    bio: Option<String>,
    profile_image_url: Option<String>,
}

impl UpdateProfileRequest {
    fn try_into_command(self) -> Result<UpdateProfileCommand, ValidationError> {
        Ok(UpdateProfileCommand {
            display_name: self.display_name.map(DisplayName::new).transpose()?,
            bio: self.bio,
            profile_image_url: self.profile_image_url,
        })
    }
}
