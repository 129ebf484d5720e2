use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::account::errors::AuthError;
use crate::account::errors::UnknownProviderError;
use crate::account::models::AccountProfile;
use crate::account::models::AuthSession;
use crate::account::models::LinkedProviders;

pub mod health;
pub mod login;
pub mod oauth;
pub mod profile;
pub mod register;
pub mod validate_token;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    BadGateway(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ValidationFailed(_) => ApiError::UnprocessableEntity(err.to_string()),
            AuthError::DuplicateEmail | AuthError::DuplicateUsername => {
                ApiError::Conflict(err.to_string())
            }
            AuthError::InvalidCredentials | AuthError::TokenInvalid | AuthError::TokenExpired => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::AccountNotFound => ApiError::NotFound(err.to_string()),
            AuthError::StateInvalidOrExpired => ApiError::BadRequest(err.to_string()),
            AuthError::ProviderExchangeFailed(ref detail) => {
                tracing::error!(error = %detail, "Identity provider exchange failed");
                ApiError::BadGateway(err.to_string())
            }
            AuthError::StorageFailure(ref detail) | AuthError::Internal(ref detail) => {
                tracing::error!(error = %detail, "Request failed");
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<UnknownProviderError> for ApiError {
    fn from(err: UnknownProviderError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Public account representation. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountData {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    #[serde(skip_serializing_if = "LinkedProviders::is_empty")]
    pub oauth_providers: LinkedProviders,
    pub created_at: DateTime<Utc>,
}

impl From<AccountProfile> for AccountData {
    fn from(account: AccountProfile) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username.as_str().to_string(),
            display_name: account.display_name.as_str().to_string(),
            email: account.email.as_str().to_string(),
            bio: account.bio,
            profile_image_url: account.profile_image_url,
            oauth_providers: account.providers,
            created_at: account.created_at,
        }
    }
}

/// Body returned by every flow that signs an account in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponseData {
    pub user: AccountData,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl From<AuthSession> for AuthResponseData {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.account.into(),
            access_token: session.token.access_token,
            token_type: session.token.token_type.to_string(),
            expires_in: session.token.expires_in,
        }
    }
}
