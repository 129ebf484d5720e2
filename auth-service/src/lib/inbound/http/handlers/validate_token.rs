use axum::http::StatusCode;
use axum::Extension;

use super::AccountData;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedAccount;

/// The bearer middleware has already validated the token and loaded the
/// account; this only echoes it back.
pub async fn validate_token(
    Extension(authenticated): Extension<AuthenticatedAccount>,
) -> ApiSuccess<AccountData> {
    ApiSuccess::new(StatusCode::OK, authenticated.account.into())
}
