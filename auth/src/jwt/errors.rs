use thiserror::Error;

/// Error type for token operations.
///
/// Validation never says more than "invalid" or "expired"; the reason a
/// signature failed to verify is intentionally not carried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid")]
    InvalidToken,
}
