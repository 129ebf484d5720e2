use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Serialize;

use super::claims::TokenClaims;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Bearer token issued to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Issues and validates account bearer tokens.
///
/// Stateless apart from the signing secret and the configured lifetime, so a
/// single instance can be shared freely between concurrent requests.
pub struct TokenManager {
    handler: JwtHandler,
    ttl: Duration,
}

impl TokenManager {
    pub const TOKEN_TYPE: &'static str = "Bearer";

    /// Create a token manager.
    ///
    /// # Arguments
    /// * `secret` - HMAC signing secret
    /// * `ttl` - Lifetime of issued tokens
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            handler: JwtHandler::new(secret),
            ttl,
        }
    }

    /// Create a token manager whose tokens live for `hours`.
    pub fn with_expiration_hours(secret: &[u8], hours: i64) -> Self {
        Self::new(secret, Duration::hours(hours))
    }

    /// Configured token lifetime in seconds.
    pub fn expires_in(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for an account, valid from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(
        &self,
        account_id: impl ToString,
        username: &str,
        email: &str,
    ) -> Result<IssuedToken, JwtError> {
        self.issue_at(account_id, username, email, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        account_id: impl ToString,
        username: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let claims = TokenClaims::for_account(account_id, username, email, now, self.ttl);
        let access_token = self.handler.encode(&claims)?;

        Ok(IssuedToken {
            access_token,
            token_type: Self::TOKEN_TYPE,
            expires_in: self.expires_in(),
        })
    }

    /// Validate a token against the current time.
    ///
    /// # Errors
    /// * `InvalidToken` - Signature mismatch or malformed token
    /// * `TokenExpired` - Signature is valid but the token is past its expiry
    pub fn validate(&self, token: &str) -> Result<TokenClaims, JwtError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token against an explicit clock.
    ///
    /// The signature is checked first, so a tampered expired token reports
    /// `InvalidToken`, never `TokenExpired`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, JwtError> {
        let claims: TokenClaims = self.handler.decode(token)?;

        if claims.is_expired(now.timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn manager() -> TokenManager {
        TokenManager::with_expiration_hours(SECRET, 24)
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let manager = manager();

        let issued = manager
            .issue("5f0c3e52-1b7d-4a7e-9d0a-2f4a3c1b9e11", "alice", "alice@example.com")
            .expect("Failed to issue token");

        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 24 * 60 * 60);

        let claims = manager
            .validate(&issued.access_token)
            .expect("Token validation failed");
        assert_eq!(claims.sub, "5f0c3e52-1b7d-4a7e-9d0a-2f4a3c1b9e11");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_default_ttl_is_honoured_at_boundary() {
        let manager = manager();
        let issued_at = Utc::now();
        let issued = manager
            .issue_at("account-1", "alice", "alice@example.com", issued_at)
            .unwrap();

        let at_expiry = issued_at + Duration::hours(24);
        assert!(manager.validate_at(&issued.access_token, at_expiry).is_ok());

        let after_expiry = at_expiry + Duration::seconds(1);
        assert_eq!(
            manager.validate_at(&issued.access_token, after_expiry),
            Err(JwtError::TokenExpired)
        );
    }

    #[test]
    fn test_expired_token() {
        let manager = TokenManager::new(SECRET, Duration::minutes(5));
        let issued = manager
            .issue_at(
                "account-1",
                "alice",
                "alice@example.com",
                Utc::now() - Duration::minutes(10),
            )
            .unwrap();

        assert_eq!(
            manager.validate(&issued.access_token),
            Err(JwtError::TokenExpired)
        );
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let manager = manager();
        let issued = manager
            .issue("account-1", "alice", "alice@example.com")
            .unwrap();

        let (signed_part, signature) = issued.access_token.rsplit_once('.').unwrap();

        for position in 0..signature.len() {
            let mut bytes = signature.as_bytes().to_vec();
            bytes[position] = if bytes[position] == b'A' { b'B' } else { b'A' };
            let tampered = format!(
                "{}.{}",
                signed_part,
                String::from_utf8(bytes).expect("base64url is ascii")
            );

            assert_eq!(
                manager.validate(&tampered),
                Err(JwtError::InvalidToken),
                "signature position {} accepted after tampering",
                position
            );
        }
    }

    #[test]
    fn test_tampered_expired_token_reports_invalid() {
        let manager = TokenManager::new(SECRET, Duration::minutes(1));
        let issued = manager
            .issue_at(
                "account-1",
                "alice",
                "alice@example.com",
                Utc::now() - Duration::hours(1),
            )
            .unwrap();

        let tampered = format!("{}x", issued.access_token);
        assert_eq!(manager.validate(&tampered), Err(JwtError::InvalidToken));
    }

    #[test]
    fn test_token_from_other_secret_is_invalid() {
        let other = TokenManager::with_expiration_hours(b"another_secret_key_of_32_bytes_ok!", 24);
        let issued = other
            .issue("account-1", "alice", "alice@example.com")
            .unwrap();

        assert_eq!(
            manager().validate(&issued.access_token),
            Err(JwtError::InvalidToken)
        );
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        assert_eq!(manager().validate("garbage"), Err(JwtError::InvalidToken));
    }
}
