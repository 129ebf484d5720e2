use crate::jwt::IssuedToken;
use crate::jwt::JwtError;
use crate::jwt::TokenClaims;
use crate::jwt::TokenManager;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_manager: TokenManager,
}

/// Authentication operation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create an authenticator from its two halves.
    pub fn new(password_hasher: PasswordHasher, token_manager: TokenManager) -> Self {
        Self {
            password_hasher,
            token_manager,
        }
    }


    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Password rejected or hashing failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token for the account.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash (empty for accounts without a password)
    /// * `account_id`, `username`, `email` - Identity placed in the token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match, or there is no usable hash
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        account_id: impl ToString,
        username: &str,
        email: &str,
    ) -> Result<IssuedToken, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.token_manager.issue(account_id, username, email)?)
    }

    /// Spend one password verification on a login attempt for an unknown
    /// account, then reject it.
    ///
    /// Keeps the cost of a rejection independent of whether the account exists.
    pub fn reject_unknown(&self, password: &str) -> AuthenticationError {
        self.password_hasher.verify_decoy(password);
        AuthenticationError::InvalidCredentials
    }

    /// Issue a token without password verification.
    ///
    /// For flows where identity was established by other means, such as an
    /// external identity provider.
    pub fn issue_token(
        &self,
        account_id: impl ToString,
        username: &str,
        email: &str,
    ) -> Result<IssuedToken, JwtError> {
        self.token_manager.issue(account_id, username, email)
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// * `InvalidToken` - Signature mismatch or malformed token
    /// * `TokenExpired` - Token is past its expiry
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, JwtError> {
        self.token_manager.validate(token)
    }

    /// Configured token lifetime in seconds.
    pub fn expires_in(&self) -> i64 {
        self.token_manager.expires_in()
    }
}
