//! Authentication primitives library
//!
//! Provides the stateless and process-local building blocks of the auth service:
//! - Password hashing (Argon2id)
//! - Bearer token issuance and validation (HS256 JWT)
//! - Single-use OAuth state nonces
//! - Authentication coordination
//!
//! Nothing here performs I/O; account storage and identity providers live in
//! the service crate.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## Bearer Tokens
//! ```
//! use auth::TokenManager;
//!
//! let manager = TokenManager::with_expiration_hours(b"secret_key_at_least_32_bytes_long!", 24);
//! let issued = manager.issue("account-1", "alice", "alice@example.com").unwrap();
//! let claims = manager.validate(&issued.access_token).unwrap();
//! assert_eq!(claims.username, "alice");
//! ```
//!
//! ## OAuth State
//! ```
//! use auth::OAuthStateStore;
//!
//! let store = OAuthStateStore::new();
//! let state = store.issue();
//! assert!(store.consume(&state));
//! assert!(!store.consume(&state));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod state;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenClaims;
pub use jwt::TokenManager;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use state::OAuthStateStore;
