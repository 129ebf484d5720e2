pub mod claims;
pub mod errors;
pub mod handler;
pub mod manager;

pub use claims::TokenClaims;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use manager::IssuedToken;
pub use manager::TokenManager;
