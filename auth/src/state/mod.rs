pub mod store;

pub use store::OAuthStateStore;
