use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;

use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;

/// Single-use, TTL-bounded nonce cache guarding the OAuth redirect handshake.
///
/// Every operation runs under one lock, so concurrent `consume` calls on the
/// same nonce have exactly one winner. Expired entries are swept lazily on
/// `consume`; there is no background timer.
///
/// The cache is process-local. Instances of the service do not share it, so a
/// callback must reach the instance that issued its nonce.
pub struct OAuthStateStore {
    entries: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
}

impl OAuthStateStore {
    /// Default nonce lifetime (5 minutes).
    pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

    /// Random bytes per nonce before hex encoding.
    pub const NONCE_BYTES: usize = 16;

    /// Create a store with the default 5 minute lifetime.
    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    /// Create a store with a custom nonce lifetime.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Issue a fresh nonce valid from now.
    pub fn issue(&self) -> String {
        self.issue_at(Instant::now())
    }

    /// Issue a fresh nonce as if the current instant were `now`.
    pub fn issue_at(&self, now: Instant) -> String {
        let mut bytes = [0u8; Self::NONCE_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let nonce = hex::encode(bytes);

        self.entries.lock().insert(nonce.clone(), now + self.ttl);
        nonce
    }

    /// Consume a nonce. Returns true at most once per issued nonce.
    ///
    /// Fails if the nonce was never issued, was already consumed, or has
    /// expired.
    pub fn consume(&self, nonce: &str) -> bool {
        self.consume_at(nonce, Instant::now())
    }

    /// Consume a nonce as if the current instant were `now`.
    pub fn consume_at(&self, nonce: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock();

        let valid = matches!(entries.remove(nonce), Some(expires_at) if now <= expires_at);
        entries.retain(|_, expires_at| now <= *expires_at);

        valid
    }

    /// Number of nonces currently held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for OAuthStateStore {
    fn default() -> Self {
        Self::new()
    }
}
