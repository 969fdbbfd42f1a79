//! Client token store.
//!
//! Tokens live only in process memory: no expiry, no revocation, and a
//! restart forces every client to log in again.

use dashmap::DashMap;
use tracing::info;

use asgard_core::error::AppError;
use asgard_core::result::AppResult;
use asgard_core::types::Username;

use crate::random_hex;

/// Smallest accepted token length in random bytes.
pub const MIN_TOKEN_BYTES: usize = 8;

/// Maps opaque tokens to the usernames they were issued for.
#[derive(Debug)]
pub struct TokenStore {
    tokens: DashMap<String, Username>,
    token_bytes: usize,
}

impl TokenStore {
    /// Create an empty store issuing tokens of `token_bytes` random bytes.
    pub fn new(token_bytes: usize) -> Self {
        Self {
            tokens: DashMap::new(),
            token_bytes: token_bytes.max(MIN_TOKEN_BYTES),
        }
    }

    /// Issue a fresh token bound to `user`.
    pub fn issue(&self, user: &Username) -> String {
        loop {
            let token = random_hex(self.token_bytes);
            if let dashmap::mapref::entry::Entry::Vacant(slot) = self.tokens.entry(token.clone()) {
                slot.insert(user.clone());
                info!(user = %user, "Issued client token");
                return token;
            }
        }
    }

    /// Resolve a presented token to its username.
    pub fn resolve(&self, token: &str) -> AppResult<Username> {
        self.tokens
            .get(token.trim())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::unauthorized("Invalid or missing token"))
    }

    /// All `(username, token)` pairs, ordered by username then token.
    pub fn active_tokens(&self) -> Vec<(Username, String)> {
        let mut pairs: Vec<_> = self
            .tokens
            .iter()
            .map(|entry| (entry.value().clone(), entry.key().clone()))
            .collect();
        pairs.sort();
        pairs
    }

    /// Number of issued tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token has been issued.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(16)
    }
}
