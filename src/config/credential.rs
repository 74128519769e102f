//! Process-wide credential state.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::client::CredentialSource;

/// Holds the GitHub access token and signals changes to consumers.
///
/// Every update bumps a generation counter; the query client compares the
/// counter against the one its cached connection was built from and rebuilds
/// when they diverge. That makes credential rotation an explicit, observable
/// event instead of hidden shared state.
pub struct CredentialStore {
    token: RwLock<Option<String>>,
    generation: AtomicU64,
}

impl CredentialStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.trim().is_empty())),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the token and signal the change.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap() = token.filter(|t| !t.trim().is_empty());
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl CredentialSource for CredentialStore {
    fn token(&self) -> Option<String> {
        self.token.read().unwrap().clone()
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
