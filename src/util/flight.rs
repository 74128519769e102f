//! In-flight request coalescing for concurrent async operations.
//!
//! [`Flight`] collapses concurrent calls with the same key into a single
//! execution: the first caller becomes the leader and runs the operation,
//! later callers subscribe to the leader's result instead of issuing their
//! own. Once the leader finishes, the key is released and a subsequent call
//! executes fresh.
//!
//! This is how the filesystem guarantees that N concurrent revision
//! resolutions (or metadata probes) for the same key turn into exactly one
//! network round trip.
//!
//! # Cancellation
//!
//! If the leader is cancelled before publishing its result, followers
//! observe a closed channel and fall back to executing the operation
//! themselves.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;

use tokio::sync::broadcast;

/// Coalesces concurrent async calls that share a key.
///
/// Results are broadcast to followers, so both the value and error types
/// must be cloneable.
pub struct Flight<K, V, E> {
    in_flight: Mutex<HashMap<K, broadcast::Sender<Result<V, E>>>>,
}

/// The leader's claim on a key. Dropping the lease without [`Lease::release`]
/// (the leader was cancelled mid-operation) removes the entry, which closes
/// the broadcast channel and unblocks any followers.
struct Lease<'a, K, V, E>
where
    K: Hash + Eq,
{
    map: &'a Mutex<HashMap<K, broadcast::Sender<Result<V, E>>>>,
    key: Option<K>,
}

impl<K, V, E> Lease<'_, K, V, E>
where
    K: Hash + Eq,
{
    /// Remove the entry and hand back its sender for publishing the result.
    fn release(mut self) -> Option<broadcast::Sender<Result<V, E>>> {
        let key = self.key.take()?;
        self.map.lock().unwrap().remove(&key)
    }
}

impl<K, V, E> Drop for Lease<'_, K, V, E>
where
    K: Hash + Eq,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.map.lock().unwrap().remove(&key);
        }
    }
}

impl<K, V, E> Flight<K, V, E>
where
    K: Hash + Eq + Clone,
    V: Clone,
    E: Clone,
{
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Execute `f` under coalescing: at most one execution per key is in
    /// flight at a time, and every concurrent caller receives a clone of
    /// that execution's result.
    pub async fn run<F, Fut>(&self, key: K, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // Either subscribe to an existing leader or register as the leader.
        // Registration and subscription happen under the same lock, so a
        // follower can never miss the leader's broadcast. The guard must go
        // out of scope before any await point.
        let role = {
            let mut map = self.in_flight.lock().unwrap();
            match map.get(&key) {
                Some(tx) => Err(tx.subscribe()),
                None => {
                    let (tx, _) = broadcast::channel(1);
                    map.insert(key.clone(), tx);
                    Ok(Lease {
                        map: &self.in_flight,
                        key: Some(key.clone()),
                    })
                }
            }
        };

        let lease = match role {
            Err(mut rx) => {
                return match rx.recv().await {
                    Ok(result) => result,
                    // Leader dropped without publishing (cancelled); run it
                    // ourselves.
                    Err(_) => Box::pin(self.run(key, f)).await,
                };
            }
            Ok(lease) => lease,
        };

        let result = f().await;

        // Release before sending, so a late caller subscribes to a fresh
        // execution rather than a channel that has already broadcast.
        if let Some(tx) = lease.release() {
            // No followers is fine.
            let _ = tx.send(result.clone());
        }
        result
    }

    /// Number of keys currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().unwrap().len()
    }
}

impl<K, V, E> Default for Flight<K, V, E>
where
    K: Hash + Eq + Clone,
    V: Clone,
    E: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
