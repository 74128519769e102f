//! Revision pinning and observation.
//!
//! Each workspace root (a repository opened for browsing) is pinned to the
//! default-branch head commit observed on first access, and stays pinned for
//! the session even if the remote branch advances. That keeps hundreds of
//! interleaved stat/list/read operations resolving against one consistent
//! tree.
//!
//! Independently of the pin, the tracker records the most specific revision
//! seen for an exact identifier — the blob oid returned by a content read —
//! so later consumers (a language-server proxy, for instance) can query the
//! exact state the user is viewing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::client::{ClientError, RemoteQuery};
use crate::uri::{RepoId, RepoUri};
use crate::util::Flight;

/// Tracks pinned revisions per workspace root and observed revisions per
/// identifier.
///
/// Root pins are first-write-wins and never overwritten for the life of the
/// tracker; observed revisions are last-write-wins. A root whose resolution
/// fails stays unresolved and is retried on next access.
pub struct RevisionTracker {
    remote: Arc<dyn RemoteQuery>,
    pinned: Mutex<HashMap<RepoId, String>>,
    observed: Mutex<HashMap<String, String>>,
    resolving: Flight<RepoId, Option<String>, ClientError>,
}

impl RevisionTracker {
    pub fn new(remote: Arc<dyn RemoteQuery>) -> Self {
        Self {
            remote,
            pinned: Mutex::new(HashMap::new()),
            observed: Mutex::new(HashMap::new()),
            resolving: Flight::new(),
        }
    }

    /// The revision a workspace root is pinned to, if resolved.
    pub fn pinned_revision_for(&self, root: &RepoId) -> Option<String> {
        self.pinned.lock().unwrap().get(root).cloned()
    }

    /// Resolve and pin the default-branch revision for a root.
    ///
    /// Already-pinned roots return immediately without a network call.
    /// Concurrent callers for the same unpinned root collapse to a single
    /// revision fetch, and all observe the same result. Failures are logged
    /// and reported as `None`; the root stays unresolved and retryable.
    pub async fn ensure_pinned(&self, root: &RepoId) -> Option<String> {
        if let Some(revision) = self.pinned_revision_for(root) {
            return Some(revision);
        }

        let result = self
            .resolving
            .run(root.clone(), || async {
                self.remote.fetch_default_revision(root).await
            })
            .await;

        match result {
            Ok(Some(revision)) => {
                let mut pinned = self.pinned.lock().unwrap();
                let revision = pinned
                    .entry(root.clone())
                    .or_insert_with(|| {
                        debug!(%root, %revision, "pinned workspace root");
                        revision.clone()
                    })
                    .clone();
                Some(revision)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(%root, %e, "revision resolution failed");
                None
            }
        }
    }

    /// Record the most specific revision observed for an exact identifier.
    /// Always overwritten by the latest observation.
    pub fn record_observed_revision(&self, uri: &RepoUri, revision: impl Into<String>) {
        self.observed
            .lock()
            .unwrap()
            .insert(uri.as_str().to_string(), revision.into());
    }

    /// The last revision observed for an exact identifier.
    pub fn observed_revision_for(&self, uri: &RepoUri) -> Option<String> {
        self.observed.lock().unwrap().get(uri.as_str()).cloned()
    }
}
