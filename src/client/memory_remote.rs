//! An in-memory implementation of [`RemoteQuery`], intended primarily for
//! testing the filesystem layers without a network.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use super::types::{FieldShape, GitObject, RepositorySummary};
use super::{ClientError, RemoteQuery, Result};
use crate::uri::{ObjectPath, RepoId};

/// Per-operation call counters, for asserting that caching and pinning
/// actually prevent remote round trips.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub fetch_object: AtomicU32,
    pub fetch_default_revision: AtomicU32,
    pub search_repositories: AtomicU32,
    pub fetch_raw: AtomicU32,
}

/// An in-memory remote: a set of repository objects keyed by relative path,
/// plus canned revisions, search results, and raw content.
pub struct MemoryRemote {
    objects: RwLock<HashMap<(RepoId, String), GitObject>>,
    revisions: RwLock<HashMap<RepoId, String>>,
    raw_content: RwLock<HashMap<(RepoId, String), Vec<u8>>>,
    summaries: RwLock<Vec<RepositorySummary>>,
    /// When set, every operation fails with this error.
    failure: RwLock<Option<ClientError>>,
    pub calls: CallCounts,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            revisions: RwLock::new(HashMap::new()),
            raw_content: RwLock::new(HashMap::new()),
            summaries: RwLock::new(Vec::new()),
            failure: RwLock::new(None),
            calls: CallCounts::default(),
        }
    }

    /// Register an object at a relative path within a repository.
    pub fn put_object(&self, repo: RepoId, path: impl Into<String>, object: GitObject) {
        self.objects
            .write()
            .unwrap()
            .insert((repo, path.into()), object);
    }

    /// Set a repository's default-branch head revision.
    pub fn put_revision(&self, repo: RepoId, revision: impl Into<String>) {
        self.revisions.write().unwrap().insert(repo, revision.into());
    }

    /// Register raw bytes served for a blob path.
    pub fn put_raw(&self, repo: RepoId, path: impl Into<String>, bytes: Vec<u8>) {
        self.raw_content
            .write()
            .unwrap()
            .insert((repo, path.into()), bytes);
    }

    /// Set the canned repository search results.
    pub fn put_summaries(&self, summaries: Vec<RepositorySummary>) {
        *self.summaries.write().unwrap() = summaries;
    }

    /// Make every subsequent operation fail with `error`.
    pub fn fail_with(&self, error: ClientError) {
        *self.failure.write().unwrap() = Some(error);
    }

    /// Clear a previously injected failure.
    pub fn recover(&self) {
        *self.failure.write().unwrap() = None;
    }

    fn check_failure(&self) -> Result<()> {
        match self.failure.read().unwrap().as_ref() {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteQuery for MemoryRemote {
    async fn fetch_object(
        &self,
        path: &ObjectPath,
        shape: FieldShape,
        _revision: Option<&str>,
    ) -> Result<Option<GitObject>> {
        self.calls.fetch_object.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let objects = self.objects.read().unwrap();
        Ok(objects
            .get(&(path.repo.clone(), path.relative_path()))
            .map(|o| o.with_shape(shape)))
    }

    async fn fetch_default_revision(&self, repo: &RepoId) -> Result<Option<String>> {
        self.calls
            .fetch_default_revision
            .fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        Ok(self.revisions.read().unwrap().get(repo).cloned())
    }

    async fn search_repositories(&self, raw_query: &str) -> Result<Vec<RepositorySummary>> {
        self.calls.search_repositories.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        if raw_query.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.summaries.read().unwrap().clone())
    }

    async fn fetch_raw(&self, repo: &RepoId, path: &str) -> Result<Vec<u8>> {
        self.calls.fetch_raw.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let raw = self.raw_content.read().unwrap();
        raw.get(&(repo.clone(), path.to_string()))
            .cloned()
            .ok_or(ClientError::Status(404))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoId {
        RepoId::new("github.com", "octo", "hello")
    }

    #[tokio::test]
    async fn serves_registered_objects_shaped() {
        let remote = MemoryRemote::new();
        remote.put_object(
            repo(),
            "readme.md",
            GitObject::text_blob("oid1", "# hello"),
        );

        let path = ObjectPath::new(repo(), vec!["readme.md".into()]);
        let meta = remote
            .fetch_object(&path, FieldShape::Metadata, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(meta.typename.as_deref(), Some("Blob"));
        assert!(meta.text.is_none());

        let content = remote
            .fetch_object(&path, FieldShape::Content, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(content.text.as_deref(), Some("# hello"));
        assert_eq!(remote.calls.fetch_object.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_search_is_empty_even_with_results_registered() {
        let remote = MemoryRemote::new();
        remote.put_summaries(vec![RepositorySummary {
            name: "hello".into(),
            description: None,
            url: "https://github.com/octo/hello".into(),
            name_with_owner: "octo/hello".into(),
        }]);

        assert!(remote.search_repositories("").await.unwrap().is_empty());
        assert!(remote.search_repositories("  ").await.unwrap().is_empty());
        assert_eq!(remote.search_repositories("hello").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn injected_failure_reaches_callers() {
        let remote = MemoryRemote::new();
        remote.fail_with(ClientError::Transport("connection reset".into()));

        let path = ObjectPath::new(repo(), vec!["a".into()]);
        let err = remote
            .fetch_object(&path, FieldShape::Metadata, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));

        remote.recover();
        assert!(
            remote
                .fetch_object(&path, FieldShape::Metadata, None)
                .await
                .unwrap()
                .is_none()
        );
    }
}
