//! Remote query client: structured queries against the GitHub API.
//!
//! The [`RemoteQuery`] trait is the seam between the virtual filesystem and
//! the network. [`GitHubClient`] implements it over the GraphQL endpoint and
//! the raw-content host; [`MemoryRemote`] implements it in memory for tests
//! and offline use.
//!
//! Errors stay explicit at this layer: callers above (the filesystem
//! provider and revision tracker) decide where to collapse them into the
//! fail-soft "not found" contract.

mod github_client;
mod memory_remote;
mod types;

use async_trait::async_trait;

pub use github_client::{GitHubClient, GRAPHQL_ENDPOINT, RAW_CONTENT_HOST};
pub use memory_remote::MemoryRemote;
pub use types::{FieldShape, GitObject, RepositorySummary, TreeEntry};

use crate::uri::{ObjectPath, RepoId};

// =============================================================================
// Error Types
// =============================================================================

/// Error type for remote query operations.
///
/// Clonable so coalesced in-flight requests can hand the same failure to
/// every waiting caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No access credential is configured.
    NoCredential,
    /// Transport-level failure (connect, TLS, timeout).
    Transport(String),
    /// The remote answered with a non-success HTTP status.
    Status(u16),
    /// The response body could not be decoded.
    Decode(String),
    /// The query executed but the remote reported errors.
    Query(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NoCredential => write!(f, "no access token configured"),
            ClientError::Transport(msg) => write!(f, "transport error: {}", msg),
            ClientError::Status(code) => write!(f, "unexpected status code: {}", code),
            ClientError::Decode(msg) => write!(f, "decode error: {}", msg),
            ClientError::Query(msg) => write!(f, "query error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            ClientError::Status(status.as_u16())
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

/// Result type for remote query operations.
pub type Result<T> = std::result::Result<T, ClientError>;

// =============================================================================
// CredentialSource
// =============================================================================

/// Narrow credential abstraction the client depends on.
///
/// The generation counter is the explicit "credential changed" signal: the
/// client caches its authenticated connection together with the generation
/// it was built from and rebuilds whenever the two diverge.
pub trait CredentialSource: Send + Sync {
    /// The current access token, if one is configured.
    fn token(&self) -> Option<String>;

    /// Monotonic counter bumped on every credential change.
    fn generation(&self) -> u64;

    /// Whether a token is currently available. Exposed so the UI layer can
    /// prompt before any remote call is attempted.
    fn has_credential(&self) -> bool {
        self.token().is_some()
    }
}

// =============================================================================
// RemoteQuery Trait
// =============================================================================

/// The query surface the filesystem core is built on.
///
/// All operations are asynchronous and side-effect free beyond network I/O.
#[async_trait]
pub trait RemoteQuery: Send + Sync {
    /// Resolve a repository object (blob or tree) at a revision-qualified
    /// path, requesting exactly the fields of `shape`.
    ///
    /// `Ok(None)` means the object does not exist at that path.
    async fn fetch_object(
        &self,
        path: &ObjectPath,
        shape: FieldShape,
        revision: Option<&str>,
    ) -> Result<Option<GitObject>>;

    /// Resolve the repository's default-branch head commit oid.
    ///
    /// `Ok(None)` means the repository (or its default branch) was not found.
    async fn fetch_default_revision(&self, repo: &RepoId) -> Result<Option<String>>;

    /// Free-text repository search, ranked by the server (descending stars
    /// as the tie-break), capped at one page. Empty or whitespace-only
    /// query text yields an empty result without a network call.
    async fn search_repositories(&self, raw_query: &str) -> Result<Vec<RepositorySummary>>;

    /// Fetch raw blob bytes from the content-delivery host. Used for binary
    /// blobs, whose content the structured query cannot carry.
    async fn fetch_raw(&self, repo: &RepoId, path: &str) -> Result<Vec<u8>>;
}
