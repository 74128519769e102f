//! The virtual filesystem surface and its GitHub-backed provider.

mod provider;

use async_trait::async_trait;
use thiserror::Error;

use crate::uri::RepoUri;

pub use provider::GitHubFileSystem;

// =============================================================================
// Error Types
// =============================================================================

/// Errors surfaced to filesystem consumers.
///
/// Transport failures never appear here: they are logged below this layer
/// and collapse into [`FsError::NotFound`], matching the fail-soft contract.
#[derive(Debug, Error)]
pub enum FsError {
    /// The file or directory does not exist (or could not be reached).
    #[error("file not found: {0}")]
    NotFound(String),

    /// The filesystem is read-only; every mutation fails with this.
    #[error("no permissions: the filesystem is read-only")]
    NoPermissions,
}

/// Result type for filesystem operations.
pub type Result<T> = std::result::Result<T, FsError>;

// =============================================================================
// Entry Types
// =============================================================================

/// What kind of object an identifier addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Unknown,
}

impl FileType {
    /// Map a remote object kind (`Blob`/`Tree`, any case) to an entry kind.
    pub fn from_remote(kind: Option<&str>) -> Self {
        match kind.map(str::to_ascii_lowercase).as_deref() {
            Some("blob") => FileType::File,
            Some("tree") => FileType::Directory,
            _ => FileType::Unknown,
        }
    }
}

/// Metadata for a single filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub kind: FileType,
    /// Byte size for blobs; 0 when unknown or for directories.
    pub size: u64,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: FileType,
}

/// Subscription handle returned by `watch`. Remote repositories are not
/// watched for live changes; releasing the handle does nothing.
#[derive(Debug, Default)]
pub struct WatchHandle(());

impl WatchHandle {
    pub fn dispose(self) {}
}

// =============================================================================
// FileSystemProvider Trait
// =============================================================================

/// The capability contract exposed to the host environment.
///
/// Read operations are asynchronous; mutations exist only to deterministically
/// deny, keeping the surface compatible with hosts that expect the full
/// provider interface.
#[async_trait]
pub trait FileSystemProvider: Send + Sync {
    /// Metadata for the object at `uri`. Repository roots always stat as
    /// directories without any remote traffic.
    async fn stat(&self, uri: &RepoUri) -> Result<FileStat>;

    /// Entries of the tree at `uri`, in the order the remote supplies them.
    /// Empty when the object is absent or not a tree.
    async fn read_directory(&self, uri: &RepoUri) -> Result<Vec<DirEntry>>;

    /// Byte content of the blob at `uri`. Empty for absent or zero-byte
    /// files.
    async fn read_file(&self, uri: &RepoUri) -> Result<Vec<u8>>;

    /// No-op subscription; kept for interface compatibility.
    fn watch(&self, uri: &RepoUri) -> WatchHandle {
        let _ = uri;
        WatchHandle::default()
    }

    // Mutations: the filesystem is read-only by design.

    async fn create_directory(&self, uri: &RepoUri) -> Result<()> {
        let _ = uri;
        Err(FsError::NoPermissions)
    }

    async fn write_file(&self, uri: &RepoUri, content: &[u8]) -> Result<()> {
        let _ = (uri, content);
        Err(FsError::NoPermissions)
    }

    async fn delete(&self, uri: &RepoUri) -> Result<()> {
        let _ = uri;
        Err(FsError::NoPermissions)
    }

    async fn rename(&self, from: &RepoUri, to: &RepoUri) -> Result<()> {
        let _ = (from, to);
        Err(FsError::NoPermissions)
    }

    async fn copy(&self, from: &RepoUri, to: &RepoUri) -> Result<()> {
        let _ = (from, to);
        Err(FsError::NoPermissions)
    }
}
