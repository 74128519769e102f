//! hubfs-rs - a virtual, read-only filesystem over remote GitHub repositories.
//!
//! Browsing happens entirely through the GitHub GraphQL API: no clone, no
//! working tree. Filesystem operations (stat, list, read) are translated into
//! structured queries, memoized for the session, and resolved against a
//! revision pinned per repository root so a workspace stays consistent even
//! when the remote branch advances.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod fs;
pub mod revision;
pub mod uri;
pub mod util;

pub use cache::{CacheKey, QueryCache};
pub use client::{
    ClientError, CredentialSource, FieldShape, GitHubClient, GitObject, MemoryRemote, RemoteQuery,
    RepositorySummary, TreeEntry,
};
pub use config::{Config, ConfigError, ConfigSource, CredentialStore};
pub use fs::{
    DirEntry, FileStat, FileSystemProvider, FileType, FsError, GitHubFileSystem, WatchHandle,
};
pub use revision::RevisionTracker;
pub use uri::{ObjectPath, RepoId, RepoUri, UriError};
pub use util::Flight;
