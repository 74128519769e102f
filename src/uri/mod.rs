//! Virtual filesystem identifiers and their mapping to GitHub addressing.

mod repo_uri;

pub use repo_uri::{FILE_SYSTEM_SCHEME, HEAD_SENTINEL, ObjectPath, RepoId, RepoUri, UriError};
