//! The `hubfs://` identifier scheme and its decomposition into GitHub terms.
//!
//! An identifier looks like `hubfs://github.com/owner/repo/src/lib.rs`: the
//! authority is the remote host, the first two path segments are the
//! repository owner and name, and everything after them is the path of a
//! blob or tree inside that repository.
//!
//! Decomposition is total: a malformed identifier with a missing owner or
//! repository segment decomposes to empty strings for the missing parts,
//! which callers treat as the repository-root case rather than an error.

use std::fmt;

use thiserror::Error;
use url::Url;

/// Private scheme registered with the host's filesystem-provider registry.
pub const FILE_SYSTEM_SCHEME: &str = "hubfs";

/// Revision token used in object expressions when no revision is pinned.
pub const HEAD_SENTINEL: &str = "HEAD";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when parsing an identifier.
#[derive(Debug, Error)]
pub enum UriError {
    /// The identifier is not a valid URI at all.
    #[error("invalid identifier: {0}")]
    Invalid(#[from] url::ParseError),

    /// The identifier has a scheme other than `hubfs`.
    #[error("unexpected scheme '{0}', expected '{FILE_SYSTEM_SCHEME}'")]
    Scheme(String),
}

/// Result type for identifier parsing.
pub type Result<T> = std::result::Result<T, UriError>;

// =============================================================================
// RepoId
// =============================================================================

/// Uniquely addresses a remote repository: host, owner, and name.
///
/// Immutable once parsed. An empty `owner` or `name` marks a repository-root
/// identifier that was missing those segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    /// Remote host authority, e.g. `github.com`.
    pub authority: String,
    /// Repository owner login.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoId {
    pub fn new(
        authority: impl Into<String>,
        owner: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            authority: authority.into(),
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.authority, self.owner, self.name)
    }
}

// =============================================================================
// ObjectPath
// =============================================================================

/// Addresses a blob or tree within a repository at an implicit revision.
///
/// The relative path is kept as ordered segments; two paths are equal iff
/// the repository and every segment compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    pub repo: RepoId,
    pub segments: Vec<String>,
}

impl ObjectPath {
    pub fn new(repo: RepoId, segments: Vec<String>) -> Self {
        Self { repo, segments }
    }

    /// The relative path joined with `/`. Empty for the repository root.
    pub fn relative_path(&self) -> String {
        self.segments.join("/")
    }

    /// GitHub object expression `<revision>:<path>`, substituting the
    /// `HEAD` sentinel when no revision is supplied.
    pub fn revision_expression(&self, revision: Option<&str>) -> String {
        format!(
            "{}:{}",
            revision.unwrap_or(HEAD_SENTINEL),
            self.relative_path()
        )
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "{}", self.repo)
        } else {
            write!(f, "{}/{}", self.repo, self.relative_path())
        }
    }
}

// =============================================================================
// RepoUri
// =============================================================================

/// A parsed `hubfs://` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoUri(Url);

impl RepoUri {
    /// Parse an identifier string. Fails only for malformed URIs or foreign
    /// schemes, never for missing owner/repo segments.
    pub fn parse(s: &str) -> Result<Self> {
        let url = Url::parse(s)?;
        if url.scheme() != FILE_SYSTEM_SCHEME {
            return Err(UriError::Scheme(url.scheme().to_string()));
        }
        Ok(Self(url))
    }

    /// Decompose into the repository identifier and relative path segments.
    ///
    /// Total for well-formed identifiers: missing owner or repository
    /// segments come back as empty strings.
    pub fn decompose(&self) -> ObjectPath {
        let mut segments: Vec<String> = self
            .0
            .path_segments()
            .map(|s| s.map(str::to_string).collect())
            .unwrap_or_default();
        // A trailing slash yields a final empty segment; it addresses the
        // same object as the form without it.
        if segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }

        let mut parts = segments.into_iter();
        let owner = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();
        let repo = RepoId::new(self.0.authority(), owner, name);
        ObjectPath::new(repo, parts.collect())
    }

    /// Compose an identifier from its decomposed parts. Round-trips with
    /// [`RepoUri::decompose`] for anything `decompose` can produce.
    pub fn compose(path: &ObjectPath) -> Self {
        let mut s = format!(
            "{}://{}/{}/{}",
            FILE_SYSTEM_SCHEME, path.repo.authority, path.repo.owner, path.repo.name
        );
        if !path.segments.is_empty() {
            s.push('/');
            s.push_str(&path.relative_path());
        }
        // Composed from previously parsed segments, so this cannot fail.
        Self(Url::parse(&s).unwrap_or_else(|_| unreachable!("composed identifier is well-formed")))
    }

    /// Number of path segments after the authority.
    ///
    /// Zero or one means the identifier addresses (at most) an owner, which
    /// the filesystem treats as a repository root.
    pub fn segment_count(&self) -> usize {
        self.decompose_raw_len()
    }

    fn decompose_raw_len(&self) -> usize {
        self.0
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).count())
            .unwrap_or(0)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RepoUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
