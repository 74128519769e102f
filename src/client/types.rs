//! Wire types for the GitHub GraphQL queries.

use serde::Deserialize;

// =============================================================================
// FieldShape
// =============================================================================

/// The set of fields a filesystem operation needs from an object query.
///
/// Each shape maps to a fixed GraphQL fragment; the fragment text also feeds
/// the cache-key digest, so two shapes can never collide in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldShape {
    /// Kind discriminator plus byte size for blobs. Used by `stat`.
    Metadata,
    /// Child entries for trees. Used by `read_directory`.
    Entries,
    /// Content oid, binary flag, and inline text. Used by `read_file`.
    Content,
}

impl FieldShape {
    /// The GraphQL selection placed inside `object(expression: …) { … }`.
    pub fn fragment(self) -> &'static str {
        match self {
            FieldShape::Metadata => {
                "__typename\n... on Blob {\n    byteSize\n}"
            }
            FieldShape::Entries => {
                "... on Tree {\n    entries {\n        name\n        type\n    }\n}"
            }
            FieldShape::Content => {
                "... on Blob {\n    oid\n    isBinary\n    text\n}"
            }
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// A repository object as returned by an object query.
///
/// One struct covers all three field shapes; fields outside the requested
/// shape stay `None`. Never persisted beyond the session cache.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitObject {
    /// Kind discriminator: `Blob` or `Tree`.
    #[serde(rename = "__typename")]
    pub typename: Option<String>,

    /// Blob size in bytes (Metadata shape).
    #[serde(rename = "byteSize")]
    pub byte_size: Option<u64>,

    /// Tree children (Entries shape).
    pub entries: Option<Vec<TreeEntry>>,

    /// Blob content oid (Content shape).
    pub oid: Option<String>,

    /// Whether the blob content is binary (Content shape).
    #[serde(rename = "isBinary")]
    pub is_binary: Option<bool>,

    /// Inline text payload; `None` for binary blobs (Content shape).
    pub text: Option<String>,
}

impl GitObject {
    /// A blob with inline text content, for tests and in-memory remotes.
    pub fn text_blob(oid: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            typename: Some("Blob".to_string()),
            byte_size: Some(text.len() as u64),
            entries: None,
            oid: Some(oid.into()),
            is_binary: Some(false),
            text: Some(text),
        }
    }

    /// A binary blob, for tests and in-memory remotes.
    pub fn binary_blob(oid: impl Into<String>, byte_size: u64) -> Self {
        Self {
            typename: Some("Blob".to_string()),
            byte_size: Some(byte_size),
            entries: None,
            oid: Some(oid.into()),
            is_binary: Some(true),
            text: None,
        }
    }

    /// A tree with the given entries, for tests and in-memory remotes.
    pub fn tree(entries: Vec<TreeEntry>) -> Self {
        Self {
            typename: Some("Tree".to_string()),
            byte_size: None,
            entries: Some(entries),
            oid: None,
            is_binary: None,
            text: None,
        }
    }

    /// Restrict this object to the fields of `shape`, the way the remote
    /// would answer a query of that shape.
    pub fn with_shape(&self, shape: FieldShape) -> Self {
        match shape {
            FieldShape::Metadata => Self {
                typename: self.typename.clone(),
                byte_size: self.byte_size,
                entries: None,
                oid: None,
                is_binary: None,
                text: None,
            },
            FieldShape::Entries => Self {
                typename: None,
                byte_size: None,
                entries: self.entries.clone(),
                oid: None,
                is_binary: None,
                text: None,
            },
            FieldShape::Content => Self {
                typename: None,
                byte_size: None,
                entries: None,
                oid: self.oid.clone(),
                is_binary: self.is_binary,
                text: self.text.clone(),
            },
        }
    }
}

/// One child of a tree object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    /// `blob` or `tree`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// One repository search result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    #[serde(rename = "nameWithOwner")]
    pub name_with_owner: String,
}
