//! GitHub implementation of [`RemoteQuery`].
//!
//! Three structured queries go through the GraphQL endpoint (object lookup,
//! default-branch revision, repository search); binary blob content goes
//! through the raw content host with a plain GET, since a structured query
//! response is no place for large binary payloads.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::types::{FieldShape, GitObject, RepositorySummary};
use super::{ClientError, CredentialSource, RemoteQuery, Result};
use crate::uri::{ObjectPath, RepoId};

/// The single structured-query endpoint.
pub const GRAPHQL_ENDPOINT: &str = "https://api.github.com/graphql";

/// Content-delivery host for raw blob downloads.
pub const RAW_CONTENT_HOST: &str = "raw.githubusercontent.com";

/// Search page size; results beyond the first page are not fetched.
const SEARCH_PAGE_SIZE: u32 = 25;

// =============================================================================
// GitHubClient
// =============================================================================

/// An authenticated connection, cached with the credential generation it was
/// built from.
struct CachedHttp {
    generation: u64,
    http: reqwest::Client,
}

/// GitHub-backed implementation of [`RemoteQuery`].
///
/// The underlying HTTP client is constructed lazily on first use and rebuilt
/// whenever the credential source reports a new generation. Concurrent
/// rebuilds are tolerated; the last one wins and rebuilds carry no side
/// effects.
pub struct GitHubClient {
    credentials: Arc<dyn CredentialSource>,
    endpoint: String,
    raw_host: String,
    cached: Mutex<Option<CachedHttp>>,
}

impl GitHubClient {
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Self {
        Self::with_endpoints(credentials, GRAPHQL_ENDPOINT, RAW_CONTENT_HOST)
    }

    /// Create a client against non-default endpoints.
    pub fn with_endpoints(
        credentials: Arc<dyn CredentialSource>,
        endpoint: impl Into<String>,
        raw_host: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            endpoint: endpoint.into(),
            raw_host: raw_host.into(),
            cached: Mutex::new(None),
        }
    }

    /// Whether a credential is currently available.
    pub fn has_credential(&self) -> bool {
        self.credentials.has_credential()
    }

    /// Drop the cached connection, forcing a rebuild on next use.
    pub fn invalidate(&self) {
        *self.cached.lock().unwrap() = None;
    }

    /// The authenticated HTTP client for the current credential generation.
    fn client(&self) -> Result<reqwest::Client> {
        let generation = self.credentials.generation();

        let mut cached = self.cached.lock().unwrap();
        if let Some(c) = cached.as_ref() {
            if c.generation == generation {
                return Ok(c.http.clone());
            }
        }

        let token = self.credentials.token().ok_or(ClientError::NoCredential)?;

        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .user_agent(concat!("hubfs-rs/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        *cached = Some(CachedHttp {
            generation,
            http: http.clone(),
        });
        Ok(http)
    }

    /// Execute one GraphQL request and decode `data` into `T`.
    async fn graphql<T>(&self, query: &str, variables: serde_json::Value) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let http = self.client()?;
        debug!(%variables, "graphql request");

        let response = http
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let envelope: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        if let Some(errors) = envelope.errors {
            if !errors.is_empty() {
                let message = errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(ClientError::Query(message));
            }
        }

        envelope
            .data
            .ok_or_else(|| ClientError::Decode("response carried no data".to_string()))
    }

    /// Raw-content address for a blob: `https://<host>/<owner>/<repo>/HEAD/<path>`.
    fn raw_content_url(&self, repo: &RepoId, path: &str) -> String {
        format!(
            "https://{}/{}/{}/HEAD/{}",
            self.raw_host, repo.owner, repo.name, path
        )
    }
}

#[async_trait]
impl RemoteQuery for GitHubClient {
    async fn fetch_object(
        &self,
        path: &ObjectPath,
        shape: FieldShape,
        revision: Option<&str>,
    ) -> Result<Option<GitObject>> {
        let query = format!(
            "query fs($owner: String!, $repo: String!, $path: String) {{
    repository(owner: $owner, name: $repo) {{
        object(expression: $path) {{
            {}
        }}
    }}
}}",
            shape.fragment()
        );
        let variables = json!({
            "owner": path.repo.owner,
            "repo": path.repo.name,
            "path": path.revision_expression(revision),
        });

        let data: FsData = self.graphql(&query, variables).await.inspect_err(
            |e| warn!(path = %path, %e, "object query failed"),
        )?;
        Ok(data.repository.and_then(|r| r.object))
    }

    async fn fetch_default_revision(&self, repo: &RepoId) -> Result<Option<String>> {
        const QUERY: &str = "query repo($owner: String!, $repo: String!) {
    repository(owner: $owner, name: $repo) {
        defaultBranchRef {
            target {
                oid
            }
        }
    }
}";
        let variables = json!({ "owner": repo.owner, "repo": repo.name });

        let data: RevisionData = self.graphql(QUERY, variables).await.inspect_err(
            |e| warn!(%repo, %e, "default revision query failed"),
        )?;
        Ok(data
            .repository
            .and_then(|r| r.default_branch_ref)
            .and_then(|r| r.target)
            .map(|t| t.oid))
    }

    async fn search_repositories(&self, raw_query: &str) -> Result<Vec<RepositorySummary>> {
        let Some(search_query) = build_search_query(raw_query) else {
            return Ok(Vec::new());
        };

        let query = format!(
            "query repos($query: String!) {{
    search(type: REPOSITORY, query: $query, first: {SEARCH_PAGE_SIZE}) {{
        edges {{
            node {{
                ... on Repository {{
                    name
                    description
                    url
                    nameWithOwner
                }}
            }}
        }}
    }}
}}"
        );
        let variables = json!({ "query": search_query });

        let data: SearchData = self.graphql(&query, variables).await.inspect_err(
            |e| warn!(query = raw_query, %e, "repository search failed"),
        )?;
        Ok(data
            .search
            .map(|s| s.edges.into_iter().filter_map(|e| e.node).collect())
            .unwrap_or_default())
    }

    async fn fetch_raw(&self, repo: &RepoId, path: &str) -> Result<Vec<u8>> {
        let url = self.raw_content_url(repo, path);
        debug!(%url, "raw content download");

        let response = self.client()?.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "raw content download failed");
            return Err(ClientError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

// =============================================================================
// Search Query Construction
// =============================================================================

/// Turn free-form user input into a GitHub search string.
///
/// Accepted forms: `https://github.com/owner/repo`, `owner/repo`, `owner/`,
/// or a bare name, each with `sort:stars-desc` as the defined tie-break.
/// Returns `None` for empty input.
fn build_search_query(raw: &str) -> Option<String> {
    let mut raw = raw.trim();
    if let Some(stripped) = raw.strip_suffix(".git") {
        raw = stripped;
    }
    if raw.is_empty() {
        return None;
    }

    let rest = raw
        .strip_prefix("https://github.com/")
        .or_else(|| raw.strip_prefix("http://github.com/"))
        .unwrap_or(raw);

    match rest.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
            // Anything after a second slash is noise from a pasted URL.
            let repo = repo.split('/').next().unwrap_or(repo);
            Some(format!("{} in:name user:{} sort:stars-desc", repo, owner))
        }
        Some((owner, _)) if !owner.is_empty() => {
            Some(format!("user:{} sort:stars-desc", owner))
        }
        _ => Some(format!("{} in:name sort:stars-desc", rest)),
    }
}

// =============================================================================
// Response Envelopes
// =============================================================================

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct FsData {
    repository: Option<FsRepository>,
}

#[derive(Deserialize)]
struct FsRepository {
    object: Option<GitObject>,
}

#[derive(Deserialize)]
struct RevisionData {
    repository: Option<RevisionRepository>,
}

#[derive(Deserialize)]
struct RevisionRepository {
    #[serde(rename = "defaultBranchRef")]
    default_branch_ref: Option<RevisionRef>,
}

#[derive(Deserialize)]
struct RevisionRef {
    target: Option<RevisionTarget>,
}

#[derive(Deserialize)]
struct RevisionTarget {
    oid: String,
}

#[derive(Deserialize)]
struct SearchData {
    search: Option<SearchConnection>,
}

#[derive(Deserialize)]
struct SearchConnection {
    edges: Vec<SearchEdge>,
}

#[derive(Deserialize)]
struct SearchEdge {
    node: Option<RepositorySummary>,
}
