//! GitHub-backed [`FileSystemProvider`].
//!
//! Each operation is stateless in itself: decompose the identifier, consult
//! the session cache, issue the structured query at the pinned revision on a
//! miss, classify the result. Transport errors are logged and collapse into
//! the not-found sentinel here — below this layer they stay distinguishable.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{DirEntry, FileStat, FileSystemProvider, FileType, FsError, Result};
use crate::cache::{CacheKey, QueryCache};
use crate::client::{ClientError, FieldShape, GitObject, RemoteQuery};
use crate::revision::RevisionTracker;
use crate::uri::{ObjectPath, RepoUri};

/// A read-only filesystem over GitHub repository content.
pub struct GitHubFileSystem {
    remote: Arc<dyn RemoteQuery>,
    revisions: Arc<RevisionTracker>,
    cache: QueryCache<Option<GitObject>, ClientError>,
}

impl GitHubFileSystem {
    pub fn new(remote: Arc<dyn RemoteQuery>, revisions: Arc<RevisionTracker>) -> Self {
        Self {
            remote,
            revisions,
            cache: QueryCache::new(),
        }
    }

    /// The revision tracker this filesystem records observations into.
    pub fn revisions(&self) -> &Arc<RevisionTracker> {
        &self.revisions
    }

    /// Issue an object query at the root's pinned revision (or `HEAD` when
    /// unpinned), collapsing client errors into "absent".
    async fn query(
        &self,
        uri: &RepoUri,
        path: &ObjectPath,
        shape: FieldShape,
        cached: bool,
    ) -> Option<GitObject> {
        let revision = self.revisions.pinned_revision_for(&path.repo);

        let result = if cached {
            let key = CacheKey::new(uri.as_str(), shape.fragment());
            self.cache
                .get_or_compute(key, || async {
                    self.remote
                        .fetch_object(path, shape, revision.as_deref())
                        .await
                })
                .await
        } else {
            self.remote
                .fetch_object(path, shape, revision.as_deref())
                .await
        };

        match result {
            Ok(object) => object,
            Err(e) => {
                // Absent and unreachable look the same from here on; the
                // client has already logged the difference.
                debug!(%uri, %e, "query failure surfaced as not found");
                None
            }
        }
    }
}

#[async_trait]
impl FileSystemProvider for GitHubFileSystem {
    async fn stat(&self, uri: &RepoUri) -> Result<FileStat> {
        // The repository root always exists and is always a directory; no
        // remote call for it, ever.
        if uri.segment_count() <= 1 {
            return Ok(FileStat {
                kind: FileType::Directory,
                size: 0,
            });
        }

        let path = uri.decompose();
        let data = self.query(uri, &path, FieldShape::Metadata, true).await;

        match data {
            Some(object) => Ok(FileStat {
                kind: FileType::from_remote(object.typename.as_deref()),
                size: object.byte_size.unwrap_or(0),
            }),
            None => Err(FsError::NotFound(uri.to_string())),
        }
    }

    async fn read_directory(&self, uri: &RepoUri) -> Result<Vec<DirEntry>> {
        let path = uri.decompose();
        let data = self.query(uri, &path, FieldShape::Entries, true).await;

        let entries = data.and_then(|o| o.entries).unwrap_or_default();
        Ok(entries
            .into_iter()
            .map(|e| DirEntry {
                kind: FileType::from_remote(Some(&e.kind)),
                name: e.name,
            })
            .collect())
    }

    async fn read_file(&self, uri: &RepoUri) -> Result<Vec<u8>> {
        let path = uri.decompose();
        // Content reads are not memoized: blobs dwarf metadata, and the
        // editor keeps the bytes it has opened.
        let data = self.query(uri, &path, FieldShape::Content, false).await;

        let Some(object) = data else {
            // Missing file reads as empty rather than an error.
            return Ok(Vec::new());
        };

        if let Some(oid) = &object.oid {
            self.revisions.record_observed_revision(uri, oid.clone());
        }

        if object.is_binary.unwrap_or(false) {
            // Structured queries cannot carry binary payloads; switch to a
            // raw content download.
            match self
                .remote
                .fetch_raw(&path.repo, &path.relative_path())
                .await
            {
                Ok(bytes) => Ok(bytes),
                Err(e) => {
                    debug!(%uri, %e, "raw download failure surfaced as empty");
                    Ok(Vec::new())
                }
            }
        } else {
            Ok(object.text.unwrap_or_default().into_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::client::{MemoryRemote, TreeEntry};
    use crate::uri::RepoId;

    fn repo() -> RepoId {
        RepoId::new("github.com", "octo", "hello")
    }

    fn fixture() -> (Arc<MemoryRemote>, GitHubFileSystem) {
        let remote = Arc::new(MemoryRemote::new());
        let tracker = Arc::new(RevisionTracker::new(remote.clone()));
        let fs = GitHubFileSystem::new(remote.clone(), tracker);
        (remote, fs)
    }

    fn uri(s: &str) -> RepoUri {
        RepoUri::parse(s).unwrap()
    }

    #[tokio::test]
    async fn stat_root_is_directory_without_remote_call() {
        let (remote, fs) = fixture();

        for s in [
            "hubfs://github.com/octo",
            "hubfs://github.com/octo/",
            "hubfs://github.com/",
        ] {
            let stat = fs.stat(&uri(s)).await.unwrap();
            assert_eq!(stat.kind, FileType::Directory);
            assert_eq!(stat.size, 0);
        }
        assert_eq!(remote.calls.fetch_object.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stat_blob_reports_kind_and_size() {
        let (remote, fs) = fixture();
        remote.put_object(repo(), "readme.md", GitObject::text_blob("oid1", "hello"));

        let stat = fs
            .stat(&uri("hubfs://github.com/octo/hello/readme.md"))
            .await
            .unwrap();
        assert_eq!(stat.kind, FileType::File);
        assert_eq!(stat.size, 5);
    }

    #[tokio::test]
    async fn stat_tree_reports_directory() {
        let (remote, fs) = fixture();
        remote.put_object(repo(), "src", GitObject::tree(vec![]));

        let stat = fs
            .stat(&uri("hubfs://github.com/octo/hello/src"))
            .await
            .unwrap();
        assert_eq!(stat.kind, FileType::Directory);
        assert_eq!(stat.size, 0);
    }

    #[tokio::test]
    async fn stat_absent_object_is_not_found() {
        let (_remote, fs) = fixture();

        let err = fs
            .stat(&uri("hubfs://github.com/octo/hello/missing.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::NotFound(_)));
    }

    #[tokio::test]
    async fn stat_transport_failure_is_not_found_and_uncached() {
        let (remote, fs) = fixture();
        remote.put_object(repo(), "readme.md", GitObject::text_blob("oid1", "hello"));
        remote.fail_with(ClientError::Transport("connection reset".into()));

        let target = uri("hubfs://github.com/octo/hello/readme.md");
        assert!(matches!(
            fs.stat(&target).await.unwrap_err(),
            FsError::NotFound(_)
        ));

        // Recovery works because failures are never memoized.
        remote.recover();
        assert_eq!(fs.stat(&target).await.unwrap().kind, FileType::File);
    }

    #[tokio::test]
    async fn repeated_stat_hits_the_cache() {
        let (remote, fs) = fixture();
        remote.put_object(repo(), "readme.md", GitObject::text_blob("oid1", "hello"));

        let target = uri("hubfs://github.com/octo/hello/readme.md");
        let first = fs.stat(&target).await.unwrap();
        let second = fs.stat(&target).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(remote.calls.fetch_object.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stat_and_list_same_path_do_not_share_cache_entries() {
        let (remote, fs) = fixture();
        remote.put_object(
            repo(),
            "src",
            GitObject::tree(vec![TreeEntry::new("lib.rs", "blob")]),
        );

        let target = uri("hubfs://github.com/octo/hello/src");
        assert_eq!(fs.stat(&target).await.unwrap().kind, FileType::Directory);
        let listing = fs.read_directory(&target).await.unwrap();
        assert_eq!(listing.len(), 1);
        // Two distinct field shapes, two distinct queries.
        assert_eq!(remote.calls.fetch_object.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn read_directory_preserves_supplied_order() {
        let (remote, fs) = fixture();
        remote.put_object(
            repo(),
            "",
            GitObject::tree(vec![
                TreeEntry::new("a.txt", "blob"),
                TreeEntry::new("sub", "tree"),
            ]),
        );

        let entries = fs
            .read_directory(&uri("hubfs://github.com/octo/hello"))
            .await
            .unwrap();
        assert_eq!(
            entries,
            vec![
                DirEntry {
                    name: "a.txt".into(),
                    kind: FileType::File
                },
                DirEntry {
                    name: "sub".into(),
                    kind: FileType::Directory
                },
            ]
        );
    }

    #[tokio::test]
    async fn read_directory_on_absent_or_blob_is_empty() {
        let (remote, fs) = fixture();
        remote.put_object(repo(), "readme.md", GitObject::text_blob("oid1", "hi"));

        let absent = fs
            .read_directory(&uri("hubfs://github.com/octo/hello/nope"))
            .await
            .unwrap();
        assert!(absent.is_empty());

        let blob = fs
            .read_directory(&uri("hubfs://github.com/octo/hello/readme.md"))
            .await
            .unwrap();
        assert!(blob.is_empty());
    }

    #[tokio::test]
    async fn read_file_returns_text_bytes_and_records_oid() {
        let (remote, fs) = fixture();
        remote.put_object(repo(), "readme.md", GitObject::text_blob("blob-1", "hello"));

        let target = uri("hubfs://github.com/octo/hello/readme.md");
        let bytes = fs.read_file(&target).await.unwrap();
        assert_eq!(bytes, b"hello");
        assert_eq!(
            fs.revisions().observed_revision_for(&target).as_deref(),
            Some("blob-1")
        );
    }

    #[tokio::test]
    async fn read_file_binary_uses_raw_download() {
        let (remote, fs) = fixture();
        let png = vec![0x89, b'P', b'N', b'G', 0x00, 0xFF];
        remote.put_object(
            repo(),
            "logo.png",
            GitObject::binary_blob("blob-2", png.len() as u64),
        );
        remote.put_raw(repo(), "logo.png", png.clone());

        let bytes = fs
            .read_file(&uri("hubfs://github.com/octo/hello/logo.png"))
            .await
            .unwrap();
        assert_eq!(bytes, png);
        assert_eq!(remote.calls.fetch_raw.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn read_file_missing_is_empty() {
        let (_remote, fs) = fixture();

        let bytes = fs
            .read_file(&uri("hubfs://github.com/octo/hello/missing.txt"))
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn mutations_always_fail_with_no_permissions() {
        let (remote, fs) = fixture();
        remote.put_object(repo(), "readme.md", GitObject::text_blob("oid1", "hello"));

        let target = uri("hubfs://github.com/octo/hello/readme.md");
        let other = uri("hubfs://github.com/octo/hello/other.md");

        assert!(matches!(
            fs.create_directory(&target).await.unwrap_err(),
            FsError::NoPermissions
        ));
        assert!(matches!(
            fs.write_file(&target, b"data").await.unwrap_err(),
            FsError::NoPermissions
        ));
        assert!(matches!(
            fs.delete(&target).await.unwrap_err(),
            FsError::NoPermissions
        ));
        assert!(matches!(
            fs.rename(&target, &other).await.unwrap_err(),
            FsError::NoPermissions
        ));
        assert!(matches!(
            fs.copy(&target, &other).await.unwrap_err(),
            FsError::NoPermissions
        ));
    }

    #[tokio::test]
    async fn watch_is_a_no_op() {
        let (_remote, fs) = fixture();
        let handle = fs.watch(&uri("hubfs://github.com/octo/hello"));
        handle.dispose();
    }

    #[tokio::test]
    async fn queries_run_at_the_pinned_revision() {
        let (remote, fs) = fixture();
        remote.put_revision(repo(), "aaa111");
        remote.put_object(repo(), "readme.md", GitObject::text_blob("oid1", "hello"));

        fs.revisions().ensure_pinned(&repo()).await;
        let stat = fs
            .stat(&uri("hubfs://github.com/octo/hello/readme.md"))
            .await
            .unwrap();
        assert_eq!(stat.kind, FileType::File);
    }
}
