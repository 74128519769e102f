//! Subcommand implementations.

use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use super::args::parse_path;
use super::{App, GlobalArgs, Result};
use crate::client::RemoteQuery;
use crate::fs::{FileSystemProvider, FileType};

fn kind_label(kind: FileType) -> &'static str {
    match kind {
        FileType::File => "file",
        FileType::Directory => "directory",
        FileType::Unknown => "unknown",
    }
}

pub async fn search(app: &App, global: &GlobalArgs, query: &str) -> Result<()> {
    // Search failures degrade to an empty listing, like the filesystem.
    let repos = match app.client.search_repositories(query).await {
        Ok(repos) => repos,
        Err(e) => {
            warn!(%e, "repository search failed");
            Vec::new()
        }
    };

    if global.json {
        let items: Vec<_> = repos
            .iter()
            .map(|r| {
                json!({
                    "name": r.name,
                    "nameWithOwner": r.name_with_owner,
                    "url": r.url,
                    "description": r.description,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for repo in repos {
        match &repo.description {
            Some(description) => {
                println!("{}\t{}\t{}", repo.name_with_owner, repo.url, description)
            }
            None => println!("{}\t{}", repo.name_with_owner, repo.url),
        }
    }
    Ok(())
}

pub async fn stat(app: &App, global: &GlobalArgs, path: &str) -> Result<()> {
    let uri = parse_path(path)?;
    app.revisions.ensure_pinned(&uri.decompose().repo).await;

    let stat = app.fs.stat(&uri).await?;
    if global.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "path": uri.to_string(),
                "kind": kind_label(stat.kind),
                "size": stat.size,
            }))?
        );
    } else {
        println!("{}\t{}\t{}", kind_label(stat.kind), stat.size, uri);
    }
    Ok(())
}

pub async fn ls(app: &App, global: &GlobalArgs, path: &str) -> Result<()> {
    let uri = parse_path(path)?;
    app.revisions.ensure_pinned(&uri.decompose().repo).await;

    let entries = app.fs.read_directory(&uri).await?;
    if global.json {
        let items: Vec<_> = entries
            .iter()
            .map(|e| json!({ "name": e.name, "kind": kind_label(e.kind) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for entry in entries {
        match entry.kind {
            FileType::Directory => println!("{}/", entry.name),
            _ => println!("{}", entry.name),
        }
    }
    Ok(())
}

pub async fn cat(app: &App, path: &str) -> Result<()> {
    let uri = parse_path(path)?;
    app.revisions.ensure_pinned(&uri.decompose().repo).await;

    let bytes = app.fs.read_file(&uri).await?;
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&bytes).await?;
    stdout.flush().await?;
    Ok(())
}

pub async fn pin(app: &App, global: &GlobalArgs, repo: &str) -> Result<()> {
    let uri = parse_path(repo)?;
    let root = uri.decompose().repo;

    let revision = app.revisions.ensure_pinned(&root).await;
    if global.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "repository": root.to_string(),
                "revision": revision,
            }))?
        );
        return Ok(());
    }

    match revision {
        Some(revision) => println!("{}\t{}", root, revision),
        None => println!("{}\tunresolved", root),
    }
    Ok(())
}
