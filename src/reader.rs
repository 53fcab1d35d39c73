//! Async file reading for the serve pipeline.
//!
//! Reads never block other in-flight requests; a hung read stalls only the
//! request that issued it.

use std::path::Path;

use tokio::task::JoinSet;

use crate::error::ServeError;

/// A source file loaded from a servable folder.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// The name the file was requested under (relative to the folder root).
    pub name: String,
    /// Full file text.
    pub text: String,
}

/// Read one file relative to `root`.
pub async fn read(root: &Path, name: &str) -> Result<SourceFile, ServeError> {
    let path = root.join(name);
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ServeError::read(name, source))?;
    Ok(SourceFile {
        name: name.to_string(),
        text,
    })
}

/// Read every named file concurrently and collect every outcome.
///
/// No single failure aborts the set: each file settles to its own `Result`,
/// so a missing include never takes down the whole response. Result order is
/// completion order; callers match entries by `SourceFile::name`.
pub async fn read_all_settled(
    root: &Path,
    names: &[String],
) -> Vec<Result<SourceFile, ServeError>> {
    let mut tasks = JoinSet::new();
    for name in names {
        let root = root.to_path_buf();
        let name = name.clone();
        tasks.spawn(async move { read(&root, &name).await });
    }

    let mut settled = Vec::with_capacity(names.len());
    while let Some(joined) = tasks.join_next().await {
        // A panicked read task settles as if the file were unreadable.
        if let Ok(outcome) = joined {
            settled.push(outcome);
        }
    }
    settled
}
