//! File watcher that triggers client disconnects.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use super::{SharedClients, close_all};
use crate::debug;

/// Watch every folder recursively; any visible change closes all connected
/// reload clients. Hidden files (dotfiles) are ignored.
pub fn spawn_watcher(folders: &[PathBuf], clients: SharedClients) -> Result<RecommendedWatcher> {
    let mut watcher =
        notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if event.paths.iter().any(|p| !is_hidden(p)) {
                    debug!("watch"; "change detected, disconnecting clients");
                    close_all(&clients);
                }
            }
            Err(e) => {
                debug!("watch"; "watch error: {}", e);
            }
        })?;

    for folder in folders {
        watcher
            .watch(folder, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch {}", folder.display()))?;
    }

    Ok(watcher)
}

/// Whether any path component is a dotfile.
fn is_hidden(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|s| s.starts_with('.') && s != "." && s != "..")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new("public/.git/config")));
        assert!(is_hidden(Path::new(".cache")));
        assert!(!is_hidden(Path::new("public/index.html")));
        assert!(!is_hidden(Path::new("./public/app.js")));
    }

    #[test]
    fn test_watcher_rejects_missing_folder() {
        let clients: SharedClients =
            std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let missing = vec![PathBuf::from("/nonexistent/folio-watch-test")];
        assert!(spawn_watcher(&missing, clients).is_err());
    }
}
