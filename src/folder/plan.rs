//! Per-request serve planning.
//!
//! A [`ServePlan`] is the ephemeral descriptor built for each incoming
//! request: the resolved file name, its kind, the production classification
//! and the cache key. Nothing here touches the filesystem.

use super::kind::FileKind;

/// The request fields the serve pipeline consumes, decoupled from the HTTP
/// library so the pipeline can be exercised without a socket.
#[derive(Debug, Clone)]
pub struct ServeRequest {
    /// Request path without the query string.
    pub path: String,
    /// Full original URL including the query string.
    pub original_url: String,
    /// Request host name, without port.
    pub host: String,
    /// `force` query parameter: forces production classification.
    pub force: bool,
}

impl ServeRequest {
    /// Production mode is any host other than exactly `localhost`, or an
    /// explicit force override.
    pub fn is_production(&self, force_option: bool) -> bool {
        self.host != "localhost" || self.force || force_option
    }
}

/// Per-invocation serve options.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    /// Force production classification regardless of host.
    pub force: bool,
    /// Serve this file instead of deriving the name from the request path.
    pub file_name: Option<String>,
    /// Include files to inline into a markup document (production only).
    pub include: Vec<String>,
}

impl ServeOptions {
    /// Options that pin a specific file name.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            file_name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Cache key: one response variant per (host, original URL) pair, so the
/// same file served under different hosts or query strings caches
/// independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub host: String,
    pub url: String,
}

impl CacheKey {
    pub fn new(req: &ServeRequest) -> Self {
        Self {
            host: req.host.clone(),
            url: req.original_url.clone(),
        }
    }
}

/// Resolved plan for one request.
#[derive(Debug, Clone)]
pub struct ServePlan {
    pub file_name: String,
    pub kind: FileKind,
    pub production: bool,
    pub key: CacheKey,
}

impl ServePlan {
    /// Resolve the file name and kind for a request.
    ///
    /// Name precedence: explicit option override, then the last request-path
    /// segment, then `index.html`. A name without an extension defaults to
    /// markup and gets `.html` appended.
    pub fn new(req: &ServeRequest, options: &ServeOptions) -> Self {
        let mut file_name = options
            .file_name
            .clone()
            .or_else(|| {
                req.path
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "index.html".to_string());

        let mut kind = FileKind::from_name(&file_name);
        if !file_name.contains('.') {
            file_name.push_str(".html");
            kind = FileKind::Html;
        }

        Self {
            file_name,
            kind,
            production: req.is_production(options.force),
            key: CacheKey::new(req),
        }
    }
}
