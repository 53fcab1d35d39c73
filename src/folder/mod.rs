//! Directory servable units: the request-time transform-and-cache pipeline.
//!
//! A [`Folder`] represents one configured source directory. Per request it
//! resolves a [`plan::ServePlan`], consults its [`cache::ArtifactCache`] for
//! production requests, otherwise reads the primary document, inlines any
//! declared includes, runs the kind-specific transform chain and caches the
//! production result.

pub mod cache;
pub mod include;
pub mod kind;
pub mod plan;

use std::path::PathBuf;

use crate::error::ServeError;
use crate::{debug, reader, transform};

use cache::ArtifactCache;
use kind::FileKind;
use plan::{ServeOptions, ServePlan, ServeRequest};

/// Per-folder configuration.
#[derive(Debug, Clone, Default)]
pub struct FolderOptions {
    /// Version string stamped into markup and cache manifests.
    pub version: Option<String>,
    /// Port embedded into the reload snippet for development responses.
    pub reload_port: u16,
}

/// Finished response for one request.
#[derive(Debug, Clone)]
pub struct ServeOutcome {
    pub status: u16,
    pub content_type: Option<&'static str>,
    /// Whether the body came from the artifact cache (`X-Cached` header).
    pub cached: bool,
    pub body: String,
}

impl ServeOutcome {
    fn hit(kind: FileKind, body: String) -> Self {
        Self {
            status: 200,
            content_type: kind.content_type(),
            cached: true,
            body,
        }
    }

    fn fresh(kind: FileKind, body: String) -> Self {
        Self {
            status: 200,
            content_type: kind.content_type(),
            cached: false,
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: None,
            cached: false,
            body: "Not found".to_string(),
        }
    }

    /// Structured error body (`status`/`reason`), carried with HTTP 500 so
    /// callers need not inspect the body to detect failure.
    fn error(err: &ServeError) -> Self {
        let body = serde_json::json!({
            "status": "ERROR",
            "reason": err.to_string(),
        });
        Self {
            status: 500,
            content_type: Some("application/json"),
            cached: false,
            body: body.to_string(),
        }
    }
}

/// One servable directory with its options and artifact cache.
///
/// Created once at setup time and lives for the process lifetime.
#[derive(Debug)]
pub struct Folder {
    name: String,
    root: PathBuf,
    options: FolderOptions,
    cache: ArtifactCache,
}

impl Folder {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, options: FolderOptions) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            options,
            cache: ArtifactCache::new(),
        }
    }

    /// Handle one request.
    ///
    /// Development-mode cache-manifest requests are always refused: a
    /// manifest with the reload snippet must never end up in a browser's
    /// application cache. Primary read and transform failures become a
    /// structured error outcome, never a panic.
    pub async fn respond(&self, req: &ServeRequest, options: &ServeOptions) -> ServeOutcome {
        let plan = ServePlan::new(req, options);

        if plan.kind == FileKind::Appcache && !plan.production {
            return ServeOutcome::not_found();
        }

        if plan.production
            && let Some(body) = self.cache.get(&plan.key)
        {
            debug!("serve"; "{}: cache hit for {}", self.name, plan.key.url);
            return ServeOutcome::hit(plan.kind, body);
        }

        match self.render(&plan, options).await {
            Ok(body) => {
                if plan.production {
                    self.cache.put(plan.key.clone(), body.clone());
                }
                ServeOutcome::fresh(plan.kind, body)
            }
            Err(err) => {
                debug!("serve"; "{}: {}", self.name, err);
                ServeOutcome::error(&err)
            }
        }
    }

    /// Direct invocation form: serve a specific file through the pipeline.
    pub async fn serve_file(&self, req: &ServeRequest, file_name: &str) -> ServeOutcome {
        self.respond(req, &ServeOptions::file(file_name)).await
    }

    /// Compute the response body for a cache miss.
    async fn render(&self, plan: &ServePlan, options: &ServeOptions) -> Result<String, ServeError> {
        let primary = reader::read(&self.root, &plan.file_name).await?;

        let ctx = transform::Context {
            production: plan.production,
            version: self.options.version.as_deref(),
            reload_port: self.options.reload_port,
        };

        let mut body = transform::prepare(plan.kind, &primary.name, primary.text, &ctx)?;

        if plan.production && !options.include.is_empty() {
            let settled = reader::read_all_settled(&self.root, &options.include).await;
            body = include::apply(body, settled)?;
        }

        Ok(transform::finalize(plan.kind, body, &ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn request(path: &str, host: &str) -> ServeRequest {
        ServeRequest {
            path: path.to_string(),
            original_url: path.to_string(),
            host: host.to_string(),
            force: false,
        }
    }

    fn folder(dir: &TempDir) -> Folder {
        Folder::new(
            "site",
            dir.path(),
            FolderOptions {
                version: Some("v1.2.3".to_string()),
                reload_port: 35729,
            },
        )
    }

    #[tokio::test]
    async fn test_production_caches_second_request() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<p>a</p>\n\n<p>b</p>").unwrap();
        let folder = folder(&dir);
        let req = request("/", "example.com");

        let first = folder.respond(&req, &ServeOptions::default()).await;
        let second = folder.respond(&req, &ServeOptions::default()).await;

        assert_eq!(first.status, 200);
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.body, second.body);
    }

    #[tokio::test]
    async fn test_development_never_touches_cache() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<p>hi</p>").unwrap();
        let folder = folder(&dir);
        let req = request("/", "localhost");

        for _ in 0..3 {
            let outcome = folder.respond(&req, &ServeOptions::default()).await;
            assert!(!outcome.cached);
        }
        assert_eq!(folder.cache.len(), 0);
    }

    #[tokio::test]
    async fn test_development_markup_gets_reload_snippet() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("index.html"),
            "<body><!--reload--></body>",
        )
        .unwrap();
        let folder = folder(&dir);

        let outcome = folder
            .respond(&request("/", "localhost"), &ServeOptions::default())
            .await;
        assert!(outcome.body.contains("ws://localhost:35729/sockreload"));
    }

    #[tokio::test]
    async fn test_extensionless_path_serves_markup() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("about.html"), "<p>about</p>").unwrap();
        let folder = folder(&dir);

        let outcome = folder
            .respond(&request("/about", "example.com"), &ServeOptions::default())
            .await;
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.body, "<p>about</p>");
    }

    #[tokio::test]
    async fn test_manifest_rejected_in_development() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("offline.appcache"),
            "CACHE MANIFEST\n# <!--version-->",
        )
        .unwrap();
        let folder = folder(&dir);

        let outcome = folder
            .respond(
                &request("/offline.appcache", "localhost"),
                &ServeOptions::default(),
            )
            .await;
        assert_eq!(outcome.status, 404);
    }

    #[tokio::test]
    async fn test_manifest_stamped_in_production() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("offline.appcache"),
            "CACHE MANIFEST\n# <!--version-->",
        )
        .unwrap();
        let folder = folder(&dir);

        let outcome = folder
            .respond(
                &request("/offline.appcache", "example.com"),
                &ServeOptions::default(),
            )
            .await;
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.content_type, Some("text/cache-manifest"));
        assert!(outcome.body.contains("v1.2.3"));
        assert!(!outcome.body.contains("<!--version-->"));
    }

    #[tokio::test]
    async fn test_production_inlines_declared_includes() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("index.html"),
            "<html><script src=\"app.js\"></script></html>",
        )
        .unwrap();
        fs::write(
            dir.path().join("app.js"),
            "var greeting = \"hi\";\nconsole.log(greeting);",
        )
        .unwrap();
        let folder = folder(&dir);
        let options = ServeOptions {
            include: vec!["app.js".to_string()],
            ..ServeOptions::default()
        };

        let outcome = folder.respond(&request("/", "example.com"), &options).await;
        assert_eq!(outcome.status, 200);
        assert!(!outcome.body.contains("src=\"app.js\""));
        assert!(outcome.body.contains("<script>"));
        assert!(outcome.body.contains("console.log"));
    }

    #[tokio::test]
    async fn test_missing_include_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("index.html"),
            "<html><script src=\"app.js\"></script></html>",
        )
        .unwrap();
        let folder = folder(&dir);
        let options = ServeOptions {
            include: vec!["app.js".to_string()],
            ..ServeOptions::default()
        };

        let outcome = folder.respond(&request("/", "example.com"), &options).await;
        assert_eq!(outcome.status, 200);
        assert!(outcome.body.contains("<script src=\"app.js\"></script>"));
    }

    #[tokio::test]
    async fn test_includes_ignored_in_development() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("index.html"),
            "<html><script src=\"app.js\"></script></html>",
        )
        .unwrap();
        fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();
        let folder = folder(&dir);
        let options = ServeOptions {
            include: vec!["app.js".to_string()],
            ..ServeOptions::default()
        };

        let outcome = folder.respond(&request("/", "localhost"), &options).await;
        assert!(outcome.body.contains("<script src=\"app.js\"></script>"));
    }

    #[tokio::test]
    async fn test_missing_primary_is_structured_error() {
        let dir = TempDir::new().unwrap();
        let folder = folder(&dir);

        let outcome = folder
            .respond(&request("/", "example.com"), &ServeOptions::default())
            .await;
        assert_eq!(outcome.status, 500);
        assert_eq!(outcome.content_type, Some("application/json"));

        let parsed: serde_json::Value = serde_json::from_str(&outcome.body).unwrap();
        assert_eq!(parsed["status"], "ERROR");
        assert!(parsed["reason"].as_str().unwrap().contains("index.html"));
    }

    #[tokio::test]
    async fn test_script_served_raw_in_development() {
        let dir = TempDir::new().unwrap();
        let src = "let  spaced  =  1;\nconsole.log(spaced);";
        fs::write(dir.path().join("main.js"), src).unwrap();
        let folder = folder(&dir);

        let outcome = folder
            .respond(&request("/main.js", "localhost"), &ServeOptions::default())
            .await;
        assert_eq!(outcome.content_type, Some("application/javascript"));
        assert_eq!(outcome.body, src);
    }

    #[tokio::test]
    async fn test_script_minified_in_production() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("main.js"),
            "let value = 1 + 2;\nconsole.log(value);",
        )
        .unwrap();
        let folder = folder(&dir);

        let outcome = folder
            .respond(&request("/main.js", "example.com"), &ServeOptions::default())
            .await;
        assert!(outcome.body.contains("console.log(3)"));
    }

    #[tokio::test]
    async fn test_serve_file_direct_invocation() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.html"), "<p>pinned</p>").unwrap();
        let folder = folder(&dir);

        let outcome = folder
            .serve_file(&request("/anything", "example.com"), "app.html")
            .await;
        assert_eq!(outcome.body, "<p>pinned</p>");
    }
}
