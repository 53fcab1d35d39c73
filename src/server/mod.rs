//! HTTP server: routes requests to folders and writes responses.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tiny_http::{Header, Request, Response, Server, StatusCode};

use crate::config::Config;
use crate::folder::plan::{ServeOptions, ServeRequest};
use crate::folder::{Folder, FolderOptions, ServeOutcome};
use crate::{log, reload};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// A folder mounted on a route prefix with its route-bound serve options.
struct Mount {
    route: String,
    folder: Folder,
    options: ServeOptions,
}

/// Run the server until interrupted.
pub fn run(config: Config) -> Result<()> {
    let notifier = if config.serve.watch {
        let paths: Vec<_> = config.folder.iter().map(|f| f.path.clone()).collect();
        Some(reload::start(config.serve.reload_port, &paths)?)
    } else {
        None
    };
    let reload_port = notifier
        .as_ref()
        .map(reload::Notifier::port)
        .unwrap_or(config.serve.reload_port);

    let mounts = Arc::new(build_mounts(&config, reload_port));

    let (server, addr) = bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    log!("serve"; "http://{}", addr);

    register_shutdown(Arc::clone(&server))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    for request in server.incoming_requests() {
        let mounts = Arc::clone(&mounts);
        runtime.spawn(async move {
            if let Err(e) = handle_request(request, &mounts).await {
                log!("serve"; "request error: {e}");
            }
        });
    }

    log!("serve"; "shutting down");
    Ok(())
}

/// Build one mount per configured folder, longest route first so prefix
/// matching picks the most specific mount.
fn build_mounts(config: &Config, reload_port: u16) -> Vec<Mount> {
    let mut mounts: Vec<Mount> = config
        .folder
        .iter()
        .map(|fc| Mount {
            route: fc.route.clone(),
            folder: Folder::new(
                fc.route.clone(),
                fc.path.clone(),
                FolderOptions {
                    version: fc.version.clone(),
                    reload_port,
                },
            ),
            options: ServeOptions {
                force: false,
                file_name: fc.file.clone(),
                include: fc.include.clone(),
            },
        })
        .collect();
    mounts.sort_by_key(|m| std::cmp::Reverse(m.route.len()));
    mounts
}

/// Handle a single HTTP request.
async fn handle_request(request: Request, mounts: &[Mount]) -> Result<()> {
    let serve_request = to_serve_request(&request);

    let Some(mount) = mounts
        .iter()
        .find(|m| route_matches(&m.route, &serve_request.path))
    else {
        let response = Response::from_string("Not found").with_status_code(StatusCode(404));
        request.respond(response)?;
        return Ok(());
    };

    let outcome = mount.folder.respond(&serve_request, &mount.options).await;
    write_outcome(request, outcome)
}

/// Translate a tiny_http request into the pipeline's request value.
fn to_serve_request(request: &Request) -> ServeRequest {
    let original_url = request.url().to_string();
    let path = original_url
        .split('?')
        .next()
        .unwrap_or(&original_url)
        .to_string();

    ServeRequest {
        force: query_param(&original_url, "force").is_some(),
        host: host_of(request),
        path,
        original_url,
    }
}

/// Request host name without the port, defaulting to `localhost`.
fn host_of(request: &Request) -> String {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case("host"))
        .map(|h| strip_port(h.value.as_str()).to_string())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Drop the port from a Host header value. Bracketed IPv6 hosts keep their
/// colons: `[::1]:8080` yields `::1`.
fn strip_port(value: &str) -> &str {
    if let Some(bracketed) = value.strip_prefix('[') {
        bracketed.split(']').next().unwrap_or(bracketed)
    } else {
        value.split(':').next().unwrap_or(value)
    }
}

/// Extract a query parameter value from a URL.
fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let query = url.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then_some(value)
    })
}

/// Whether a route prefix matches a request path.
fn route_matches(route: &str, path: &str) -> bool {
    if route == "/" {
        return true;
    }
    path == route || path.starts_with(&format!("{route}/"))
}

fn write_outcome(request: Request, outcome: ServeOutcome) -> Result<()> {
    let mut response = Response::from_data(outcome.body.into_bytes())
        .with_status_code(StatusCode(outcome.status))
        .with_header(make_header(
            "X-Cached",
            if outcome.cached { "true" } else { "false" },
        ));
    if let Some(content_type) = outcome.content_type {
        response = response.with_header(make_header("Content-Type", content_type));
    }
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).expect("static header")
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(interface: std::net::IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < MAX_PORT_RETRIES => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    MAX_PORT_RETRIES,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

/// Unblock the request loop on Ctrl+C so the process can exit cleanly.
fn register_shutdown(server: Arc<Server>) -> Result<()> {
    ctrlc::set_handler(move || {
        server.unblock();
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param() {
        assert_eq!(query_param("/x?force=1", "force"), Some("1"));
        assert_eq!(query_param("/x?a=1&force=true", "force"), Some("true"));
        assert_eq!(query_param("/x?force", "force"), Some(""));
        assert_eq!(query_param("/x?other=1", "force"), None);
        assert_eq!(query_param("/x", "force"), None);
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("example.com:8080"), "example.com");
        assert_eq!(strip_port("localhost"), "localhost");
        assert_eq!(strip_port("[::1]:8080"), "::1");
        assert_eq!(strip_port("[2001:db8::1]"), "2001:db8::1");
    }

    #[test]
    fn test_route_matches() {
        assert!(route_matches("/", "/anything"));
        assert!(route_matches("/app", "/app"));
        assert!(route_matches("/app", "/app/main.js"));
        assert!(!route_matches("/app", "/application"));
        assert!(!route_matches("/app", "/other"));
    }

    #[test]
    fn test_mounts_ordered_most_specific_first() {
        let config = crate::config::test_parse_config(
            "[[folder]]\nroute = \"/\"\npath = \"a\"\n\n[[folder]]\nroute = \"/app\"\npath = \"b\"",
        );
        let mounts = build_mounts(&config, 35729);
        assert_eq!(mounts[0].route, "/app");
        assert_eq!(mounts[1].route, "/");
    }
}
