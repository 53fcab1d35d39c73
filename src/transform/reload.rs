//! Live-reload snippet injection for development responses.
//!
//! The snippet opens a WebSocket to the reload channel; when the watcher
//! closes the connection the page waits briefly and reloads itself. No diff
//! protocol: disconnect means reload.

/// Placeholder token replaced by the reload snippet.
pub const PLACEHOLDER: &str = "<!--reload-->";

/// Client snippet, parameterized by the reload channel port.
const SNIPPET: &str = "<script>\
;(function reload () {\
  var sock = new WebSocket('ws://localhost:<port>/sockreload');\
  sock.onclose = function () {\
    setTimeout(function () { window.location.reload(); }, 100);\
  };\
})();\
</script>";

/// Replace every reload placeholder with the connection snippet.
pub fn inject(text: &str, port: u16) -> String {
    text.replace(PLACEHOLDER, &SNIPPET.replace("<port>", &port.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_embeds_port() {
        let out = inject("<body><!--reload--></body>", 35729);
        assert!(out.contains("ws://localhost:35729/sockreload"));
        assert!(!out.contains(PLACEHOLDER));
        assert!(!out.contains("<port>"));
    }

    #[test]
    fn test_inject_without_placeholder() {
        assert_eq!(inject("<body></body>", 35729), "<body></body>");
    }
}
