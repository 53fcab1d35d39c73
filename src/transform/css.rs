//! CSS minification via lightningcss.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

/// Minify CSS source code.
///
/// Returns `None` if the stylesheet fails to parse or print.
pub fn minify(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_css() {
        let out = minify("body {\n    color: red;\n}\n").unwrap();
        assert_eq!(out, "body{color:red}");
    }

    #[test]
    fn test_minify_merges_rules() {
        let out = minify("a {\n  color: blue;\n}\na {\n  text-decoration: none;\n}\n").unwrap();
        assert!(!out.contains('\n'));
        assert!(out.contains("color:"));
    }
}
