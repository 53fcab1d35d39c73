//! Version stamping for markup and cache-manifest documents.

/// Placeholder token replaced by the configured version string.
pub const PLACEHOLDER: &str = "<!--version-->";

/// Default version when none is configured.
pub const DEFAULT_VERSION: &str = "v0.0.0";

/// Replace every version placeholder with the configured version.
pub fn stamp(text: &str, version: Option<&str>) -> String {
    text.replace(PLACEHOLDER, version.unwrap_or(DEFAULT_VERSION))
}
