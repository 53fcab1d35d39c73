//! Transform dispatch: which transforms run for a file kind, and in what
//! order.
//!
//! Policy table (kind × mode):
//!
//! | kind     | always        | production only             | development only |
//! |----------|---------------|-----------------------------|------------------|
//! | html     | version stamp | conservative minify         | reload snippet   |
//! | appcache | version stamp | —                           | —                |
//! | js       | —             | annotate → mangle → compress| —                |
//! | css      | —             | minify                      | —                |
//!
//! Scripts are annotated *before* mangling; see [`annotate`] for why the
//! order matters.

pub mod annotate;
pub mod css;
pub mod html;
pub mod js;
pub mod reload;
pub mod version;

use crate::error::ServeError;
use crate::folder::kind::FileKind;

/// Per-request transform context.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Production classification of the request.
    pub production: bool,
    /// Version string stamped into markup and manifests.
    pub version: Option<&'a str>,
    /// Port embedded into the reload snippet for development responses.
    pub reload_port: u16,
}

/// First transform phase, applied to the primary document before includes
/// are inlined: version stamping, plus script/stylesheet minification in
/// production.
pub fn prepare(
    kind: FileKind,
    name: &str,
    text: String,
    ctx: &Context,
) -> Result<String, ServeError> {
    match kind {
        FileKind::Html | FileKind::Appcache => Ok(version::stamp(&text, ctx.version)),
        FileKind::Js if ctx.production => js::minify(&annotate::annotate(&text))
            .ok_or_else(|| ServeError::transform(name)),
        FileKind::Css if ctx.production => {
            css::minify(&text).ok_or_else(|| ServeError::transform(name))
        }
        _ => Ok(text),
    }
}

/// Final transform phase, applied after includes are inlined: markup is
/// minified in production, or given the reload snippet in development.
pub fn finalize(kind: FileKind, text: String, ctx: &Context) -> String {
    match kind {
        FileKind::Html if ctx.production => html::minify(&text),
        FileKind::Html => reload::inject(&text, ctx.reload_port),
        _ => text,
    }
}

/// Transform an include file's content for inlining. Includes only exist in
/// production, so scripts and stylesheets are always minified here. Returns
/// `Ok(None)` for kinds that cannot be inlined.
pub fn inline(kind: FileKind, name: &str, text: &str) -> Result<Option<String>, ServeError> {
    match kind {
        FileKind::Js => js::minify(&annotate::annotate(text))
            .map(Some)
            .ok_or_else(|| ServeError::transform(name)),
        FileKind::Css => css::minify(text)
            .map(Some)
            .ok_or_else(|| ServeError::transform(name)),
        _ => Ok(None),
    }
}
