//! Include inlining for markup documents.
//!
//! An include is a secondary source file whose transformed content replaces
//! a literal reference tag in the primary document:
//!
//! - `<script src="NAME"></script>` → `<script>…minified js…</script>`
//! - `<link href="NAME" rel="stylesheet">` → `<style>…minified css…</style>`
//!
//! Tag matching is an exact literal match on the include's file name (the
//! basename of the declared path, so `sub/app.js` matches a
//! `src="app.js"` tag). A failed include read is skipped and its tag left
//! untouched; a tag with no matching declaration is also left as-is.

use std::path::Path;

use crate::debug;
use crate::error::ServeError;
use crate::reader::SourceFile;
use crate::transform;

use super::kind::FileKind;

/// Substitute every successfully read include into the document.
pub fn apply(
    mut document: String,
    settled: Vec<Result<SourceFile, ServeError>>,
) -> Result<String, ServeError> {
    for outcome in settled {
        let file = match outcome {
            Ok(file) => file,
            Err(err) => {
                debug!("serve"; "include skipped: {}", err);
                continue;
            }
        };

        let kind = FileKind::from_name(&file.name);
        let Some(content) = transform::inline(kind, &file.name, &file.text)? else {
            continue;
        };

        let tag_name = Path::new(&file.name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&file.name);

        match kind {
            FileKind::Js => {
                document = document.replace(
                    &format!("<script src=\"{tag_name}\"></script>"),
                    &format!("<script>{content}</script>"),
                );
            }
            FileKind::Css => {
                document = document.replace(
                    &format!("<link href=\"{tag_name}\" rel=\"stylesheet\">"),
                    &format!("<style>{content}</style>"),
                );
            }
            _ => {}
        }
    }
    Ok(document)
}
