//! JavaScript minification via oxc.
//!
//! The pipeline parses the source, resolves scope, renames local identifiers
//! to shorter forms based on character frequency, then applies compression
//! (constant folding, dead branch removal). Callers that need injection-safe
//! output must run [`super::annotate`] first; mangling renames function
//! parameters, so annotation after mangling is too late.

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Minify JavaScript source code.
///
/// Returns `None` if the source fails to parse.
pub fn minify(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::mjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_folds_constants() {
        let out = minify("let value = 1 + 2; console.log(value);").unwrap();
        assert!(out.contains("console.log(3)"));
    }

    #[test]
    fn test_minify_strips_whitespace() {
        let out = minify("console.log( \"hello\" );\n\nconsole.log( \"world\" );").unwrap();
        assert!(!out.contains("  "));
        assert!(out.contains("hello"));
        assert!(out.contains("world"));
    }

    #[test]
    fn test_minify_rejects_invalid_source() {
        assert!(minify("function (").is_none());
    }
}
