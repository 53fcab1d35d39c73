//! Dependency-injection annotation for JavaScript sources.
//!
//! Frameworks that inject services by parameter name break once a mangler
//! renames those parameters. This pass records the original parameter names
//! as string annotations before the source reaches the minifier; string
//! literals survive mangling, so runtime lookup still sees the declared
//! names.
//!
//! Two forms are handled:
//!
//! - a bare function literal in a framework registration call is rewritten
//!   into the array-annotated form:
//!   `.controller("main", function($scope) {…})` becomes
//!   `.controller("main", ["$scope", function($scope) {…}])`;
//! - a named function declaration with injectable (`$`-prefixed) parameters
//!   gets `Fn.$inject = ["$scope", …];` appended.
//!
//! The pass is conservative: already-annotated code is left alone, and a
//! function body whose end cannot be located (unbalanced braces) is skipped
//! rather than guessed at.

use std::sync::LazyLock;

use regex::Regex;

/// Bare function literal passed to a framework registration call, with an
/// optional leading name string: `.controller("main", function($scope) {`.
static REG_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\.(?:controller|directive|factory|service|filter|provider|config|run)\(\s*(?:['"][\w.$-]+['"]\s*,\s*)?function\s*\(([^)]*)\)\s*\{"#,
    )
    .expect("valid regex")
});

/// Named function declarations: `function Name(params)`.
static FN_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfunction\s+([A-Za-z_$][\w$]*)\s*\(([^)]*)\)").expect("valid regex")
});

/// Annotate injectable functions with their parameter names.
pub fn annotate(source: &str) -> String {
    let rewritten = annotate_registration_calls(source);
    annotate_named_declarations(&rewritten)
}

/// Rewrite bare function literals in registration calls into the
/// array-annotated form.
fn annotate_registration_calls(source: &str) -> String {
    // (byte offset, text) pairs; a `[params,` opener at the function keyword
    // and a `]` closer after the function body for each annotated call.
    let mut insertions: Vec<(usize, String)> = Vec::new();

    for caps in REG_CALL.captures_iter(source) {
        let matched = caps.get(0).expect("whole match");
        let params_group = caps.get(1).expect("params group");

        let params: Vec<&str> = params_group
            .as_str()
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if params.is_empty() {
            continue;
        }

        // The function keyword sits between the optional name string and the
        // parameter list; search backwards from the parameters so a name
        // literal can never be mistaken for it.
        let Some(offset) = source[matched.start()..params_group.start()].rfind("function") else {
            continue;
        };
        let fn_start = matched.start() + offset;

        // The match ends on the body's opening brace.
        let Some(body_end) = find_matching_brace(source, matched.end() - 1) else {
            continue;
        };

        let quoted: Vec<String> = params.iter().map(|p| format!("\"{p}\"")).collect();
        insertions.push((fn_start, format!("[{}, ", quoted.join(", "))));
        insertions.push((body_end + 1, "]".to_string()));
    }

    if insertions.is_empty() {
        return source.to_string();
    }

    // Apply back to front so earlier offsets stay valid.
    insertions.sort_by(|a, b| b.0.cmp(&a.0));
    let mut out = source.to_string();
    for (pos, text) in insertions {
        out.insert_str(pos, &text);
    }
    out
}

/// Append `Fn.$inject = […];` for named declarations with `$`-prefixed
/// parameters. Annotations go at the end of the source so the relative
/// order of existing statements is preserved.
fn annotate_named_declarations(source: &str) -> String {
    let mut annotations = String::new();

    for caps in FN_DECL.captures_iter(source) {
        let name = &caps[1];
        let params: Vec<&str> = caps[2]
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if params.is_empty() || !params.iter().any(|p| p.starts_with('$')) {
            continue;
        }
        // Already annotated by hand.
        if source.contains(&format!("{name}.$inject")) {
            continue;
        }

        let quoted: Vec<String> = params.iter().map(|p| format!("\"{p}\"")).collect();
        annotations.push_str(&format!("\n{name}.$inject = [{}];", quoted.join(", ")));
    }

    if annotations.is_empty() {
        source.to_string()
    } else {
        let mut out = String::with_capacity(source.len() + annotations.len());
        out.push_str(source);
        out.push_str(&annotations);
        out
    }
}

/// Index of the `}` closing the brace at `open`, skipping string literals
/// and comments. Returns `None` for unbalanced input.
fn find_matching_brace(source: &str, open: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'\'' | b'"' | b'`' => i = skip_string(bytes, i)?,
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the quote closing the string opened at `start`.
fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == quote {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotates_registration_call_literal() {
        let out = annotate("app.controller(\"main\", function($scope, $http) { $scope.x = 1; });");
        assert_eq!(
            out,
            "app.controller(\"main\", [\"$scope\", \"$http\", function($scope, $http) { $scope.x = 1; }]);"
        );
    }

    #[test]
    fn test_annotates_nameless_registration_call() {
        let out = annotate("app.config(function($routeProvider) { $routeProvider.when(\"/\"); });");
        assert!(out.starts_with("app.config([\"$routeProvider\", function($routeProvider)"));
        assert!(out.ends_with("}]);"));
    }

    #[test]
    fn test_registration_call_with_braces_in_body() {
        let src = "app.run(function($rootScope) { $rootScope.user = { name: \"a\", tags: {} }; });";
        let out = annotate(src);
        assert!(out.starts_with("app.run([\"$rootScope\", function($rootScope)"));
        assert!(out.ends_with("}]);"));
    }

    #[test]
    fn test_skips_array_annotated_registration_call() {
        let src = "app.controller(\"main\", [\"$scope\", function($scope) {}]);";
        assert_eq!(annotate(src), src);
    }

    #[test]
    fn test_skips_parameterless_registration_call() {
        let src = "app.run(function() { boot(); });";
        assert_eq!(annotate(src), src);
    }

    #[test]
    fn test_skips_unbalanced_body() {
        let src = "app.run(function($q) { if (true) {";
        assert_eq!(annotate(src), src);
    }

    #[test]
    fn test_annotates_injectable_function() {
        let out = annotate("function MainCtrl($scope, $http) { $scope.x = 1; }");
        assert!(out.contains("MainCtrl.$inject = [\"$scope\", \"$http\"];"));
    }

    #[test]
    fn test_skips_plain_parameters() {
        let src = "function add(a, b) { return a + b; }";
        assert_eq!(annotate(src), src);
    }

    #[test]
    fn test_skips_already_annotated() {
        let src = "function Ctrl($scope) {}\nCtrl.$inject = [\"$scope\"];";
        assert_eq!(annotate(src), src);
    }

    #[test]
    fn test_parameter_names_survive_minification() {
        let src = "app.controller(\"main\", MainCtrl);\n\
                   function MainCtrl($scope, $http) { $scope.go = function() { $http.get(\"/x\"); }; }";
        let minified = super::super::js::minify(&annotate(src)).unwrap();
        assert!(minified.contains("$scope"));
        assert!(minified.contains("$http"));
        assert!(minified.contains("$inject"));
    }

    #[test]
    fn test_registration_call_names_survive_minification() {
        let src = "app.controller(\"main\", function($scope, $http) {\n\
                   $scope.go = function() { $http.get(\"/x\"); };\n\
                   });";
        // Mangled identifiers are short generated names, so the only way
        // these names appear in the output is as the annotation strings.
        let minified = super::super::js::minify(&annotate(src)).unwrap();
        assert!(minified.contains("$scope"));
        assert!(minified.contains("$http"));
    }
}
