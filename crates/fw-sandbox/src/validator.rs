//! Pre-execution checks on widget source
//!
//! These are textual heuristics. They catch the obvious capability escapes
//! before an isolate is spun up; the isolate itself is what actually denies
//! access.

use crate::config::SandboxConfig;
use crate::error::SandboxError;
use once_cell::sync::Lazy;
use regex::Regex;

static DENYLIST: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("document.", r"\bdocument\s*[.\[]"),
        ("window.", r"\bwindow\s*[.\[]"),
        ("globalThis", r"\bglobalThis\b"),
        ("self.", r"\bself\s*[.\[]"),
        ("eval(", r"\beval\s*\("),
        ("new Function", r"\bnew\s+Function\b"),
        ("Function(", r"\bFunction\s*\("),
        ("localStorage", r"\blocalStorage\b"),
        ("sessionStorage", r"\bsessionStorage\b"),
        ("indexedDB", r"\bindexedDB\b"),
        ("document.cookie", r"\bcookie\s*="),
        ("fetch(", r"\bfetch\s*\("),
        ("XMLHttpRequest", r"\bXMLHttpRequest\b"),
        ("WebSocket", r"\bWebSocket\b"),
        ("EventSource", r"\bEventSource\b"),
        ("history.", r"\bhistory\s*[.\[]"),
        ("location.", r"\blocation\s*[.\[]"),
        ("import(", r"\bimport\s*\("),
        ("import statement", r"(?m)^\s*import\s"),
        ("Deno", r"\bDeno\b"),
        ("process.", r"\bprocess\s*[.\[]"),
        ("__proto__", r"__proto__"),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, Regex::new(pattern).expect("deny-list pattern is valid")))
    .collect()
});

static REQUIRE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\brequire\s*\(").expect("require pattern is valid"));

static REQUIRE_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\s*\(\s*(?:'([^'\n]*)'|"([^"\n]*)")\s*\)"#)
        .expect("require literal pattern is valid")
});

static MARKUP: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)<script\b[^>]*>.*?</script\s*>",
        r"(?is)<style\b[^>]*>.*?</style\s*>",
        r"(?is)<iframe\b[^>]*>.*?</iframe\s*>",
        r"(?is)<iframe\b[^>]*/?>",
        r"(?s)<!--.*?-->",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("markup pattern is valid"))
    .collect()
});

/// Strip embedded markup blocks (`<script>`, `<style>`, `<iframe>`, comments)
#[must_use]
pub fn sanitize(source: &str) -> String {
    MARKUP
        .iter()
        .fold(source.to_string(), |acc, re| re.replace_all(&acc, "").into_owned())
}

/// Reject sources matching a deny-listed pattern
///
/// # Errors
/// [`SandboxError::DeniedPattern`] naming the first pattern hit and its line.
pub fn check_denylist(source: &str) -> Result<(), SandboxError> {
    let first_hit = DENYLIST
        .iter()
        .filter_map(|(label, re)| re.find(source).map(|hit| (hit.start(), *label)))
        .min_by_key(|(offset, _)| *offset);

    match first_hit {
        Some((offset, pattern)) => Err(SandboxError::DeniedPattern {
            pattern,
            line: line_of(source, offset),
        }),
        None => Ok(()),
    }
}

/// Module names passed to `require` as string literals, in order of appearance
#[must_use]
pub fn required_modules(source: &str) -> Vec<String> {
    REQUIRE_LITERAL
        .captures_iter(source)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Reject computed `require` calls and modules outside the allow-list
///
/// # Errors
/// - [`SandboxError::DynamicRequire`] when a call does not use a string literal
/// - [`SandboxError::DisallowedImport`] for the first module not allowed
pub fn check_imports(source: &str, config: &SandboxConfig) -> Result<(), SandboxError> {
    let calls = REQUIRE_CALL.find_iter(source).count();
    let modules = required_modules(source);
    if calls != modules.len() {
        return Err(SandboxError::DynamicRequire);
    }

    match modules.into_iter().find(|m| !config.allows(m)) {
        Some(module) => Err(SandboxError::DisallowedImport(module)),
        None => Ok(()),
    }
}

/// Run every check and return the sanitized source
///
/// # Errors
/// The first failing check's [`SandboxError`].
pub fn validate(source: &str, config: &SandboxConfig) -> Result<String, SandboxError> {
    let sanitized = sanitize(source);
    if sanitized.len() > config.max_source_bytes {
        return Err(SandboxError::SourceTooLarge {
            size: sanitized.len(),
            max: config.max_source_bytes,
        });
    }
    check_denylist(&sanitized)?;
    check_imports(&sanitized, config)?;
    Ok(sanitized)
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn denied(source: &str) -> Option<&'static str> {
        match check_denylist(source) {
            Err(SandboxError::DeniedPattern { pattern, .. }) => Some(pattern),
            _ => None,
        }
    }

    #[test]
    fn sanitize_strips_markup() {
        let src = "const a = 1;<script>alert(1)</script>\n<!-- hidden -->const b = a < 2;";
        assert_eq!(sanitize(src), "const a = 1;\nconst b = a < 2;");
    }

    #[test]
    fn denylist_catches_required_patterns() {
        assert_eq!(denied("document.cookie = 'x'"), Some("document."));
        assert_eq!(denied("window.alert(1)"), Some("window."));
        assert_eq!(denied("eval('1')"), Some("eval("));
        assert_eq!(denied("const f = new Function('return 1')"), Some("new Function"));
        assert_eq!(denied("localStorage.getItem('k')"), Some("localStorage"));
        assert_eq!(denied("fetch('/api')"), Some("fetch("));
        assert_eq!(denied("import('x')"), Some("import("));
        assert_eq!(denied("location.href = '/'"), Some("location."));
    }

    #[test]
    fn denylist_matches_tokens_behind_property_access() {
        assert_eq!(denied("const d = props.document.cookie;"), Some("document."));
        assert_eq!(denied("const w = ctx.window.location;"), Some("window."));
        assert_eq!(denied("const e = obj.eval('1');"), Some("eval("));
        assert_eq!(denied("const r = api.fetch(1);"), Some("fetch("));
    }

    #[test]
    fn denylist_respects_word_boundaries() {
        assert_eq!(denied("const retrieval = (x) => x;\nretrieval(1);"), None);
        assert_eq!(denied("const documentTitle = 'x';"), None);
    }

    #[test]
    fn denylist_reports_line() {
        let err = check_denylist("const a = 1;\nconst b = 2;\nwindow.x = 1;").unwrap_err();
        assert!(matches!(err, SandboxError::DeniedPattern { line: 3, .. }));
    }

    #[test]
    fn imports_respect_allow_list() {
        let config = SandboxConfig::default();
        assert!(check_imports("const R = require('react');", &config).is_ok());
        assert!(matches!(
            check_imports("const fs = require(\"fs\");", &config),
            Err(SandboxError::DisallowedImport(m)) if m == "fs"
        ));
    }

    #[test]
    fn computed_require_rejected() {
        let config = SandboxConfig::default();
        assert!(matches!(
            check_imports("const m = 're' + 'act'; require(m);", &config),
            Err(SandboxError::DynamicRequire)
        ));
    }

    #[test]
    fn required_modules_in_order() {
        let src = "require('react'); require(\"@mui/material\");";
        assert_eq!(required_modules(src), vec!["react", "@mui/material"]);
    }

    #[test]
    fn validate_enforces_size_limit() {
        let config = SandboxConfig::default().with_max_source_bytes(8);
        assert!(matches!(
            validate("module.exports = 1;", &config),
            Err(SandboxError::SourceTooLarge { max: 8, .. })
        ));
    }

    proptest! {
        #[test]
        fn denylisted_token_always_rejected(
            prefix in "[a-z ;\n]{0,20}",
            suffix in "[a-z ;\n]{0,20}",
            token in prop::sample::select(vec![
                "document.", "window.", "eval(", "new Function", "localStorage",
            ]),
        ) {
            let source = format!("{prefix};{token}{suffix}");
            prop_assert!(check_denylist(&source).is_err());
        }
    }
}
