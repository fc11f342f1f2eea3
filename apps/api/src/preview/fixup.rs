// Fix-up pass for generated HTML on its way to the preview iframe. Stored
// Versions keep whatever the sanitizer produced; these rules only repair the
// outgoing copy so it renders in a plain browser sandbox.
//
// Like the sanitizer, every rule is named and idempotent, and so is the
// composition: a previewed document run through again comes out unchanged.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const TAILWIND_CDN_URL: &str = "https://cdn.tailwindcss.com";

/// Version-pinned Tailwind browser bundle URLs the generator is told to emit.
/// The pinned bundle 404s for some versions, so previews use the evergreen CDN.
static PINNED_TAILWIND_BUNDLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https://cdn\.jsdelivr\.net/npm/@tailwindcss/browser@\d+/?").unwrap());

/// A `<link>` pointing at the Tailwind CDN; the CDN serves a script, not a
/// stylesheet.
static TAILWIND_LINK_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<link[^>]*href=["']https://cdn\.tailwindcss\.com["'][^>]*>"#).unwrap()
});

/// `@tailwind base;`-style build directives, meaningless without a build step.
static TAILWIND_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@tailwind\s+[^;]+;").unwrap());

/// The jQuery-only `:contains(...)` pseudo-class, invalid in real CSS.
static CONTAINS_PSEUDO_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":contains\([^)]+\)").unwrap());

static HTML_OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<html[\s>]").unwrap());
static HEAD_OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<head[\s>]").unwrap());

/// A `<script type="module">` element. Capture 1/2 are the surrounding
/// attribute text, capture 3 the body.
static MODULE_SCRIPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script([^>]*)\btype=["']module["']([^>]*)>(.*?)</script>"#).unwrap()
});

/// A static `import ... from '...'` statement inside a downgraded module.
static IMPORT_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"import\s+.*?\s+from\s+['"][^'"]+['"];?\s*"#).unwrap());

/// Applies all fix-up rules in order. Empty input stays empty.
pub fn fix_generated_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let output = canonicalize_tailwind_cdn(html);
    let output = tailwind_link_to_script(&output);
    let output = strip_tailwind_directives(&output);
    let output = drop_contains_pseudo_class(&output);
    let output = ensure_document_shell(&output);
    let output = inject_tailwind_loader(&output);
    downgrade_module_scripts(&output)
}

/// Rule 1: rewrite pinned Tailwind bundle URLs to the evergreen CDN.
fn canonicalize_tailwind_cdn(input: &str) -> String {
    PINNED_TAILWIND_BUNDLE
        .replace_all(input, TAILWIND_CDN_URL)
        .into_owned()
}

/// Rule 2: convert a Tailwind CDN `<link>` into the `<script>` loader.
fn tailwind_link_to_script(input: &str) -> String {
    TAILWIND_LINK_TAG
        .replace_all(
            input,
            r#"<script src="https://cdn.tailwindcss.com"></script>"#,
        )
        .into_owned()
}

/// Rule 3: strip `@tailwind` build directives.
fn strip_tailwind_directives(input: &str) -> String {
    TAILWIND_DIRECTIVE.replace_all(input, "").into_owned()
}

/// Rule 4: drop the nonstandard `:contains(...)` pseudo-class.
fn drop_contains_pseudo_class(input: &str) -> String {
    CONTAINS_PSEUDO_CLASS.replace_all(input, "").into_owned()
}

/// Rule 5: make sure the document has `<html>` and `<head>` elements.
/// Detection is case-insensitive and tolerates attributes on the tags.
fn ensure_document_shell(input: &str) -> String {
    if !HTML_OPEN_TAG.is_match(input) {
        return format!("<html><head></head><body>{input}</body></html>");
    }
    if HEAD_OPEN_TAG.is_match(input) {
        return input.to_string();
    }
    insert_after_open_tag(input, &HTML_OPEN_TAG, "<head></head>")
}

/// Rule 6: inject the Tailwind CDN loader when the document loads no
/// Tailwind at all.
fn inject_tailwind_loader(input: &str) -> String {
    if input.contains("cdn.tailwindcss.com") || input.contains("@tailwindcss") {
        return input.to_string();
    }
    let loader = format!(r#"<script src="{TAILWIND_CDN_URL}"></script>"#);
    if HEAD_OPEN_TAG.is_match(input) {
        insert_after_open_tag(input, &HEAD_OPEN_TAG, &loader)
    } else if HTML_OPEN_TAG.is_match(input) {
        insert_after_open_tag(input, &HTML_OPEN_TAG, &format!("<head>{loader}</head>"))
    } else {
        format!("{loader}{input}")
    }
}

/// Rule 7: downgrade `<script type="module">` blocks to classic scripts and
/// drop their static import statements, which cannot resolve inside a
/// `srcdoc` sandbox.
fn downgrade_module_scripts(input: &str) -> String {
    MODULE_SCRIPT
        .replace_all(input, |caps: &Captures| {
            let attrs = format!("{}{}", &caps[1], &caps[2]);
            let body = IMPORT_STATEMENT.replace_all(&caps[3], "");
            format!("<script{attrs}>{body}</script>")
        })
        .into_owned()
}

/// Inserts `insertion` immediately after the `>` of the first tag matched by
/// `open_tag`. Returns the input unchanged if the tag never closes.
fn insert_after_open_tag(input: &str, open_tag: &Regex, insertion: &str) -> String {
    if let Some(m) = open_tag.find(input) {
        if let Some(close) = input[m.start()..].find('>') {
            let idx = m.start() + close + 1;
            return format!("{}{}{}", &input[..idx], insertion, &input[idx..]);
        }
    }
    input.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_bundle_rewritten() {
        let input = r#"<script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>"#;
        let output = canonicalize_tailwind_cdn(input);
        assert_eq!(
            output,
            r#"<script src="https://cdn.tailwindcss.com"></script>"#
        );
    }

    #[test]
    fn test_pinned_bundle_with_trailing_slash() {
        let input = "https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4/";
        assert_eq!(canonicalize_tailwind_cdn(input), TAILWIND_CDN_URL);
    }

    #[test]
    fn test_link_tag_becomes_script() {
        let input = r#"<link rel="stylesheet" href="https://cdn.tailwindcss.com">"#;
        let output = tailwind_link_to_script(input);
        assert_eq!(
            output,
            r#"<script src="https://cdn.tailwindcss.com"></script>"#
        );
    }

    #[test]
    fn test_tailwind_directives_stripped() {
        let input = "<style>@tailwind base; @tailwind components; .card { color: red; }</style>";
        let output = strip_tailwind_directives(input);
        assert!(!output.contains("@tailwind"));
        assert!(output.contains(".card { color: red; }"));
    }

    #[test]
    fn test_contains_pseudo_class_dropped() {
        let input = "<style>button:contains(Buy) { color: red; }</style>";
        let output = drop_contains_pseudo_class(input);
        assert_eq!(output, "<style>button { color: red; }</style>");
    }

    #[test]
    fn test_fragment_wrapped_in_shell() {
        let output = ensure_document_shell("<h1>Hello</h1>");
        assert_eq!(output, "<html><head></head><body><h1>Hello</h1></body></html>");
    }

    #[test]
    fn test_html_with_attributes_gets_head() {
        let output = ensure_document_shell(r#"<html lang="en"><body>x</body></html>"#);
        assert_eq!(output, r#"<html lang="en"><head></head><body>x</body></html>"#);
    }

    #[test]
    fn test_complete_document_untouched_by_shell_rule() {
        let input = "<html><head><title>t</title></head><body>x</body></html>";
        assert_eq!(ensure_document_shell(input), input);
    }

    #[test]
    fn test_loader_injected_into_head() {
        let input = "<html><head><title>t</title></head><body>x</body></html>";
        let output = inject_tailwind_loader(input);
        assert!(output.starts_with(
            r#"<html><head><script src="https://cdn.tailwindcss.com"></script><title>t</title>"#
        ));
    }

    #[test]
    fn test_loader_not_duplicated() {
        let input =
            r#"<html><head><script src="https://cdn.tailwindcss.com"></script></head></html>"#;
        assert_eq!(inject_tailwind_loader(input), input);
    }

    #[test]
    fn test_loader_skipped_when_pinned_bundle_present() {
        // `@tailwindcss` in the jsdelivr path counts as Tailwind being loaded.
        let input = r#"<html><head><script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script></head></html>"#;
        assert_eq!(inject_tailwind_loader(input), input);
    }

    #[test]
    fn test_module_script_downgraded() {
        let input = "<script type=\"module\">import { x } from './lib.js';\nconsole.log(x);</script>";
        let output = downgrade_module_scripts(input);
        assert!(!output.contains("type=\"module\""));
        assert!(!output.contains("import"));
        assert!(output.contains("console.log(x);"));
    }

    #[test]
    fn test_module_script_keeps_other_attributes() {
        let input = r#"<script defer type="module">console.log(1)</script>"#;
        let output = downgrade_module_scripts(input);
        assert!(output.contains("defer"));
        assert!(output.contains("console.log(1)"));
        assert!(!output.contains("module"));
    }

    #[test]
    fn test_fix_generated_html_empty_input() {
        assert_eq!(fix_generated_html(""), "");
    }

    #[test]
    fn test_fix_generated_html_full_pass() {
        let input = r#"<html lang="en"><body><h1 class="text-xl">Shop</h1></body></html>"#;
        let output = fix_generated_html(input);
        assert!(output.contains("<head>"));
        assert!(output.contains(TAILWIND_CDN_URL));
        assert!(output.contains(r#"<h1 class="text-xl">Shop</h1>"#));
    }

    #[test]
    fn test_fix_generated_html_idempotent() {
        let inputs = [
            "<h1>Fragment only</h1>",
            r#"<html lang="en"><body>x</body></html>"#,
            r#"<html><head><link rel="stylesheet" href="https://cdn.tailwindcss.com"></head><body><script type="module">import a from 'b';alert(1)</script></body></html>"#,
            "<style>@tailwind base;</style><div:contains(x)></div>",
        ];
        for input in inputs {
            let once = fix_generated_html(input);
            let twice = fix_generated_html(&once);
            assert_eq!(once, twice, "fix-up not idempotent on: {input}");
        }
    }
}
