// Cleanup pass for raw generative output, applied before a Version is
// persisted. Pure text-to-text: deterministic, never fails, and idempotent.
//
// Each rule is named and unit-tested on its own. The revision path applies
// the full transform; the creation path trims only. Both must converge:
// sanitize(trim(x)) == sanitize(x).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Markdown fence delimiters the backend may wrap output in, with an
/// optional language tag and trailing newline.
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)```[a-z]*\r?\n?").unwrap());

/// A `querySelector` call with a quoted argument (any of the three JS quote
/// styles). Capture 1 is the selector text.
static QUERY_SELECTOR_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"querySelector\(\s*['"`]([^'"`]*)['"`]\s*\)"#).unwrap());

/// A `postMessage` call whose argument text names a browser type that cannot
/// cross the structured-clone boundary, or passes a raw `element` binding.
static NON_SERIALIZABLE_POST_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"postMessage\([^)]*\b(?:SVGAnimatedString|SVGElement|element)\b[^)]*\)").unwrap()
});

/// An inline `<script>` element with an empty or whitespace-only body.
/// Capture 1 is the attribute text of the opening tag.
static EMPTY_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<script\b([^>]*)>\s*</script>").unwrap());

static SRC_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)\bsrc\s*="#).unwrap());

const POST_MESSAGE_REPLACEMENT: &str =
    "/* removed postMessage call with non-serializable argument */";

/// Full cleanup, applied to revision output before it becomes a Version.
///
/// The rules re-run until the text stops changing: removing a fence can
/// splice the surrounding text into a new match for a later rule.
pub fn sanitize_generated_code(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = apply_rules_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Lighter cleanup for the creation path. Stable under the full transform.
pub fn trim_generated_code(raw: &str) -> String {
    raw.trim().to_string()
}

fn apply_rules_once(input: &str) -> String {
    let output = strip_code_fences(input);
    let output = neutralize_invalid_selectors(&output);
    let output = strip_non_serializable_post_message(&output);
    let output = drop_empty_inline_scripts(&output);
    output.trim().to_string()
}

/// Rule 1: remove Markdown code-fence delimiters.
fn strip_code_fences(input: &str) -> String {
    CODE_FENCE.replace_all(input, "").into_owned()
}

/// Rule 2: rewrite `querySelector` calls whose argument is structurally
/// invalid (empty, bare `#`, bare `.`, or either followed by a space) to
/// `querySelector(null)`. Valid selectors pass through untouched.
fn neutralize_invalid_selectors(input: &str) -> String {
    QUERY_SELECTOR_CALL
        .replace_all(input, |caps: &Captures| {
            if is_invalid_selector(&caps[1]) {
                "querySelector(null)".to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn is_invalid_selector(selector: &str) -> bool {
    matches!(selector, "" | "#" | ".")
        || selector.starts_with("# ")
        || selector.starts_with(". ")
}

/// Rule 3: replace `postMessage` calls that would throw a DataCloneError in
/// the sandbox with a block comment.
fn strip_non_serializable_post_message(input: &str) -> String {
    NON_SERIALIZABLE_POST_MESSAGE
        .replace_all(input, POST_MESSAGE_REPLACEMENT)
        .into_owned()
}

/// Rule 4: drop inline `<script>` elements emptied by the preceding rules.
/// Loader tags with a `src` attribute are kept.
fn drop_empty_inline_scripts(input: &str) -> String {
    EMPTY_SCRIPT
        .replace_all(input, |caps: &Captures| {
            if SRC_ATTR.is_match(&caps[1]) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}
