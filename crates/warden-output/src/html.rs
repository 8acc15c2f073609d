//! Whitelist HTML sanitization.
//!
//! Two phases, in an order that matters:
//!
//! 1. **Strip** — script blocks (with their content) to a fixpoint, HTML
//!    comments, `on*` event-handler attributes, and `style` attributes
//!    carrying `expression(`, `javascript:`, or `url(`. Running the strip
//!    first means an obfuscated tag name cannot smuggle a script past the
//!    whitelist by having one of its layers removed later.
//! 2. **Whitelist** — every remaining tag is either re-emitted in
//!    canonical lowercase form with only its whitelisted attributes, or
//!    deleted (content kept).
//!
//! Because phase 2 emits canonical output containing nothing phase 1
//! removes, the function is idempotent: `sanitize_html(sanitize_html(x))
//! == sanitize_html(x)`.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::url::sanitize_url;

/// Tags allowed to survive sanitization.
const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "strong", "b", "em", "i", "u", "a", "img", "li", "ul", "ol", "h1", "h2", "h3",
];

/// Per-tag attribute whitelist. Tags not listed keep no attributes.
const ALLOWED_ATTRS: &[(&str, &[&str])] = &[("a", &["href", "title"]), ("img", &["src", "alt", "title"])];

/// Tags emitted without a closing form.
const VOID_TAGS: &[&str] = &["br", "img"];

/// Attributes whose values are URLs and must pass [`sanitize_url`].
const URL_ATTRS: &[&str] = &["href", "src"];

static SCRIPT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*script\b[^>]*>.*?<\s*/\s*script\s*>").expect("script block regex")
});

static SCRIPT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*/?\s*script\b[^>]*>").expect("script tag regex"));

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex"));

static EVENT_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\son\w+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("event attr regex")
});

static STYLE_EXPR_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\sstyle\s*=\s*("[^"]*(?:expression|javascript:|url\s*\()[^"]*"|'[^']*(?:expression|javascript:|url\s*\()[^']*')"#,
    )
    .expect("style attr regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)([^>]*)>").expect("tag regex"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-zA-Z][a-zA-Z0-9-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("attr regex")
});

/// Clean rich text for browser rendering.
///
/// Returns only whitelisted markup. Unknown tags are deleted, their text
/// content kept. Script content is deleted entirely. Never fails.
pub fn sanitize_html(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let stripped = strip_dangerous(input);
    apply_whitelist(&stripped)
}

/// Phase 1: remove executable constructs before any whitelist decision.
fn strip_dangerous(input: &str) -> String {
    let mut text = input.to_string();

    // Script removal runs to a fixpoint: removing one layer of an
    // obfuscated tag can expose another.
    loop {
        let mut pass = SCRIPT_BLOCK_RE.replace_all(&text, "").into_owned();
        pass = SCRIPT_TAG_RE.replace_all(&pass, "").into_owned();
        pass = COMMENT_RE.replace_all(&pass, "").into_owned();
        if pass == text {
            break;
        }
        debug!("stripped a script/comment layer");
        text = pass;
    }

    let text = EVENT_ATTR_RE.replace_all(&text, "").into_owned();
    STYLE_EXPR_ATTR_RE.replace_all(&text, "").into_owned()
}

/// Phase 2: re-emit whitelisted tags canonically, delete the rest.
fn apply_whitelist(input: &str) -> String {
    TAG_RE
        .replace_all(input, |caps: &regex::Captures| {
            let closing = !caps[1].is_empty();
            let name = caps[2].to_lowercase();

            if !ALLOWED_TAGS.contains(&name.as_str()) {
                return String::new();
            }

            if closing {
                if VOID_TAGS.contains(&name.as_str()) {
                    return String::new();
                }
                return format!("</{name}>");
            }

            let mut tag = format!("<{name}");
            for attr in filtered_attrs(&name, &caps[3]) {
                tag.push_str(&attr);
            }
            tag.push('>');
            tag
        })
        .into_owned()
}

/// Attributes that survive for one opening tag, pre-rendered as
/// ` name="value"` fragments.
fn filtered_attrs(tag: &str, raw_attrs: &str) -> Vec<String> {
    let allowed = match ALLOWED_ATTRS.iter().find(|(t, _)| *t == tag) {
        Some((_, attrs)) => *attrs,
        None => return Vec::new(),
    };

    let mut kept = Vec::new();
    for caps in ATTR_RE.captures_iter(raw_attrs) {
        let name = caps[1].to_lowercase();
        if !allowed.contains(&name.as_str()) || name.starts_with("on") {
            continue;
        }

        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or("");

        let value = if URL_ATTRS.contains(&name.as_str()) {
            let cleaned = sanitize_url(value);
            if cleaned.is_empty() {
                continue;
            }
            cleaned
        } else {
            value.to_string()
        };

        kept.push(format!(" {name}=\"{}\"", escape_attr(&value)));
    }
    kept
}

/// Escape an attribute value for double-quoted emission. Ampersands are
/// left alone so already-escaped values do not get re-escaped — that would
/// break idempotency.
fn escape_attr(value: &str) -> String {
    value
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
