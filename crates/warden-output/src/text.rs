//! Plain-text sanitization.

use regex::Regex;
use std::sync::LazyLock;

use crate::entities::decode_entities;

static SCRIPT_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*script\b[^>]*>.*?<\s*/\s*script\s*>").expect("script block regex")
});

static STYLE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*style\b[^>]*>.*?<\s*/\s*style\s*>").expect("style block regex")
});

static ANY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex"));

/// Reduce input to clean plain text.
///
/// Script and style blocks are deleted with their content, all remaining
/// tags are stripped to a fixpoint, entities are decoded exactly once, and
/// whitespace is collapsed to single spaces.
///
/// The decode happens after tag stripping and the result is never
/// rescanned: a double-encoded payload like `&amp;lt;script&amp;gt;` comes
/// out as the harmless text `&lt;script&gt;`, not a live tag. Decoding a
/// second time would undo that — callers must not re-run this function on
/// its own output expecting a no-op.
pub fn sanitize_text(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut text = SCRIPT_BLOCK_RE.replace_all(input, "").into_owned();
    text = STYLE_BLOCK_RE.replace_all(&text, "").into_owned();

    // Tag stripping to a fixpoint, so split tags cannot reassemble.
    loop {
        let pass = ANY_TAG_RE.replace_all(&text, "").into_owned();
        if pass == text {
            break;
        }
        text = pass;
    }

    let decoded = decode_entities(&text);

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
