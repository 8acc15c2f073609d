//! Single-pass HTML entity decoding.

use regex::Regex;
use std::sync::LazyLock;

/// Matches one named or numeric character reference.
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});")
        .expect("entity regex")
});

/// Decode HTML entities exactly once.
///
/// One non-overlapping left-to-right pass; replacement text is never
/// rescanned. `&amp;lt;` therefore becomes the literal text `&lt;`, not
/// `<` — double-encoded payloads stay inert.
///
/// Unknown named entities are left untouched. Numeric references to
/// control characters (other than newline and tab) are dropped.
pub(crate) fn decode_entities(input: &str) -> String {
    ENTITY_RE
        .replace_all(input, |caps: &regex::Captures| {
            let body = &caps[1];
            match body {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                "nbsp" => " ".to_string(),
                _ if body.starts_with('#') => decode_numeric(body),
                // Unknown named entity: keep the original text.
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn decode_numeric(body: &str) -> String {
    let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        body[1..].parse::<u32>().ok()
    };

    match code.and_then(char::from_u32) {
        Some(c) if c == '\n' || c == '\t' => c.to_string(),
        Some(c) if c.is_control() => String::new(),
        Some(c) => c.to_string(),
        None => String::new(),
    }
}
