//! URL scheme filtering.

/// Schemes/prefixes a link target may start with.
const ALLOWED_PREFIXES: &[&str] = &["http://", "https://", "mailto:"];

/// Schemes that never pass, regardless of how they are cased or padded.
const DENIED_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:", "file:", "about:"];

/// Validate a link target.
///
/// Returns the input unchanged when it is acceptable, otherwise the empty
/// string — the result is always in `{"", input}`. Acceptable means:
///
/// - no control characters anywhere
/// - the whitespace-stripped, lowercased form does not start with a denied
///   scheme (catches `JaVaScRiPt:` and `java\tscript:` smuggling)
/// - it starts with `http://`, `https://`, or `mailto:` (case-insensitive),
///   or is site-relative (`/`) or fragment-only (`#`)
///
/// Everything else — including unknown schemes — is rejected. Deny by
/// default; the allow list is the whole policy.
pub fn sanitize_url(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    if input.chars().any(|c| c.is_control()) {
        return String::new();
    }

    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if DENIED_SCHEMES.iter().any(|s| compact.starts_with(s)) {
        return String::new();
    }

    let trimmed = input.trim_start();
    let lower = trimmed.to_lowercase();
    let allowed = ALLOWED_PREFIXES.iter().any(|p| lower.starts_with(p))
        || trimmed.starts_with('/')
        || trimmed.starts_with('#');

    if allowed {
        input.to_string()
    } else {
        String::new()
    }
}
