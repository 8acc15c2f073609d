//! Keyword extraction for context-overlap checks.

use std::collections::HashSet;

/// English stopwords excluded from overlap counting.
const STOPWORDS_EN: &[&str] = &[
    "about", "after", "also", "because", "been", "before", "being", "between",
    "both", "cannot", "could", "does", "doing", "down", "during", "each",
    "from", "have", "having", "here", "into", "just", "more", "most", "much",
    "only", "other", "over", "same", "should", "some", "such", "than", "that",
    "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "under", "until", "very", "what", "when", "where", "which",
    "while", "will", "with", "would", "your",
];

/// Spanish stopwords excluded from overlap counting.
const STOPWORDS_ES: &[&str] = &[
    "algo", "ante", "antes", "aquel", "aquella", "como", "cual", "cuando",
    "desde", "donde", "durante", "ella", "ellas", "ellos", "entre", "esta",
    "estas", "este", "estos", "hace", "hacia", "hasta", "mismo", "mucho",
    "nada", "nosotros", "otra", "otro", "para", "pero", "poco", "porque",
    "puede", "pues", "sobre", "solo", "sólo", "también", "tambien", "tanto",
    "tiene", "toda", "todas", "todo", "todos", "unas", "unos", "usted",
];

/// Extract non-trivial keywords: lowercased alphanumeric runs longer than
/// `min_len` characters that are not stopwords in either language.
pub(crate) fn keywords(text: &str, min_len: usize) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > min_len)
        .filter(|w| !STOPWORDS_EN.contains(w) && !STOPWORDS_ES.contains(w))
        .map(str::to_string)
        .collect()
}

/// Number of keywords the two sets share.
pub(crate) fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> usize {
    a.intersection(b).count()
}
