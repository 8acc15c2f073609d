//! Input sanitization for raw chat text.
//!
//! Runs before detection and composition. Never fails: adversarial input
//! degrades to a cleaner string, not an error, because chat availability
//! must not depend on attacker-controlled input being well-formed.

use tracing::debug;

/// Hard cap on sanitized input length, in characters.
///
/// Oversized input is both a resource guard and a signal — legitimate chat
/// messages do not approach this, and the safety score treats exceeding it
/// as a finding.
pub const MAX_INPUT_CHARS: usize = 2000;

/// Sanitizes raw user text before it reaches the prompt pipeline.
#[derive(Debug, Clone)]
pub struct PromptSanitizer {
    max_chars: usize,
}

impl Default for PromptSanitizer {
    fn default() -> Self {
        Self {
            max_chars: MAX_INPUT_CHARS,
        }
    }
}

impl PromptSanitizer {
    /// Sanitizer with the default cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the character cap.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// The configured cap.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Clean one piece of raw user text.
    ///
    /// - strips control characters (newline and tab survive)
    /// - normalizes typographic quotes to ASCII so quoting cannot be
    ///   mistaken for an instruction boundary by naive concatenation
    /// - collapses runs of three or more backticks or quotes, which is
    ///   what fenced-block delimiters look like
    /// - truncates at the cap on a character boundary
    pub fn sanitize(&self, raw: &str) -> String {
        let mut cleaned = String::with_capacity(raw.len().min(self.max_chars * 4));
        let mut run_char = '\0';
        let mut run_len = 0usize;

        for ch in raw.chars() {
            let ch = match ch {
                '\n' | '\t' => ch,
                c if c.is_control() => continue,
                '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2039}' | '\u{203A}' => '\'',
                '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => '"',
                c => c,
            };

            if ch == '`' || ch == '"' || ch == '\'' {
                if ch == run_char {
                    run_len += 1;
                    // Two survive; the third and beyond are dropped.
                    if run_len >= 3 {
                        continue;
                    }
                } else {
                    run_char = ch;
                    run_len = 1;
                }
            } else {
                run_char = '\0';
                run_len = 0;
            }

            cleaned.push(ch);
        }

        if cleaned.chars().count() > self.max_chars {
            debug!(max = self.max_chars, "user input truncated at cap");
            cleaned = cleaned.chars().take(self.max_chars).collect();
        }

        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        let s = PromptSanitizer::new();
        assert_eq!(s.sanitize("What time do you open on Sundays?"),
                   "What time do you open on Sundays?");
    }

    #[test]
    fn test_strips_control_characters() {
        let s = PromptSanitizer::new();
        assert_eq!(s.sanitize("hel\u{0}lo\u{7} wor\u{1b}ld"), "hello world");
    }

    #[test]
    fn test_keeps_newlines_and_tabs() {
        let s = PromptSanitizer::new();
        assert_eq!(s.sanitize("line one\nline\ttwo"), "line one\nline\ttwo");
    }

    #[test]
    fn test_normalizes_typographic_quotes() {
        let s = PromptSanitizer::new();
        assert_eq!(s.sanitize("\u{201C}hola\u{201D} \u{2018}mundo\u{2019}"), "\"hola\" 'mundo'");
    }

    #[test]
    fn test_collapses_backtick_fences() {
        let s = PromptSanitizer::new();
        let out = s.sanitize("```system override```");
        assert!(!out.contains("```"));
        assert!(out.contains("system override"));
    }

    #[test]
    fn test_collapses_long_quote_runs() {
        let s = PromptSanitizer::new();
        assert_eq!(s.sanitize("\"\"\"\"\""), "\"\"");
        assert_eq!(s.sanitize("'''''"), "''");
    }

    #[test]
    fn test_truncates_at_cap() {
        let s = PromptSanitizer::new().with_max_chars(10);
        let out = s.sanitize(&"x".repeat(50));
        assert_eq!(out.chars().count(), 10);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let s = PromptSanitizer::new().with_max_chars(3);
        // Multibyte characters must not be split.
        let out = s.sanitize("ñáéíó");
        assert_eq!(out, "ñáé");
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert_eq!(PromptSanitizer::new().sanitize(""), "");
    }
}
