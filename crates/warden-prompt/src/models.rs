//! Core types for prompt defense.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attack-intent families the detector catalogue covers.
///
/// Each family maps to a distinct adversarial goal. The catalogue in
/// [`crate::InjectionDetector`] tags every pattern with its family so new
/// signatures are added by appending a row, not by editing control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackFamily {
    /// "Ignore/forget/disregard previous instructions" phrasing.
    InstructionOverride,

    /// Attempts to make the model reveal its system prompt.
    PromptExtraction,

    /// Role override: "you are now...", "pretend you are...".
    RoleHijack,

    /// Code or shell-command execution phrasing.
    CodeExecution,

    /// Probing the model's memory, configuration, or environment.
    Introspection,

    /// HTML/script/SQL fragments smuggled into chat text.
    MarkupInjection,

    /// Known jailbreak aliases (DAN, developer mode, ...).
    JailbreakAlias,
}

/// Verdict from scanning one piece of user text.
///
/// Computed per request and never persisted. A single catalogue match sets
/// `suspicious`; the score aggregates match weights for callers that want
/// graded policy instead of a boolean.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InjectionVerdict {
    /// True once any pattern matched.
    pub suspicious: bool,

    /// Names of the matched patterns, in catalogue order.
    pub matched: Vec<String>,

    /// Aggregate risk, 0-100.
    pub risk_score: u8,
}

impl InjectionVerdict {
    /// A verdict with no findings.
    pub fn clean() -> Self {
        Self::default()
    }
}

/// Advisory safety report from [`crate::SecurePromptComposer::validate_safety`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyReport {
    /// Additive risk score, 0-100.
    pub score: u8,

    /// False once the score reaches the validity threshold.
    pub valid: bool,

    /// Human-readable findings contributing to the score.
    pub findings: Vec<String>,
}

/// Errors from prompt composition.
///
/// Sanitization and detection never fail; composition fails only on the
/// one misconfiguration that must not be papered over.
#[derive(Debug, Error)]
pub enum PromptError {
    /// The system instructions were empty. Composing a prompt without them
    /// would hand the model entirely to the user region.
    #[error("system instructions must not be empty")]
    EmptySystemPrompt,
}
