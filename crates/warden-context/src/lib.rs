//! # Warden Context - Hallucination Risk Scoring
//!
//! Audits a language-model answer against the knowledge snippets that were
//! retrieved to produce it, and reports how likely the answer is to be
//! asserting things the context does not support.
//!
//! ## How It Works
//!
//! The validator runs independent, composable checks:
//!
//! 1. **Context usage** — does the answer share enough non-trivial
//!    keywords with any snippet to plausibly be grounded in it?
//! 2. **Pattern catalogue** — five tagged detectors:
//!
//! | Pattern | Fires when | Severity |
//! |---------|-----------|----------|
//! | contradiction | "does not exist" phrasing despite plentiful context | high |
//! | unsourced-specifics | many dates/figures with almost no context | medium |
//! | overconfidence | stacked absolutist phrases | medium |
//! | off-context-genericity | generic hedge opening, ignores the question, context available | medium |
//! | false-reference | citation language with zero snippets | high |
//!
//! 3. **Aggregation** — pattern counts and severities roll up to a
//!    low/medium/high risk level and a clamped confidence score.
//! 4. **Diagnosis** — a deterministic multi-line summary for telemetry.
//!
//! The assessment is an advisory signal for logging and review queues,
//! never a hard gate: [`ContextValidator::assess`] cannot fail, and a
//! malformed or empty response yields low risk with zero confidence and an
//! explanatory diagnosis.
//!
//! ## Calibration
//!
//! Every threshold in [`ValidatorConfig`] is a heuristic constant carried
//! over from operational experience, not a calibrated value. They are
//! exposed as configuration precisely so they can be tuned against labeled
//! production data. Treat the defaults as a starting point.
//!
//! The platform serves Spanish- and English-speaking tenants; the phrase
//! tables and stopword lists cover both languages.

mod keywords;
mod models;
mod patterns;
mod validator;

pub use models::{
    ContextSnippet, DetectedPattern, HallucinationAssessment, RiskLevel, Severity,
};
pub use validator::{ContextValidator, ValidatorConfig};
