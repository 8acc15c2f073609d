//! Data model for context validation.

use serde::{Deserialize, Serialize};

/// One retrieved knowledge snippet, as returned by the vector-search
/// collaborator.
///
/// This is the single typed shape the validator accepts — the relevance
/// score arrives in the `score` field, never probed off arbitrary object
/// shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnippet {
    /// Snippet text.
    pub text: String,
    /// Relevance score from the vector search, nominally in [0, 1].
    pub score: f32,
}

impl ContextSnippet {
    /// Convenience constructor.
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Severity of a detected hallucination pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Informational only.
    Low,
    /// Worth flagging; one of these alone keeps risk low.
    Medium,
    /// Strong hallucination signal.
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Overall hallucination risk for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Answer looks grounded, or there is nothing to assess.
    Low,
    /// At least one strong signal or several weak ones.
    Medium,
    /// Multiple strong signals, or a strong signal with no context at all.
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// One catalogue hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedPattern {
    /// Stable pattern name, e.g. `false_reference`.
    pub name: String,
    /// Severity of this pattern.
    pub severity: Severity,
    /// What the pattern means.
    pub description: String,
    /// What triggered it, for telemetry.
    pub evidence: String,
}

/// The validator's full output for one response.
///
/// Computed per response and intended for logging; nothing here is
/// persisted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallucinationAssessment {
    /// Whether the response plausibly used the retrieved context.
    pub used_context: bool,
    /// Confidence that the answer is grounded, clamped to [0, 1].
    pub confidence: f32,
    /// Aggregated risk level.
    pub risk: RiskLevel,
    /// Detected patterns, ordered by descending severity.
    pub patterns: Vec<DetectedPattern>,
    /// Deterministic human-readable summary.
    pub diagnosis: String,
}

impl HallucinationAssessment {
    /// True when the risk level warrants review.
    pub fn needs_review(&self) -> bool {
        self.risk >= RiskLevel::Medium
    }
}
