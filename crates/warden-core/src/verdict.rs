//! Verdict types for pipeline decisions.

use serde::{Deserialize, Serialize};

use warden_context::RiskLevel;

/// Decision for one guarded request.
///
/// - `Allow`: proceed with the LLM call
/// - `Block`: reject the request with a reason
/// - `Review`: proceed but flag for human or offline review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    /// Request passed every check.
    Allow,

    /// Request failed a hard check. Do not send to the model.
    Block {
        /// Why the request was blocked.
        reason: BlockReason,
    },

    /// Request may proceed but warrants review.
    Review {
        /// Why review is warranted.
        flags: Vec<ReviewFlag>,
    },
}

impl Verdict {
    /// Create an Allow verdict.
    pub fn allow() -> Self {
        Self::Allow
    }

    /// Create a Block verdict with the given reason.
    pub fn block(reason: BlockReason) -> Self {
        Self::Block { reason }
    }

    /// Create a Review verdict with the given flags.
    pub fn review(flags: Vec<ReviewFlag>) -> Self {
        Self::Review { flags }
    }

    /// Returns true if this is an Allow verdict.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns true if this is a Block verdict.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Block { .. })
    }

    /// Returns true if this requires review.
    pub fn requires_review(&self) -> bool {
        matches!(self, Self::Review { .. })
    }
}

/// Reasons for blocking a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockReason {
    /// The injection detector matched the user text.
    InjectionDetected {
        /// Names of the matched patterns.
        patterns: Vec<String>,
        /// Aggregate risk score, 0-100.
        risk_score: u8,
    },
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InjectionDetected {
                patterns,
                risk_score,
            } => {
                write!(
                    f,
                    "injection detected (score {risk_score}): {}",
                    patterns.join(", ")
                )
            }
        }
    }
}

/// Flags indicating why review is warranted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReviewFlag {
    /// The composition safety score crossed its threshold.
    ElevatedPromptRisk {
        /// The safety score, 0-100.
        score: u8,
    },

    /// The response assessment reported medium or high risk.
    HallucinationRisk {
        /// The assessed risk level.
        level: RiskLevel,
    },
}

impl std::fmt::Display for ReviewFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElevatedPromptRisk { score } => {
                write!(f, "elevated prompt risk: score {score}")
            }
            Self::HallucinationRisk { level } => {
                write!(f, "hallucination risk: {level}")
            }
        }
    }
}
