//! The context validator: checks, aggregation, diagnosis.

use tracing::debug;

use crate::keywords::{keywords, overlap};
use crate::models::{
    ContextSnippet, DetectedPattern, HallucinationAssessment, RiskLevel, Severity,
};
use crate::patterns::{
    catalogue, count_specifics, PatternKind, ABSOLUTIST_PHRASES, CITATION_PHRASES,
    CONTRADICTION_PHRASES, GENERIC_OPENERS,
};

/// Tunable thresholds for the validator.
///
/// Every value here is an uncalibrated heuristic. They are configuration,
/// not constants, so deployments can tune them against labeled data.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Keywords must be longer than this many characters.
    pub min_keyword_len: usize,
    /// Shared keywords with one snippet for `used_context` to hold.
    pub min_keyword_overlap: usize,
    /// Snippet count at which denial phrasing becomes a contradiction.
    pub contradiction_min_snippets: usize,
    /// Figure count at which specifics need sourcing.
    pub specifics_min_count: usize,
    /// Snippet count below which specifics count as unsourced.
    pub specifics_max_snippets: usize,
    /// Absolutist hits needed for the overconfidence pattern.
    pub overconfidence_min_hits: usize,
    /// Query-keyword overlap below which a hedge answer is off-context.
    pub generic_max_query_overlap: usize,
    /// Confidence floor when no snippets were supplied.
    pub no_context_floor: f32,
    /// Confidence reported at high risk.
    pub high_risk_confidence: f32,
    /// Confidence reported at medium risk.
    pub medium_risk_confidence: f32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_keyword_len: 3,
            min_keyword_overlap: 3,
            contradiction_min_snippets: 4,
            specifics_min_count: 4,
            specifics_max_snippets: 2,
            overconfidence_min_hits: 2,
            generic_max_query_overlap: 2,
            no_context_floor: 0.3,
            high_risk_confidence: 0.2,
            medium_risk_confidence: 0.45,
        }
    }
}

impl ValidatorConfig {
    /// Start from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the keyword-overlap threshold.
    pub fn with_min_keyword_overlap(mut self, value: usize) -> Self {
        self.min_keyword_overlap = value;
        self
    }

    /// Override the contradiction snippet gate.
    pub fn with_contradiction_min_snippets(mut self, value: usize) -> Self {
        self.contradiction_min_snippets = value;
        self
    }

    /// Override the unsourced-specifics figure count.
    pub fn with_specifics_min_count(mut self, value: usize) -> Self {
        self.specifics_min_count = value;
        self
    }
}

/// Scores LLM responses against their retrieved context.
pub struct ContextValidator {
    config: ValidatorConfig,
}

impl ContextValidator {
    /// Validator with default thresholds.
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
        }
    }

    /// Validator with custom thresholds.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Assess one response. Never fails.
    ///
    /// An empty or whitespace-only response yields low risk with zero
    /// confidence and a diagnosis saying why — advisory output must not
    /// take the chat down over a malformed answer.
    pub fn assess(
        &self,
        response: &str,
        snippets: &[ContextSnippet],
        query: &str,
    ) -> HallucinationAssessment {
        let trimmed = response.trim();
        if trimmed.is_empty() {
            return HallucinationAssessment {
                used_context: false,
                confidence: 0.0,
                risk: RiskLevel::Low,
                patterns: Vec::new(),
                diagnosis: format!(
                    "{} context snippets\nempty response; nothing to assess",
                    snippets.len()
                ),
            };
        }

        let response_lower = trimmed.to_lowercase();
        let response_keywords = keywords(trimmed, self.config.min_keyword_len);

        let used_context = snippets.iter().any(|s| {
            overlap(
                &response_keywords,
                &keywords(&s.text, self.config.min_keyword_len),
            ) >= self.config.min_keyword_overlap
        });

        let query_overlap = overlap(
            &response_keywords,
            &keywords(query, self.config.min_keyword_len),
        );

        let mut patterns: Vec<DetectedPattern> = catalogue()
            .into_iter()
            .filter_map(|row| {
                self.evaluate(row.kind, &response_lower, snippets, query_overlap)
                    .map(|evidence| DetectedPattern {
                        name: row.name.to_string(),
                        severity: row.severity,
                        description: row.description.to_string(),
                        evidence,
                    })
            })
            .collect();
        patterns.sort_by(|a, b| b.severity.cmp(&a.severity));

        let (risk, confidence) = self.aggregate(&patterns, snippets);
        let diagnosis = self.diagnose(snippets.len(), used_context, &patterns, risk);

        if risk > RiskLevel::Low {
            debug!(%risk, pattern_count = patterns.len(), "hallucination risk detected");
        }

        HallucinationAssessment {
            used_context,
            confidence,
            risk,
            patterns,
            diagnosis,
        }
    }

    /// Run one catalogue row; `Some(evidence)` on a hit.
    fn evaluate(
        &self,
        kind: PatternKind,
        response_lower: &str,
        snippets: &[ContextSnippet],
        query_overlap: usize,
    ) -> Option<String> {
        match kind {
            PatternKind::Contradiction => {
                if snippets.len() < self.config.contradiction_min_snippets {
                    return None;
                }
                CONTRADICTION_PHRASES
                    .iter()
                    .find(|p| response_lower.contains(*p))
                    .map(|p| format!("\"{p}\" with {} snippets supplied", snippets.len()))
            }
            PatternKind::UnsourcedSpecifics => {
                if snippets.len() >= self.config.specifics_max_snippets {
                    return None;
                }
                let count = count_specifics(response_lower);
                (count >= self.config.specifics_min_count).then(|| {
                    format!(
                        "{count} concrete figures with only {} snippets",
                        snippets.len()
                    )
                })
            }
            PatternKind::Overconfidence => {
                let hits: Vec<&str> = ABSOLUTIST_PHRASES
                    .iter()
                    .filter(|p| response_lower.contains(*p))
                    .copied()
                    .collect();
                (hits.len() >= self.config.overconfidence_min_hits)
                    .then(|| format!("absolutist phrases: {}", hits.join(", ")))
            }
            PatternKind::OffContextGeneric => {
                if snippets.is_empty() || query_overlap >= self.config.generic_max_query_overlap {
                    return None;
                }
                GENERIC_OPENERS
                    .iter()
                    .find(|p| response_lower.starts_with(*p))
                    .map(|p| {
                        format!(
                            "opens with \"{p}\" and shares {query_overlap} keywords with the query"
                        )
                    })
            }
            PatternKind::FalseReference => {
                if !snippets.is_empty() {
                    return None;
                }
                CITATION_PHRASES
                    .iter()
                    .find(|p| response_lower.contains(*p))
                    .map(|p| format!("\"{p}\" with zero snippets retrieved"))
            }
        }
    }

    /// Roll detected patterns up into a risk level and confidence.
    fn aggregate(
        &self,
        patterns: &[DetectedPattern],
        snippets: &[ContextSnippet],
    ) -> (RiskLevel, f32) {
        let highs = patterns
            .iter()
            .filter(|p| p.severity == Severity::High)
            .count();
        let mediums = patterns
            .iter()
            .filter(|p| p.severity == Severity::Medium)
            .count();

        let grounded_confidence = if snippets.is_empty() {
            self.config.no_context_floor
        } else {
            let avg: f32 =
                snippets.iter().map(|s| s.score).sum::<f32>() / snippets.len() as f32;
            avg.clamp(0.0, 1.0)
        };

        let (risk, confidence) = if highs >= 2 || (highs >= 1 && snippets.is_empty()) {
            (RiskLevel::High, self.config.high_risk_confidence)
        } else if highs == 1 || mediums >= 2 {
            (RiskLevel::Medium, self.config.medium_risk_confidence)
        } else {
            (RiskLevel::Low, grounded_confidence)
        };

        (risk, confidence.clamp(0.0, 1.0))
    }

    /// Deterministic diagnosis string.
    fn diagnose(
        &self,
        snippet_count: usize,
        used_context: bool,
        patterns: &[DetectedPattern],
        risk: RiskLevel,
    ) -> String {
        let mut lines = vec![format!(
            "{snippet_count} context snippets; context used: {}",
            if used_context { "yes" } else { "no" }
        )];

        if patterns.is_empty() {
            lines.push("no hallucination patterns detected".to_string());
        } else {
            let listed: Vec<String> = patterns
                .iter()
                .map(|p| format!("{} ({})", p.name, p.severity))
                .collect();
            lines.push(format!("patterns: {}", listed.join(", ")));
        }

        if risk >= RiskLevel::Medium {
            lines.push(
                "recommendation: verify this answer against the source documents before trusting it"
                    .to_string(),
            );
        }

        lines.join("\n")
    }
}

impl Default for ContextValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippets(texts: &[&str]) -> Vec<ContextSnippet> {
        texts.iter().map(|t| ContextSnippet::new(*t, 0.8)).collect()
    }

    #[test]
    fn test_honest_no_information_answer_is_low_risk() {
        let assessment = ContextValidator::new().assess(
            "No tengo información sobre eso",
            &[],
            "horario de atención",
        );
        assert_eq!(assessment.risk, RiskLevel::Low);
        assert!(assessment.patterns.is_empty());
        assert!((assessment.confidence - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_false_reference_with_no_snippets_is_high_risk() {
        let assessment = ContextValidator::new().assess(
            "Según el documento, el horario es de 9 a 17 horas.",
            &[],
            "horario",
        );
        assert_eq!(assessment.risk, RiskLevel::High);
        assert!(assessment
            .patterns
            .iter()
            .any(|p| p.name == "false_reference" && p.severity == Severity::High));
        assert!((assessment.confidence - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_false_reference_english_variant() {
        let assessment = ContextValidator::new().assess(
            "According to the document, shipping takes two days.",
            &[],
            "shipping time",
        );
        assert!(assessment
            .patterns
            .iter()
            .any(|p| p.name == "false_reference"));
    }

    #[test]
    fn test_citation_with_snippets_is_not_false_reference() {
        let assessment = ContextValidator::new().assess(
            "Según el documento, el horario es de 9 a 17.",
            &snippets(&["El horario de atención es de 9 a 17 horas, lunes a viernes."]),
            "horario",
        );
        assert!(!assessment
            .patterns
            .iter()
            .any(|p| p.name == "false_reference"));
    }

    #[test]
    fn test_contradiction_needs_plentiful_context() {
        let validator = ContextValidator::new();
        let many = snippets(&[
            "Envíos a todo el país.",
            "Envío gratis desde 50 euros.",
            "Entrega en 48 horas.",
            "Devoluciones gratuitas.",
        ]);

        let assessment =
            validator.assess("Esa información no existe en nuestra base.", &many, "envíos");
        assert!(assessment.patterns.iter().any(|p| p.name == "contradiction"));
        assert_eq!(assessment.risk, RiskLevel::Medium);

        // Same denial with thin context: not a contradiction.
        let assessment = validator.assess(
            "Esa información no existe en nuestra base.",
            &snippets(&["Envíos a todo el país."]),
            "envíos",
        );
        assert!(!assessment.patterns.iter().any(|p| p.name == "contradiction"));
    }

    #[test]
    fn test_unsourced_specifics() {
        let assessment = ContextValidator::new().assess(
            "The plan costs 49, renews on 12/01/2025, includes 500 requests and 99.9% uptime.",
            &[],
            "pricing",
        );
        assert!(assessment
            .patterns
            .iter()
            .any(|p| p.name == "unsourced_specifics"));
    }

    #[test]
    fn test_specifics_with_enough_context_pass() {
        let assessment = ContextValidator::new().assess(
            "The plan costs 49, renews on 12/01/2025, includes 500 requests and 99.9% uptime.",
            &snippets(&[
                "Premium plan: 49 per month, 500 requests included.",
                "SLA: 99.9% uptime. Renewal every 12 months.",
            ]),
            "pricing",
        );
        assert!(!assessment
            .patterns
            .iter()
            .any(|p| p.name == "unsourced_specifics"));
    }

    #[test]
    fn test_overconfidence() {
        let assessment = ContextValidator::new().assess(
            "This is definitely correct and absolutely guaranteed to work.",
            &snippets(&["Some context about the product."]),
            "guarantee",
        );
        assert!(assessment
            .patterns
            .iter()
            .any(|p| p.name == "overconfidence"));
    }

    #[test]
    fn test_single_absolutist_phrase_is_fine() {
        let assessment = ContextValidator::new().assess(
            "The store is always open on weekdays.",
            &snippets(&["Open weekdays."]),
            "hours",
        );
        assert!(!assessment
            .patterns
            .iter()
            .any(|p| p.name == "overconfidence"));
    }

    #[test]
    fn test_off_context_generic_hedge() {
        let assessment = ContextValidator::new().assess(
            "Generalmente depende de factores externos y condiciones.",
            &snippets(&["La política de reembolso cubre 30 días desde la compra."]),
            "política de reembolso plazos",
        );
        assert!(assessment
            .patterns
            .iter()
            .any(|p| p.name == "off_context_generic"));
    }

    #[test]
    fn test_grounded_answer_uses_context() {
        let assessment = ContextValidator::new().assess(
            "Nuestro horario de apertura es de 9 a 17, con entrega gratuita los viernes.",
            &snippets(&["Horario de apertura: 9 a 17. Entrega gratuita todos los viernes."]),
            "horario",
        );
        assert!(assessment.used_context);
        assert_eq!(assessment.risk, RiskLevel::Low);
        // Confidence scales with snippet relevance.
        assert!((assessment.confidence - 0.8).abs() < 0.01);
    }

    #[test]
    fn test_high_severity_with_zero_snippets_is_high_risk() {
        let assessment = ContextValidator::new().assess(
            "Según el documento, esto definitivamente siempre funciona.",
            &[],
            "funcionamiento",
        );
        assert_eq!(assessment.risk, RiskLevel::High);
    }

    #[test]
    fn test_two_medium_patterns_is_medium_risk() {
        let assessment = ContextValidator::new().assess(
            "Generalmente depende, pero definitivamente siempre cuesta 10, 20, 30 y 40.",
            &snippets(&["Los precios del catálogo se revisan cada temporada."]),
            "catálogo precios productos",
        );
        let mediums = assessment
            .patterns
            .iter()
            .filter(|p| p.severity == Severity::Medium)
            .count();
        assert!(mediums >= 2, "expected >=2 medium patterns: {:?}", assessment.patterns);
        assert_eq!(assessment.risk, RiskLevel::Medium);
    }

    #[test]
    fn test_empty_response_is_low_risk_zero_confidence() {
        let assessment = ContextValidator::new().assess("   ", &snippets(&["ctx"]), "query");
        assert_eq!(assessment.risk, RiskLevel::Low);
        assert_eq!(assessment.confidence, 0.0);
        assert!(assessment.diagnosis.contains("empty response"));
    }

    #[test]
    fn test_confidence_always_clamped() {
        let wild = vec![ContextSnippet::new("context words here", 7.5)];
        let assessment = ContextValidator::new().assess("An answer.", &wild, "query");
        assert!((0.0..=1.0).contains(&assessment.confidence));
    }

    #[test]
    fn test_diagnosis_is_deterministic_and_ordered() {
        let validator = ContextValidator::new();
        let run = || {
            validator.assess(
                "Según el documento, esto definitivamente siempre funciona.",
                &[],
                "funcionamiento",
            )
        };
        let a = run();
        let b = run();
        assert_eq!(a.diagnosis, b.diagnosis);
        assert!(a.diagnosis.starts_with("0 context snippets; context used: no"));
        assert!(a.diagnosis.contains("false_reference (high)"));
        assert!(a.diagnosis.contains("recommendation:"));

        // Patterns are ordered by descending severity.
        let sevs: Vec<Severity> = a.patterns.iter().map(|p| p.severity).collect();
        let mut sorted = sevs.clone();
        sorted.sort_by(|x, y| y.cmp(x));
        assert_eq!(sevs, sorted);
    }

    #[test]
    fn test_custom_thresholds() {
        let config = ValidatorConfig::new().with_specifics_min_count(2);
        let validator = ContextValidator::with_config(config);
        let assessment =
            validator.assess("It costs 49 and renews every 12 months.", &[], "price");
        assert!(assessment
            .patterns
            .iter()
            .any(|p| p.name == "unsourced_specifics"));
    }

    #[test]
    fn test_assessment_serializes() {
        let assessment =
            ContextValidator::new().assess("Una respuesta normal.", &snippets(&["ctx"]), "q");
        let json = serde_json::to_string(&assessment).unwrap();
        assert!(json.contains("\"risk\""));
        assert!(json.contains("\"diagnosis\""));
    }
}
