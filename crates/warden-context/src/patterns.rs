//! The hallucination pattern catalogue.
//!
//! A flat table of tagged rows. Adding a detector means appending a row
//! with a new [`PatternKind`] arm; the aggregation logic never changes.
//! Phrase tables are bilingual (EN/ES).

use regex::Regex;
use std::sync::LazyLock;

use crate::models::Severity;

/// Detection strategy tag for one catalogue row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PatternKind {
    /// Claims of nonexistence despite plentiful retrieved context.
    Contradiction,
    /// Many concrete figures with almost no context to source them.
    UnsourcedSpecifics,
    /// Stacked absolutist phrasing.
    Overconfidence,
    /// Generic hedge opening that ignores the question while context exists.
    OffContextGeneric,
    /// Citation-style language when nothing was retrieved.
    FalseReference,
}

/// One row of the catalogue.
pub(crate) struct HallucinationPattern {
    pub name: &'static str,
    pub kind: PatternKind,
    pub severity: Severity,
    pub description: &'static str,
}

/// The built-in catalogue.
pub(crate) fn catalogue() -> Vec<HallucinationPattern> {
    vec![
        HallucinationPattern {
            name: "contradiction",
            kind: PatternKind::Contradiction,
            severity: Severity::High,
            description: "response denies information exists despite ample retrieved context",
        },
        HallucinationPattern {
            name: "unsourced_specifics",
            kind: PatternKind::UnsourcedSpecifics,
            severity: Severity::Medium,
            description: "response asserts specific figures with almost no context to back them",
        },
        HallucinationPattern {
            name: "overconfidence",
            kind: PatternKind::Overconfidence,
            severity: Severity::Medium,
            description: "response stacks absolutist language",
        },
        HallucinationPattern {
            name: "off_context_generic",
            kind: PatternKind::OffContextGeneric,
            severity: Severity::Medium,
            description: "generic hedge answer that ignores the question while context exists",
        },
        HallucinationPattern {
            name: "false_reference",
            kind: PatternKind::FalseReference,
            severity: Severity::High,
            description: "response cites documents although no context was retrieved",
        },
    ]
}

/// Phrases denying that information exists.
pub(crate) const CONTRADICTION_PHRASES: &[&str] = &[
    "does not exist",
    "doesn't exist",
    "not found",
    "could not find",
    "couldn't find",
    "no information about",
    "no existe",
    "no se encontró",
    "no se encontro",
    "no hay información",
    "no hay informacion",
    "no tengo información",
    "no tengo informacion",
];

/// Absolutist phrases suggesting overconfidence.
pub(crate) const ABSOLUTIST_PHRASES: &[&str] = &[
    "definitely",
    "absolutely",
    "without a doubt",
    "certainly",
    "guaranteed",
    "always",
    "never",
    "100%",
    "sin duda",
    "definitivamente",
    "con certeza",
    "garantizado",
    "siempre",
    "nunca",
];

/// Generic hedge openings.
pub(crate) const GENERIC_OPENERS: &[&str] = &[
    "it depends",
    "generally",
    "typically",
    "in general",
    "usually",
    "as a rule",
    "depende",
    "generalmente",
    "por lo general",
    "normalmente",
    "en general",
];

/// Citation-style phrases.
pub(crate) const CITATION_PHRASES: &[&str] = &[
    "according to the document",
    "as stated in",
    "the document says",
    "as mentioned in",
    "per the documentation",
    "según el documento",
    "segun el documento",
    "de acuerdo con el documento",
    "como se indica en",
    "el documento dice",
    "según la documentación",
    "segun la documentacion",
];

/// Matches dates, percentages, and standalone numbers.
static SPECIFICS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d+(?:[.,]\d+)?\s*%|\b\d+(?:[.,]\d+)?\b")
        .expect("specifics regex")
});

/// Count the concrete figures (dates, numbers, percentages) in a response.
pub(crate) fn count_specifics(text: &str) -> usize {
    SPECIFICS_RE.find_iter(text).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_is_well_formed() {
        let rows = catalogue();
        let mut names: Vec<_> = rows.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), rows.len(), "duplicate pattern names");
        // The two strong signals are the existence claims.
        assert!(rows
            .iter()
            .filter(|r| r.severity == Severity::High)
            .all(|r| matches!(
                r.kind,
                PatternKind::Contradiction | PatternKind::FalseReference
            )));
    }

    #[test]
    fn test_count_specifics() {
        assert_eq!(count_specifics("no numbers here"), 0);
        assert_eq!(count_specifics("we opened on 12/05/2024"), 1);
        assert_eq!(count_specifics("growth was 42% then 17%"), 2);
        assert_eq!(
            count_specifics("plan A costs 99, plan B costs 199, renewal 15/01/25, uptime 99.9%"),
            4
        );
    }
}
