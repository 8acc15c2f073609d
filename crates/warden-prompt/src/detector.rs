//! Pattern-based prompt injection detection.
//!
//! The catalogue is a flat table of `{name, family, pattern, weight}` rows.
//! Adding a signature means appending a row; the scan loop and the
//! table-driven tests pick it up with no other change.
//!
//! The platform serves Spanish- and English-speaking tenants, so the
//! high-frequency attack phrasings appear in both languages.
//!
//! Detection here is advisory: a verdict feeds logging and blocking policy,
//! while the composer's delimiting runs unconditionally.

use regex::Regex;
use tracing::debug;

use crate::models::{AttackFamily, InjectionVerdict};

/// One row of the detection catalogue.
pub struct InjectionPattern {
    /// Stable identifier reported in verdicts and logs.
    pub name: &'static str,
    /// Attack-intent family this signature belongs to.
    pub family: AttackFamily,
    /// Case-insensitive matcher.
    pub pattern: Regex,
    /// Contribution to the 0-100 risk score.
    pub weight: u8,
}

/// Scans user text against the injection catalogue.
pub struct InjectionDetector {
    patterns: Vec<InjectionPattern>,
}

impl InjectionDetector {
    /// Detector with the built-in catalogue.
    pub fn new() -> Self {
        Self {
            patterns: Self::default_patterns(),
        }
    }

    /// Detector with a custom catalogue.
    pub fn with_patterns(patterns: Vec<InjectionPattern>) -> Self {
        Self { patterns }
    }

    /// The active catalogue.
    pub fn patterns(&self) -> &[InjectionPattern] {
        &self.patterns
    }

    /// Built-in signature catalogue.
    fn default_patterns() -> Vec<InjectionPattern> {
        use AttackFamily::*;

        vec![
            // -- Instruction override ----------------------------------------
            InjectionPattern {
                name: "ignore_previous",
                family: InstructionOverride,
                pattern: Regex::new(r"(?i)ignore\s+(all\s+)?(previous|prior|above|earlier)\s+(instructions?|prompts?|rules?|directions?)").unwrap(),
                weight: 40,
            },
            InjectionPattern {
                name: "disregard_instructions",
                family: InstructionOverride,
                pattern: Regex::new(r"(?i)disregard\s+(all\s+)?(your\s+)?(previous|prior|above)\s+(instructions?|prompts?|rules?|guidelines?)").unwrap(),
                weight: 40,
            },
            InjectionPattern {
                name: "forget_instructions",
                family: InstructionOverride,
                pattern: Regex::new(r"(?i)forget\s+(all\s+)?(your|the|previous)\s+(instructions?|rules?|training)").unwrap(),
                weight: 35,
            },
            InjectionPattern {
                name: "new_instructions",
                family: InstructionOverride,
                pattern: Regex::new(r"(?i)(new|updated|override)\s+(instructions?|directives?)\s*:").unwrap(),
                weight: 30,
            },
            InjectionPattern {
                name: "ignora_instrucciones",
                family: InstructionOverride,
                pattern: Regex::new(r"(?i)(ignora|olvida|descarta)\s+(todas\s+)?(las\s+)?instrucciones\s+(anteriores|previas)").unwrap(),
                weight: 40,
            },
            // -- System prompt extraction ------------------------------------
            InjectionPattern {
                name: "reveal_system_prompt",
                family: PromptExtraction,
                pattern: Regex::new(r"(?i)(show|reveal|display|print|output|repeat|tell)\s+(me\s+)?(your|the)\s+(system\s+)?(prompt|instructions?)").unwrap(),
                weight: 35,
            },
            InjectionPattern {
                name: "query_instructions",
                family: PromptExtraction,
                pattern: Regex::new(r"(?i)what\s+(are|is)\s+(your|the)\s+(system\s+)?(instructions?|prompt|rules?)").unwrap(),
                weight: 30,
            },
            InjectionPattern {
                name: "repeat_above",
                family: PromptExtraction,
                pattern: Regex::new(r"(?i)repeat\s+(everything|all|the\s+text)\s+(above|before)").unwrap(),
                weight: 30,
            },
            InjectionPattern {
                name: "revela_prompt",
                family: PromptExtraction,
                pattern: Regex::new(r"(?i)(mu[eé]stra(me)?|revela|rep[ií]te(me)?)\s+(tu|el)\s+(prompt|sistema|instrucciones)").unwrap(),
                weight: 35,
            },
            // -- Role hijacking ----------------------------------------------
            InjectionPattern {
                name: "you_are_now",
                family: RoleHijack,
                pattern: Regex::new(r"(?i)you\s+are\s+now\b").unwrap(),
                weight: 25,
            },
            InjectionPattern {
                name: "pretend_you_are",
                family: RoleHijack,
                pattern: Regex::new(r"(?i)(pretend|act\s+as\s+if|imagine)\s+(that\s+)?you\s*('re|\s+are)").unwrap(),
                weight: 25,
            },
            InjectionPattern {
                name: "roleplay_as",
                family: RoleHijack,
                pattern: Regex::new(r"(?i)\b(role-?play\s+as|simulate\s+being)\b").unwrap(),
                weight: 25,
            },
            InjectionPattern {
                name: "from_now_on",
                family: RoleHijack,
                pattern: Regex::new(r"(?i)from\s+now\s+on\s+you\s+(are|will)").unwrap(),
                weight: 25,
            },
            InjectionPattern {
                name: "ahora_eres",
                family: RoleHijack,
                pattern: Regex::new(r"(?i)(ahora\s+eres|finge\s+que\s+eres|act[uú]a\s+como\s+si)").unwrap(),
                weight: 25,
            },
            // -- Code / command execution ------------------------------------
            InjectionPattern {
                name: "execute_code",
                family: CodeExecution,
                pattern: Regex::new(r"(?i)(execute|run|eval)\s+(this\s+)?(code|command|script|shell)").unwrap(),
                weight: 30,
            },
            InjectionPattern {
                name: "shell_fragment",
                family: CodeExecution,
                pattern: Regex::new(r"(?i)(\brm\s+-rf\b|\bsudo\s+|/bin/(ba)?sh\b)").unwrap(),
                weight: 30,
            },
            InjectionPattern {
                name: "python_escape",
                family: CodeExecution,
                pattern: Regex::new(r"(?i)\b(import\s+os|subprocess\.|os\.system)\b").unwrap(),
                weight: 30,
            },
            // -- Memory / environment introspection --------------------------
            InjectionPattern {
                name: "dump_memory",
                family: Introspection,
                pattern: Regex::new(r"(?i)(show|dump|print|reveal)\s+(your\s+)?(memory|context\s+window|conversation\s+history)").unwrap(),
                weight: 25,
            },
            InjectionPattern {
                name: "probe_environment",
                family: Introspection,
                pattern: Regex::new(r"(?i)(list|show|print|dump|reveal)\s+(your\s+|the\s+)?(env(ironment)?\s+variables?|api\s*-?keys?|credentials|secrets)").unwrap(),
                weight: 30,
            },
            // -- Markup / SQL injection fragments ----------------------------
            InjectionPattern {
                name: "script_tag",
                family: MarkupInjection,
                pattern: Regex::new(r"(?i)<\s*script\b").unwrap(),
                weight: 30,
            },
            InjectionPattern {
                name: "event_handler",
                family: MarkupInjection,
                pattern: Regex::new(r"(?i)\bon(click|error|load|mouseover)\s*=").unwrap(),
                weight: 25,
            },
            InjectionPattern {
                name: "sql_fragment",
                family: MarkupInjection,
                pattern: Regex::new(r"(?i)('\s*or\s+'?1'?\s*=\s*'?1|union\s+select|;\s*drop\s+table)").unwrap(),
                weight: 30,
            },
            InjectionPattern {
                name: "template_braces",
                family: MarkupInjection,
                pattern: Regex::new(r"\{\{.+\}\}|\{%.+%\}").unwrap(),
                weight: 20,
            },
            // -- Jailbreak aliases -------------------------------------------
            InjectionPattern {
                name: "dan_alias",
                family: JailbreakAlias,
                pattern: Regex::new(r"(?i)\b(DAN\s+mode|do\s+anything\s+now)\b").unwrap(),
                weight: 35,
            },
            InjectionPattern {
                name: "developer_mode",
                family: JailbreakAlias,
                pattern: Regex::new(r"(?i)developer\s+mode").unwrap(),
                weight: 30,
            },
            InjectionPattern {
                name: "jailbreak",
                family: JailbreakAlias,
                pattern: Regex::new(r"(?i)\bjailbr[eo]a?k").unwrap(),
                weight: 35,
            },
        ]
    }

    /// Scan text and return a verdict.
    ///
    /// A single match is enough to mark the text suspicious — in this
    /// position false negatives are costlier than false positives. The
    /// score is the capped sum of matched weights.
    pub fn detect(&self, text: &str) -> InjectionVerdict {
        let mut matched = Vec::new();
        let mut score: u32 = 0;

        for row in &self.patterns {
            if row.pattern.is_match(text) {
                matched.push(row.name.to_string());
                score += u32::from(row.weight);
            }
        }

        if !matched.is_empty() {
            debug!(patterns = ?matched, "injection patterns matched");
        }

        InjectionVerdict {
            suspicious: !matched.is_empty(),
            matched,
            risk_score: score.min(100) as u8,
        }
    }
}

impl Default for InjectionDetector {
    fn default() -> Self {
        Self::new()
    }
}
