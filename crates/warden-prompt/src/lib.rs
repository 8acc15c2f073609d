//! # Warden Prompt - Injection Defense for the LLM Pipeline
//!
//! Everything user-typed text passes through before it is allowed anywhere
//! near a language model prompt.
//!
//! ## Pipeline
//!
//! ```text
//! raw chat text
//!      │
//!      ▼
//! ┌──────────────────┐   strip control chars, normalize quoting,
//! │ PromptSanitizer  │   truncate at the hard cap
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐   pattern-table scan across seven attack
//! │InjectionDetector │   families → InjectionVerdict (advisory)
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐   delimited three-region prompt; the user
//! │ SecurePrompt     │   region is declared data, never instructions.
//! │ Composer         │   Runs regardless of the risk score.
//! └──────────────────┘
//! ```
//!
//! ## Threat Model
//!
//! | Threat | Defense |
//! |--------|---------|
//! | "Ignore previous instructions" | Pattern catalogue, family: instruction override |
//! | System prompt extraction | Pattern catalogue, family: prompt extraction |
//! | Role hijacking ("you are now...") | Pattern catalogue, family: role hijack |
//! | Code / command execution phrasing | Pattern catalogue, family: code execution |
//! | Memory / environment probing | Pattern catalogue, family: introspection |
//! | Markup & SQL fragments | Pattern catalogue, family: markup injection |
//! | Known jailbreak aliases (DAN, ...) | Pattern catalogue, family: jailbreak alias |
//! | Delimiter smuggling | Quote normalization + delimiter counting in the safety score |
//! | Oversized payloads | Hard truncation at the sanitizer cap |
//!
//! A single pattern match marks the input suspicious: in this position a
//! false positive costs a review, a false negative costs an incident.
//!
//! Detection is advisory. Composition is not: [`SecurePromptComposer`]
//! brackets every region with repeated delimiters whether or not anything
//! matched, so the defense does not depend on the catalogue being complete.
//!
//! ## References
//!
//! - Perez & Ribeiro (2022) - "Ignore This Title and HackAPrompt"
//!   <https://arxiv.org/abs/2311.16119>
//! - Greshake et al. (2023) - "Not What You've Signed Up For: Compromising
//!   Real-World LLM-Integrated Applications with Indirect Prompt Injection"
//!   <https://arxiv.org/abs/2302.12173>
//! - OWASP LLM Top 10, LLM01: Prompt Injection
//!   <https://owasp.org/www-project-top-10-for-large-language-model-applications/>

pub mod composer;
pub mod detector;
pub mod models;
pub mod sanitizer;

pub use composer::SecurePromptComposer;
pub use detector::{InjectionDetector, InjectionPattern};
pub use models::{AttackFamily, InjectionVerdict, PromptError, SafetyReport};
pub use sanitizer::{PromptSanitizer, MAX_INPUT_CHARS};
