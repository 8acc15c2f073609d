//! # Chat Warden Core
//!
//! Unified trust & safety facade for a multi-tenant AI chat platform.
//! Orchestrates token lifecycle, CSRF defense, prompt-injection defense,
//! hallucination scoring, and output sanitization.
//!
//! ## Threat Coverage
//!
//! | Layer | Component | Threats Addressed |
//! |-------|-----------|-------------------|
//! | Credentials | warden-auth | Token forgery, refresh replay, CSRF |
//! | Prompt | warden-prompt | Injection, extraction, jailbreaks |
//! | Response | warden-context | Hallucinated, unsourced answers |
//! | Rendering | warden-output | XSS, script-scheme URLs |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        CHAT WARDEN CORE                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │                      ┌─────────────────┐                        │
//! │                      │     Warden      │  ← Unified Facade      │
//! │                      └────────┬────────┘                        │
//! │                               │                                 │
//! │      ┌──────────────┬─────────┴───────┬───────────────┐         │
//! │      ▼              ▼                 ▼               ▼         │
//! │ ┌──────────┐  ┌───────────┐    ┌───────────┐   ┌───────────┐   │
//! │ │  Auth    │  │  Prompt   │    │  Context  │   │  Output   │   │
//! │ │ Tokens + │  │ Sanitize, │    │ Halluci-  │   │ Whitelist │   │
//! │ │  CSRF    │  │  Detect,  │    │  nation   │   │ HTML/URL  │   │
//! │ │          │  │  Compose  │    │  Scoring  │   │  Cleaner  │   │
//! │ └──────────┘  └───────────┘    └───────────┘   └───────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Request Flow
//!
//! ```text
//! request ─▶ csrf / refresh auth ─▶ guard_prompt ─▶ (external LLM)
//!                                                        │
//! caller ◀─ safe html + assessment ◀─ review_response ◀──┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_core::{Warden, WardenConfig};
//!
//! let warden = Warden::new(config)?;
//!
//! // Login issues the full credential set.
//! let grant = warden.login("user-1", "ana@example.com", "Ana", meta)?;
//!
//! // Guard a chat turn before it reaches the model.
//! let guarded = warden.guard_prompt(system, user_text, &snippets)?;
//! if guarded.verdict.is_blocked() {
//!     return reject(guarded.verdict);
//! }
//! let answer = llm.complete(&guarded.prompt).await?;
//!
//! // Audit and clean the answer before rendering.
//! let reviewed = warden.review_response(&answer, &snippets, user_text);
//! render(reviewed.safe_html);
//! ```
//!
//! ## Security Notes
//!
//! - Detection is advisory, composition is not: the composer's delimiting
//!   runs on every request regardless of the risk score.
//! - Store failures abort the request; the facade never authenticates a
//!   caller when the session store is unreachable.
//! - Hallucination assessments are telemetry, not gates. They come back
//!   with flags, never with a Block verdict.
//! - Revocation is immediate for refresh operations; outstanding access
//!   tokens remain valid up to 15 minutes — the documented trade-off of
//!   self-contained tokens.

mod config;
mod error;
mod verdict;
mod warden;

pub use config::{AuthConfig, CsrfConfig, PromptConfig, WardenConfig};
pub use error::{Result, WardenError};
pub use verdict::{BlockReason, ReviewFlag, Verdict};
pub use warden::{GuardedPrompt, LoginGrant, ReviewedResponse, Warden};

// Re-export component types callers interact with.
pub use warden_auth::{AccessClaims, AuthError, ClientMeta};
pub use warden_context::{ContextSnippet, HallucinationAssessment, RiskLevel, ValidatorConfig};
pub use warden_prompt::{InjectionVerdict, PromptError, SafetyReport};
