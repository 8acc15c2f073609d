//! The unified Warden facade.
//!
//! Entry point for the trust & safety layer. One [`Warden`] instance per
//! process wires the token services, the prompt defense, the hallucination
//! scorer, and the output sanitizer to a single configuration.

use std::time::Duration as StdDuration;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::config::WardenConfig;
use crate::error::{Result, WardenError};
use crate::verdict::{BlockReason, ReviewFlag, Verdict};

use warden_auth::{
    AccessClaims, ClientMeta, CsrfService, MemoryCache, SessionService, SledSessionStore,
    TokenIssuer,
};
use warden_context::{ContextSnippet, ContextValidator, HallucinationAssessment};
use warden_output::sanitize_html;
use warden_prompt::{
    InjectionDetector, InjectionVerdict, PromptSanitizer, SafetyReport, SecurePromptComposer,
};

/// Credential set returned by login and refresh.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    /// Signed access token (15-minute lifetime).
    pub access_token: String,
    /// Opaque refresh secret (7-day lifetime, single-use).
    pub refresh_token: String,
    /// CSRF token for the double-submit cookie pair.
    pub csrf_token: String,
}

/// Output of [`Warden::guard_prompt`].
#[derive(Debug, Clone)]
pub struct GuardedPrompt {
    /// The composed, delimiter-bracketed prompt. Always present — the
    /// composer runs regardless of the verdict.
    pub prompt: String,
    /// Detection verdict on the sanitized user text.
    pub injection: InjectionVerdict,
    /// Advisory composition safety report.
    pub report: SafetyReport,
    /// Policy decision derived from the above.
    pub verdict: Verdict,
}

/// Output of [`Warden::review_response`].
#[derive(Debug, Clone)]
pub struct ReviewedResponse {
    /// The response cleaned for browser rendering.
    pub safe_html: String,
    /// Hallucination assessment, for telemetry.
    pub assessment: HallucinationAssessment,
    /// Review flags derived from the assessment. Never a Block — the
    /// assessment is advisory.
    pub flags: Vec<ReviewFlag>,
}

/// The unified trust & safety facade.
pub struct Warden {
    config: WardenConfig,
    sessions: SessionService<SledSessionStore>,
    issuer: TokenIssuer,
    csrf: CsrfService<MemoryCache>,
    sanitizer: PromptSanitizer,
    detector: InjectionDetector,
    composer: SecurePromptComposer,
    validator: ContextValidator,
}

impl Warden {
    /// Create a Warden from configuration.
    ///
    /// # Errors
    ///
    /// - `WardenError::Config` when the signing key is empty — the same
    ///   class of silent misconfiguration as an empty system prompt, and
    ///   equally non-negotiable.
    /// - `WardenError::Auth` when the session database cannot be opened.
    pub fn new(config: WardenConfig) -> Result<Self> {
        if config.auth.signing_key.trim().is_empty() {
            return Err(WardenError::Config(
                "auth.signing_key must not be empty".to_string(),
            ));
        }

        let issuer = TokenIssuer::new(
            config.auth.signing_key.as_bytes().to_vec(),
            config.auth.issuer.clone(),
            config.auth.audience.clone(),
        )
        .with_lifetime(Duration::seconds(config.auth.access_ttl_secs));

        let store = SledSessionStore::open(&config.auth.db_path)?;
        let sessions = SessionService::new(store, issuer.clone())
            .with_lifetime(Duration::seconds(config.auth.refresh_ttl_secs));

        let csrf = CsrfService::new(MemoryCache::new())
            .with_ttl(StdDuration::from_secs(config.csrf.ttl_secs));

        let sanitizer = PromptSanitizer::new().with_max_chars(config.prompt.max_input_chars);
        let composer =
            SecurePromptComposer::new().with_max_input_chars(config.prompt.max_input_chars);
        let validator = ContextValidator::with_config(config.validator.clone());

        info!(
            issuer = %config.auth.issuer,
            db = %config.auth.db_path.display(),
            "warden initialized"
        );

        Ok(Self {
            config,
            sessions,
            issuer,
            csrf,
            sanitizer,
            detector: InjectionDetector::new(),
            composer,
            validator,
        })
    }

    // ------------------------------------------------------------------
    // Credentials
    // ------------------------------------------------------------------

    /// Open a session: refresh secret, access token, and CSRF token.
    pub fn login(
        &self,
        subject_id: &str,
        email: &str,
        name: &str,
        meta: ClientMeta,
    ) -> Result<LoginGrant> {
        let issued = self.sessions.issue(subject_id, email, name, meta)?;
        let csrf_token = self.csrf.generate()?;
        Ok(LoginGrant {
            access_token: issued.access_token,
            refresh_token: issued.refresh_secret,
            csrf_token,
        })
    }

    /// Exchange a refresh secret for a fresh credential set.
    ///
    /// The old secret is consumed; a captured copy becomes worthless the
    /// moment either party rotates. Revocation takes effect here — but an
    /// access token minted before the revoke stays valid until it expires,
    /// at most 15 minutes.
    pub fn refresh(&self, refresh_token: &str) -> Result<LoginGrant> {
        let rotated = self.sessions.rotate(refresh_token)?;
        let csrf_token = self.csrf.generate()?;
        Ok(LoginGrant {
            access_token: rotated.access_token,
            refresh_token: rotated.refresh_secret,
            csrf_token,
        })
    }

    /// Close a session. Idempotent.
    pub fn logout(&self, refresh_token: &str) -> Result<()> {
        Ok(self.sessions.revoke(refresh_token)?)
    }

    /// Validate an access token and return its claims.
    pub fn authenticate(&self, access_token: &str) -> Result<AccessClaims> {
        Ok(self.issuer.validate(access_token)?)
    }

    /// Generate a standalone CSRF token.
    pub fn issue_csrf(&self) -> Result<String> {
        Ok(self.csrf.generate()?)
    }

    /// Validate and consume a CSRF token.
    pub fn check_csrf(&self, token: &str) -> bool {
        self.csrf.validate(token)
    }

    /// Housekeeping: drop expired session rows.
    pub fn purge_expired_sessions(&self) -> Result<usize> {
        Ok(self.sessions.purge_expired()?)
    }

    // ------------------------------------------------------------------
    // Prompt pipeline
    // ------------------------------------------------------------------

    /// Sanitize, scan, score, and compose one chat turn.
    ///
    /// The prompt is always composed, even when the verdict is Block — the
    /// caller owns policy, and the delimiting must not depend on it.
    ///
    /// # Errors
    ///
    /// `WardenError::Prompt` when the system instructions are empty.
    pub fn guard_prompt(
        &self,
        system_instructions: &str,
        raw_user_text: &str,
        snippets: &[ContextSnippet],
    ) -> Result<GuardedPrompt> {
        debug!(chars = raw_user_text.len(), "guarding prompt");

        let sanitized = self.sanitizer.sanitize(raw_user_text);
        let injection = self.detector.detect(&sanitized);
        let report = self
            .composer
            .validate_safety(system_instructions, raw_user_text);

        let context = if snippets.is_empty() {
            None
        } else {
            Some(
                snippets
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            )
        };

        let prompt = self
            .composer
            .compose(system_instructions, &sanitized, context.as_deref())?;

        let verdict = if injection.suspicious && self.config.prompt.block_on_injection {
            warn!(
                patterns = ?injection.matched,
                score = injection.risk_score,
                "prompt blocked: injection detected"
            );
            Verdict::block(BlockReason::InjectionDetected {
                patterns: injection.matched.clone(),
                risk_score: injection.risk_score,
            })
        } else if !report.valid {
            warn!(score = report.score, "prompt flagged for review");
            Verdict::review(vec![ReviewFlag::ElevatedPromptRisk {
                score: report.score,
            }])
        } else {
            Verdict::allow()
        };

        Ok(GuardedPrompt {
            prompt,
            injection,
            report,
            verdict,
        })
    }

    // ------------------------------------------------------------------
    // Response pipeline
    // ------------------------------------------------------------------

    /// Audit and clean a model response before it is rendered.
    ///
    /// Never fails and never blocks: the assessment is telemetry, and the
    /// sanitized HTML is always safe to render.
    pub fn review_response(
        &self,
        response: &str,
        snippets: &[ContextSnippet],
        original_query: &str,
    ) -> ReviewedResponse {
        let assessment = self.validator.assess(response, snippets, original_query);
        let safe_html = sanitize_html(response);

        let flags = if assessment.needs_review() {
            warn!(risk = %assessment.risk, "response flagged: hallucination risk");
            vec![ReviewFlag::HallucinationRisk {
                level: assessment.risk,
            }]
        } else {
            Vec::new()
        };

        ReviewedResponse {
            safe_html,
            assessment,
            flags,
        }
    }
}

impl std::fmt::Debug for Warden {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warden")
            .field("issuer", &self.config.auth.issuer)
            .finish()
    }
}
