//! # Warden Output - Whitelist Sanitization for Rendered Content
//!
//! Every value the platform ultimately renders in a browser — message
//! bodies, bot bios, custom descriptions — passes through this crate
//! before persistence or serialization.
//!
//! ## Components
//!
//! | Function | Input | Guarantee |
//! |----------|-------|-----------|
//! | [`sanitize_html`] | Rich text | Only whitelisted tags/attributes survive; idempotent |
//! | [`sanitize_text`] | Plain text | No tags, entities decoded exactly once, whitespace collapsed |
//! | [`sanitize_url`] | Link targets | Returns the input or `""`; never a script-scheme URL |
//!
//! ## Ordering Invariant
//!
//! [`sanitize_html`] strips script blocks, `on*` event handlers, and
//! expression-bearing `style` attributes BEFORE applying the whitelist.
//! Stripping runs to a fixpoint, so obfuscated tag names such as
//! `<scr<script>ipt>` cannot reassemble into an executable tag after one
//! layer is removed.
//!
//! [`sanitize_text`] decodes HTML entities exactly once, after tag
//! stripping. Decoding twice would turn `&amp;lt;script&amp;gt;` into a
//! live tag — that single-decode rule is a tested invariant, not an
//! implementation detail.
//!
//! ## Failure Policy
//!
//! Nothing here returns an error. Adversarial input degrades to the safest
//! output — usually an empty string — because rendering availability must
//! not depend on attacker-controlled content being well-formed.

mod entities;
mod html;
mod text;
mod url;

pub use html::sanitize_html;
pub use text::sanitize_text;
pub use url::sanitize_url;
