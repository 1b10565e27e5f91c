//! PII redaction for review text.
//!
//! Three ordered rules, applied in sequence:
//! 1. email addresses → `[EMAIL REDACTED]`
//! 2. word-bounded runs of 7+ digits → `[PHONE REDACTED]`
//! 3. hyphen/tilde/"by" + capitalized name → `[NAME REDACTED]`
//!
//! Order matters: an address like `user1234567@mail.com` must be consumed
//! whole by the email rule before the digit rule can see it.
//!
//! The name rule is a heuristic. It over-redacts capitalized non-name phrases
//! after a marker ("- Great App") and misses names without a marker or in
//! scripts without case. Known limitation; callers get best-effort redaction,
//! not a guarantee.

use regex::Regex;

/// Replacement token for matched email addresses.
pub const EMAIL_TOKEN: &str = "[EMAIL REDACTED]";
/// Replacement token for matched digit runs.
pub const PHONE_TOKEN: &str = "[PHONE REDACTED]";
/// Replacement token for matched signature names (marker included).
pub const NAME_TOKEN: &str = "[NAME REDACTED]";

/// Applies the ordered redaction rules. Patterns are compiled once at
/// construction; `redact` is pure and idempotent (no replacement token
/// matches any rule).
pub struct Redactor {
    email: Regex,
    phone: Regex,
    name: Regex,
}

impl Redactor {
    pub fn new() -> Self {
        Self {
            email: Regex::new(r"[\w\.-]+@[\w\.-]+\.\w+").unwrap(),
            phone: Regex::new(r"\b\d{7,}\b").unwrap(),
            name: Regex::new(r"(?:-|~|by)\s+\p{Lu}\p{Ll}+(?:\s+\p{Lu}\p{Ll}+)*").unwrap(),
        }
    }

    /// Redact PII from `text`. Total over any input, including empty and
    /// non-ASCII strings.
    pub fn redact(&self, text: &str) -> String {
        let text = self.email.replace_all(text, EMAIL_TOKEN);
        let text = self.phone.replace_all(&text, PHONE_TOKEN);
        let text = self.name.replace_all(&text, NAME_TOKEN);
        text.into_owned()
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}
