//! Theme classification.
//!
//! `Classifier` is the swappable capability seam: the built-in
//! implementation is an ordered keyword-rule list (first match wins, no
//! voting), so classification is total and deterministic. An LLM-backed
//! implementation can be plugged in without touching callers — batch tagging
//! clamps any label outside the theme set to the fallback, so the
//! `theme ∈ ThemeSet` invariant holds regardless of implementation.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::ThemeSet;
use crate::pipeline::types::{CanonicalReview, TaggedReview};

// ── Capability trait ────────────────────────────────────────────────

/// Assigns exactly one theme to a review text. Never fails.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Implementation name for logging.
    fn name(&self) -> &'static str;

    /// Pick a theme for `text`. Implementations should return a member of
    /// `themes`; batch tagging clamps anything else to the fallback.
    async fn classify(&self, text: &str, themes: &ThemeSet) -> String;
}

// ── Keyword classifier ──────────────────────────────────────────────

/// One classification rule: any keyword present (case-insensitive substring)
/// assigns the theme.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    keywords: Vec<String>,
    theme: String,
}

impl KeywordRule {
    pub fn new(keywords: &[&str], theme: impl Into<String>) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            theme: theme.into(),
        }
    }

    fn matches(&self, lowered_text: &str) -> bool {
        self.keywords.iter().any(|k| lowered_text.contains(k))
    }
}

/// Deterministic keyword classifier. Rules are evaluated in declaration
/// order; the FIRST matching rule wins, later rules are never consulted.
pub struct KeywordClassifier {
    rules: Vec<KeywordRule>,
}

impl KeywordClassifier {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// The built-in rule list, in priority order.
    pub fn default_rules() -> Self {
        Self::new(vec![
            KeywordRule::new(&["support", "customer", "service", "reply"], "Customer Support"),
            KeywordRule::new(
                &["charge", "fee", "money", "cost", "brokerage"],
                "Pricing & Charges",
            ),
            KeywordRule::new(
                &["bug", "crash", "slow", "lag", "install", "error"],
                "App Performance & Bugs",
            ),
            KeywordRule::new(
                &["feature", "option", "trade", "stock", "f&o", "ipo"],
                "Trading & Features",
            ),
        ])
    }

    /// First matching rule's theme, or `None` when nothing matches.
    fn evaluate(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.theme.as_str())
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn classify(&self, text: &str, themes: &ThemeSet) -> String {
        match self.evaluate(text) {
            Some(theme) => theme.to_string(),
            None => themes.fallback().to_string(),
        }
    }
}

// ── Batch tagging ───────────────────────────────────────────────────

/// Tag every review, preserving order. Labels outside the theme set are
/// clamped to the fallback so the output invariant holds for any classifier.
pub async fn tag_reviews(
    reviews: Vec<CanonicalReview>,
    classifier: &dyn Classifier,
    themes: &ThemeSet,
) -> Vec<TaggedReview> {
    let mut tagged = Vec::with_capacity(reviews.len());
    for review in reviews {
        let label = classifier.classify(&review.text, themes).await;
        let theme = if themes.contains(&label) {
            label
        } else {
            warn!(
                label = %label,
                classifier = classifier.name(),
                "Classifier returned a theme outside the set; using fallback"
            );
            themes.fallback().to_string()
        };
        tagged.push(TaggedReview { review, theme });
    }

    debug!(
        count = tagged.len(),
        classifier = classifier.name(),
        "Tagged review batch"
    );
    tagged
}
