//! Shared types for the review processing pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Platform ────────────────────────────────────────────────────────

/// Which store a review came from.
///
/// Each store uses its own field names in raw records; the normalizer
/// resolves them through the per-platform tables below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "Google Play")]
    GooglePlay,
    #[serde(rename = "iOS App Store")]
    AppStore,
}

impl Platform {
    /// Raw field names that may carry the review timestamp, in lookup order.
    pub fn date_fields(&self) -> &'static [&'static str] {
        match self {
            Self::GooglePlay => &["at", "date"],
            Self::AppStore => &["date", "updated"],
        }
    }

    /// Raw field names that may carry the review body, in lookup order.
    pub fn text_fields(&self) -> &'static [&'static str] {
        match self {
            Self::GooglePlay => &["content", "text"],
            Self::AppStore => &["review", "text"],
        }
    }

    /// Raw field names that may carry the rating, in lookup order.
    pub fn rating_fields(&self) -> &'static [&'static str] {
        match self {
            Self::GooglePlay => &["score", "rating"],
            Self::AppStore => &["rating", "score"],
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GooglePlay => write!(f, "Google Play"),
            Self::AppStore => write!(f, "iOS App Store"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Google Play" | "google-play" | "play" => Ok(Self::GooglePlay),
            "iOS App Store" | "app-store" | "ios" => Ok(Self::AppStore),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

// ── Raw review ──────────────────────────────────────────────────────

/// A raw review record as emitted by a source: an opaque JSON mapping whose
/// field names follow the source's conventions. Never persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawReview(pub serde_json::Map<String, serde_json::Value>);

impl RawReview {
    /// First present field among `names` as a string, if any.
    pub fn first_str(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .find_map(|name| self.0.get(*name))
            .and_then(|v| v.as_str())
    }

    /// First present field among `names` as a number, accepting JSON numbers
    /// and numeric strings (the RSS feed serves ratings as `"5"`).
    pub fn first_number(&self, names: &[&str]) -> Option<f64> {
        names.iter().find_map(|name| {
            let value = self.0.get(*name)?;
            match value {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }
        })
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for RawReview {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

// ── Canonical review ────────────────────────────────────────────────

/// A normalized, de-identified review.
///
/// Invariants:
/// - `text` is redacted (no raw emails, long digit runs, or marker+name
///   patterns) and contains no newlines;
/// - `title` is always empty — reviewer-authored titles are identity-adjacent
///   and dropped by policy;
/// - reviewer identity fields from the raw record are never carried over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalReview {
    pub platform: Platform,
    #[serde(rename = "app_name")]
    pub app_id: String,
    pub date: DateTime<Utc>,
    pub rating: Option<f32>,
    pub title: String,
    pub text: String,
}

impl CanonicalReview {
    /// Word count of the redacted body (whitespace-separated).
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Character count of the redacted body.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

// ── Tagged review ───────────────────────────────────────────────────

/// A canonical review with its assigned theme. `theme` is always a member of
/// the configured theme set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedReview {
    #[serde(flatten)]
    pub review: CanonicalReview,
    pub theme: String,
}

// ── Ingest stats ────────────────────────────────────────────────────

/// Counters from one ingest pass, for logs and action previews.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IngestStats {
    /// Raw records received from the source.
    pub fetched: usize,
    /// Records that passed normalization and admission.
    pub admitted: usize,
    /// Records skipped because no timestamp field parsed.
    pub dropped_malformed: usize,
    /// Records rejected by the recency/length filter.
    pub dropped_by_filter: usize,
}
