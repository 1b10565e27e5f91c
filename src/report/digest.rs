//! Weekly digest synthesis: theme ranking, insight lookup, rendering.
//!
//! Ranking is reproducible by construction: themes are tallied in first-
//! appearance order and sorted with a stable descending sort, so equal counts
//! keep their first-appearance order. Rendering the same digest twice yields
//! byte-identical output.

use serde::Serialize;

use crate::pipeline::types::TaggedReview;

// ── Insights ────────────────────────────────────────────────────────

/// The `(positive, negative, action)` triple attached to a ranked theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub positive: String,
    pub negative: String,
    pub action: String,
}

impl Insight {
    fn new(positive: &str, negative: &str, action: &str) -> Self {
        Self {
            positive: positive.to_string(),
            negative: negative.to_string(),
            action: action.to_string(),
        }
    }
}

/// Static theme → insight table with a generic fallback triple for themes
/// missing from the table.
pub struct InsightTable {
    entries: Vec<(String, Insight)>,
    fallback: Insight,
}

impl InsightTable {
    pub fn new(entries: Vec<(String, Insight)>, fallback: Insight) -> Self {
        Self { entries, fallback }
    }

    /// The built-in insight table for the default theme set.
    pub fn default_table() -> Self {
        Self::new(
            vec![
                (
                    "User Experience".to_string(),
                    Insight::new(
                        "Clean design appreciated, easy navigation",
                        "Hard to analyze charts deeply",
                        "Add advanced time frames + watchlist shortcuts",
                    ),
                ),
                (
                    "Trading & Features".to_string(),
                    Insight::new(
                        "Fast for most users",
                        "Refund failures & UPI dropouts",
                        "Add retry + refund status tracking",
                    ),
                ),
                (
                    "Pricing & Charges".to_string(),
                    Insight::new(
                        "Low entry barrier appreciated",
                        "Confusion around brokerage & hidden charges",
                        "Add transparent pricing explainer inside buy screen",
                    ),
                ),
                (
                    "App Performance & Bugs".to_string(),
                    Insight::new(
                        "App is lightweight and loads quickly",
                        "Lags observed during market opening",
                        "Optimize socket connection for peak hours",
                    ),
                ),
                (
                    "Customer Support".to_string(),
                    Insight::new(
                        "FAQs are helpful for beginners",
                        "Bot loops are frustrating",
                        "Add direct 'Chat with Agent' shortcut",
                    ),
                ),
            ],
            Insight::new(
                "General positive feedback",
                "Mixed issues reported",
                "Investigate user logs",
            ),
        )
    }

    /// Insight for `theme`, falling back to the generic triple.
    pub fn lookup(&self, theme: &str) -> &Insight {
        self.entries
            .iter()
            .find(|(name, _)| name == theme)
            .map(|(_, insight)| insight)
            .unwrap_or(&self.fallback)
    }
}

// ── Ranking ─────────────────────────────────────────────────────────

/// Tally themes into `(theme, count)` pairs ranked by descending count.
/// Equal counts keep first-appearance order (stable sort over a tally built
/// in first-appearance order).
pub fn rank_themes(tagged: &[TaggedReview]) -> Vec<(String, usize)> {
    let mut tally: Vec<(String, usize)> = Vec::new();
    for t in tagged {
        match tally.iter_mut().find(|(theme, _)| theme == &t.theme) {
            Some((_, count)) => *count += 1,
            None => tally.push((t.theme.clone(), 1)),
        }
    }
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally
}

// ── Digest ──────────────────────────────────────────────────────────

/// One ranked theme in the digest.
#[derive(Debug, Clone, Serialize)]
pub struct ThemeEntry {
    pub theme: String,
    pub count: usize,
    pub insight: Insight,
}

/// The synthesized weekly digest: top-N themes with insights.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyDigest {
    pub app_id: String,
    pub top_n: usize,
    pub entries: Vec<ThemeEntry>,
}

/// Build a digest from tagged reviews. `None` when there is nothing to
/// report — callers surface that as a distinguishable no-data result, never
/// an empty success.
pub fn synthesize(
    tagged: &[TaggedReview],
    insights: &InsightTable,
    app_id: &str,
    top_n: usize,
) -> Option<WeeklyDigest> {
    if tagged.is_empty() {
        return None;
    }

    let entries = rank_themes(tagged)
        .into_iter()
        .take(top_n)
        .map(|(theme, count)| {
            let insight = insights.lookup(&theme).clone();
            ThemeEntry {
                theme,
                count,
                insight,
            }
        })
        .collect();

    Some(WeeklyDigest {
        app_id: app_id.to_string(),
        top_n,
        entries,
    })
}

impl WeeklyDigest {
    /// Render the digest text. Byte-identical for identical input.
    ///
    /// Every selected theme's action item is listed under "Next Sprint
    /// Priorities" in rank order, without dedup or re-ranking.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("📌 Weekly Pulse Summary — {}\n\n", self.app_id));
        out.push_str(&format!(
            "Top {} Categories & Action Insights\n\n",
            self.top_n
        ));

        for (i, entry) in self.entries.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, entry.theme));
            out.push_str(&format!("   ✓ {}\n", entry.insight.positive));
            out.push_str(&format!("   ⚠ {}\n", entry.insight.negative));
            out.push_str(&format!("   🔧 {}\n\n", entry.insight.action));
        }

        out.push_str("Next Sprint Priorities:\n");
        for entry in &self.entries {
            out.push_str(&format!("- {}\n", entry.insight.action));
        }
        out
    }
}
