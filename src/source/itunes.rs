//! App Store reviews via the iTunes customer-reviews RSS feed.
//!
//! The feed serves JSON pages of 50 entries, capped at 10 pages per app.
//! Every value sits inside a `{"label": ...}` wrapper; timestamps carry a
//! UTC offset and are converted to the pipeline's second-precision UTC
//! format here, so downstream normalization sees one date shape.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::ReviewSource;
use crate::config::AppTarget;
use crate::error::SourceError;
use crate::pipeline::normalize::DATE_FORMAT;
use crate::pipeline::types::{Platform, RawReview};

/// The feed stops serving entries past this page.
const MAX_FEED_PAGES: u32 = 10;

/// Fetches App Store reviews from the public RSS feed.
pub struct ItunesRssSource {
    country: String,
    client: reqwest::Client,
}

impl ItunesRssSource {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            client: reqwest::Client::new(),
        }
    }

    fn feed_url(&self, app_id: &str, page: u32) -> String {
        format!(
            "https://itunes.apple.com/{}/rss/customerreviews/page={page}/id={app_id}/sortby=mostrecent/json",
            self.country
        )
    }
}

#[async_trait]
impl ReviewSource for ItunesRssSource {
    fn name(&self) -> &'static str {
        "itunes-rss"
    }

    async fn fetch(
        &self,
        target: &AppTarget,
        count: usize,
    ) -> Result<Vec<RawReview>, SourceError> {
        if target.platform != Platform::AppStore {
            return Err(SourceError::RequestFailed {
                name: "itunes-rss".to_string(),
                reason: format!("{} targets are not served by the iTunes feed", target.platform),
            });
        }

        let mut reviews = Vec::new();

        for page in 1..=MAX_FEED_PAGES {
            if reviews.len() >= count {
                break;
            }

            let url = self.feed_url(&target.app_id, page);
            let resp =
                self.client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| SourceError::RequestFailed {
                        name: "itunes-rss".to_string(),
                        reason: e.to_string(),
                    })?;

            if !resp.status().is_success() {
                return Err(SourceError::RequestFailed {
                    name: "itunes-rss".to_string(),
                    reason: format!("feed returned {}", resp.status()),
                });
            }

            let data: Value = resp.json().await.map_err(|e| SourceError::InvalidResponse {
                name: "itunes-rss".to_string(),
                reason: e.to_string(),
            })?;

            let entries = feed_entries(&data);
            if entries.is_empty() {
                break;
            }

            reviews.extend(entries.into_iter().filter_map(entry_to_raw));
        }

        reviews.truncate(count);
        tracing::info!("Fetched {} reviews from the iTunes feed", reviews.len());
        Ok(reviews)
    }
}

// ── Feed parsing ────────────────────────────────────────────────────

/// Entries of one feed page. `entry` is an array normally, a bare object
/// when the page holds a single review, and absent when the page is empty.
fn feed_entries(data: &Value) -> Vec<&Value> {
    match data.get("feed").and_then(|feed| feed.get("entry")) {
        Some(Value::Array(entries)) => entries.iter().collect(),
        Some(entry @ Value::Object(_)) => vec![entry],
        _ => Vec::new(),
    }
}

/// Unwrap a `{"label": ...}` field.
fn label_str(entry: &Value, field: &str) -> Option<String> {
    entry
        .get(field)
        .and_then(|v| v.get("label"))
        .and_then(Value::as_str)
        .map(String::from)
}

/// Map one feed entry to a raw record, skipping entries with no review body
/// (the feed occasionally interleaves app metadata). Reviewer identity under
/// `author` is dropped here, before the record enters the pipeline.
fn entry_to_raw(entry: &Value) -> Option<RawReview> {
    let text = label_str(entry, "content")?;

    let mut map = serde_json::Map::new();
    if let Some(updated) = label_str(entry, "updated")
        && let Some(date) = utc_date_string(&updated)
    {
        map.insert("date".to_string(), Value::String(date));
    }
    if let Some(rating) = label_str(entry, "im:rating") {
        map.insert("rating".to_string(), Value::String(rating));
    }
    if let Some(title) = label_str(entry, "title") {
        map.insert("title".to_string(), Value::String(title));
    }
    map.insert("review".to_string(), Value::String(text));

    Some(RawReview::from(map))
}

/// Feed timestamps are RFC 3339 with an offset ("2024-03-01T09:00:00-07:00");
/// convert to the pipeline's UTC raw-date format.
fn utc_date_string(raw: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_entry() -> Value {
        serde_json::json!({
            "author": {"name": {"label": "Some Reviewer"}},
            "updated": {"label": "2024-03-01T09:00:00-07:00"},
            "im:rating": {"label": "2"},
            "title": {"label": "Disappointed"},
            "content": {"label": "refunds take forever", "attributes": {"type": "text"}},
        })
    }

    #[test]
    fn feed_url_shape() {
        let source = ItunesRssSource::new("in");
        assert_eq!(
            source.feed_url("1404871703", 3),
            "https://itunes.apple.com/in/rss/customerreviews/page=3/id=1404871703/sortby=mostrecent/json"
        );
    }

    #[test]
    fn entry_maps_to_raw_fields() {
        let raw = entry_to_raw(&make_entry()).unwrap();
        assert_eq!(raw.first_str(&["review"]), Some("refunds take forever"));
        assert_eq!(raw.first_str(&["rating"]), Some("2"));
        assert_eq!(raw.first_str(&["title"]), Some("Disappointed"));
    }

    #[test]
    fn entry_timestamp_converted_to_utc() {
        let raw = entry_to_raw(&make_entry()).unwrap();
        // 09:00 at -07:00 is 16:00 UTC.
        assert_eq!(raw.first_str(&["date"]), Some("2024-03-01T16:00:00Z"));
    }

    #[test]
    fn entry_drops_reviewer_identity() {
        let raw = entry_to_raw(&make_entry()).unwrap();
        assert!(raw.first_str(&["author"]).is_none());
        assert!(!serde_json::to_string(&raw).unwrap().contains("Reviewer"));
    }

    #[test]
    fn entry_without_content_is_skipped() {
        let metadata = serde_json::json!({
            "im:name": {"label": "Groww"},
            "updated": {"label": "2024-03-01T09:00:00-07:00"},
        });
        assert!(entry_to_raw(&metadata).is_none());
    }

    #[test]
    fn unparseable_timestamp_leaves_date_absent() {
        let entry = serde_json::json!({
            "updated": {"label": "yesterday-ish"},
            "content": {"label": "fine"},
        });
        let raw = entry_to_raw(&entry).unwrap();
        assert!(raw.first_str(&["date"]).is_none());
    }

    #[test]
    fn feed_entries_handles_array_and_bare_object() {
        let page = serde_json::json!({"feed": {"entry": [make_entry(), make_entry()]}});
        assert_eq!(feed_entries(&page).len(), 2);

        let single = serde_json::json!({"feed": {"entry": make_entry()}});
        assert_eq!(feed_entries(&single).len(), 1);

        let empty = serde_json::json!({"feed": {}});
        assert!(feed_entries(&empty).is_empty());
    }

    #[tokio::test]
    async fn play_targets_are_refused() {
        let source = ItunesRssSource::new("in");
        let target = AppTarget {
            platform: Platform::GooglePlay,
            app_id: "com.example.app".to_string(),
        };
        let err = source.fetch(&target, 10).await;
        assert!(matches!(err, Err(SourceError::RequestFailed { .. })));
    }
}
