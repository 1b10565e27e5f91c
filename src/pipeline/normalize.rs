//! Raw-record normalization and admission filtering.
//!
//! Normalization maps a source-specific raw record into `CanonicalReview`:
//! first recognized timestamp field (strict format), body text flattened and
//! redacted, rating if convertible, title emptied by policy. A record with no
//! parseable timestamp is dropped silently and counted — one bad record never
//! fails a batch.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tracing::debug;

use crate::config::FilterOptions;
use crate::pipeline::types::{CanonicalReview, IngestStats, Platform, RawReview};
use crate::redact::Redactor;

/// Timestamp format raw records must carry. Sources converting from other
/// representations (RFC 3339 with offsets, native datetimes) emit this.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Convert one raw record into a canonical review.
///
/// Returns `None` when no recognized timestamp field parses; every other
/// defect degrades gracefully (missing body → empty text, unconvertible
/// rating → `None`).
pub fn normalize(
    raw: &RawReview,
    platform: Platform,
    app_id: &str,
    redactor: &Redactor,
) -> Option<CanonicalReview> {
    let date = parse_date(raw, platform)?;

    let body = raw.first_str(platform.text_fields()).unwrap_or_default();
    let text = redactor.redact(&body.replace('\n', " "));

    let rating = raw
        .first_number(platform.rating_fields())
        .map(|n| n as f32);

    Some(CanonicalReview {
        platform,
        app_id: app_id.to_string(),
        date,
        rating,
        title: String::new(),
        text,
    })
}

/// First recognized date field that parses with [`DATE_FORMAT`].
fn parse_date(raw: &RawReview, platform: Platform) -> Option<DateTime<Utc>> {
    platform.date_fields().iter().find_map(|&field| {
        let value = raw.first_str(&[field])?;
        NaiveDateTime::parse_from_str(value, DATE_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    })
}

/// Admission predicate over a canonical review.
///
/// A review is admitted when its date falls inside the lookback window AND it
/// is not short by BOTH measures: `words < min_words && chars < min_chars`
/// rejects, either count alone does not. Terse-but-dense reviews stay in.
pub fn admit(review: &CanonicalReview, now: DateTime<Utc>, opts: &FilterOptions) -> bool {
    let cutoff = now - Duration::weeks(opts.weeks_back);
    if review.date < cutoff {
        return false;
    }

    let short_by_words = review.word_count() < opts.min_words;
    let short_by_chars = review.char_count() < opts.min_chars;
    !(short_by_words && short_by_chars)
}

/// Normalize and filter a whole batch, preserving source order.
///
/// Individual failures are counted, never fatal.
pub fn normalize_batch(
    raws: &[RawReview],
    platform: Platform,
    app_id: &str,
    redactor: &Redactor,
    now: DateTime<Utc>,
    opts: &FilterOptions,
) -> (Vec<CanonicalReview>, IngestStats) {
    let mut stats = IngestStats {
        fetched: raws.len(),
        ..Default::default()
    };
    let mut admitted = Vec::with_capacity(raws.len());

    for raw in raws {
        let Some(review) = normalize(raw, platform, app_id, redactor) else {
            stats.dropped_malformed += 1;
            continue;
        };
        if !admit(&review, now, opts) {
            stats.dropped_by_filter += 1;
            continue;
        }
        admitted.push(review);
    }

    stats.admitted = admitted.len();
    debug!(
        fetched = stats.fetched,
        admitted = stats.admitted,
        dropped_malformed = stats.dropped_malformed,
        dropped_by_filter = stats.dropped_by_filter,
        "Normalized review batch"
    );
    (admitted, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_raw(fields: serde_json::Value) -> RawReview {
        RawReview::from(fields.as_object().unwrap().clone())
    }

    fn opts() -> FilterOptions {
        FilterOptions {
            weeks_back: 10,
            min_words: 10,
            min_chars: 20,
        }
    }

    fn days_ago(days: i64) -> String {
        (Utc::now() - Duration::days(days))
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string()
    }

    // ── Normalization tests ─────────────────────────────────────────

    #[test]
    fn normalizes_play_record() {
        let raw = make_raw(serde_json::json!({
            "at": "2024-03-05T10:30:00Z",
            "content": "app keeps crashing on startup",
            "score": 2,
            "userName": "Some Reviewer",
        }));
        let review = normalize(&raw, Platform::GooglePlay, "com.example.app", &Redactor::new())
            .unwrap();
        assert_eq!(review.platform, Platform::GooglePlay);
        assert_eq!(review.app_id, "com.example.app");
        assert_eq!(review.text, "app keeps crashing on startup");
        assert_eq!(review.rating, Some(2.0));
        assert_eq!(review.title, "");
        assert_eq!(review.date.to_string(), "2024-03-05 10:30:00 UTC");
    }

    #[test]
    fn normalizes_app_store_field_names() {
        let raw = make_raw(serde_json::json!({
            "date": "2024-03-05T10:30:00Z",
            "review": "clean and simple",
            "rating": "5",
        }));
        let review =
            normalize(&raw, Platform::AppStore, "1404871703", &Redactor::new()).unwrap();
        assert_eq!(review.text, "clean and simple");
        assert_eq!(review.rating, Some(5.0));
    }

    #[test]
    fn falls_back_to_second_date_field() {
        let raw = make_raw(serde_json::json!({
            "date": "2024-03-05T10:30:00Z",
            "content": "good",
        }));
        assert!(normalize(&raw, Platform::GooglePlay, "app", &Redactor::new()).is_some());
    }

    #[test]
    fn skips_record_without_parseable_date() {
        let redactor = Redactor::new();
        let missing = make_raw(serde_json::json!({"content": "no date here"}));
        assert!(normalize(&missing, Platform::GooglePlay, "app", &redactor).is_none());

        let malformed = make_raw(serde_json::json!({
            "at": "05/03/2024",
            "content": "wrong format",
        }));
        assert!(normalize(&malformed, Platform::GooglePlay, "app", &redactor).is_none());
    }

    #[test]
    fn missing_body_becomes_empty_text() {
        let raw = make_raw(serde_json::json!({"at": "2024-03-05T10:30:00Z"}));
        let review = normalize(&raw, Platform::GooglePlay, "app", &Redactor::new()).unwrap();
        assert_eq!(review.text, "");
        assert!(review.rating.is_none());
    }

    #[test]
    fn newlines_flattened_before_redaction() {
        let raw = make_raw(serde_json::json!({
            "at": "2024-03-05T10:30:00Z",
            "content": "line one\nline two\ncall 9876543210",
        }));
        let review = normalize(&raw, Platform::GooglePlay, "app", &Redactor::new()).unwrap();
        assert_eq!(review.text, "line one line two call [PHONE REDACTED]");
    }

    #[test]
    fn body_is_redacted() {
        let raw = make_raw(serde_json::json!({
            "at": "2024-03-05T10:30:00Z",
            "content": "refund to me@mail.com please - Anil",
        }));
        let review = normalize(&raw, Platform::GooglePlay, "app", &Redactor::new()).unwrap();
        assert_eq!(
            review.text,
            "refund to [EMAIL REDACTED] please [NAME REDACTED]"
        );
    }

    // ── Admission tests ─────────────────────────────────────────────

    fn canonical(date: DateTime<Utc>, text: &str) -> CanonicalReview {
        CanonicalReview {
            platform: Platform::GooglePlay,
            app_id: "app".into(),
            date,
            rating: Some(3.0),
            title: String::new(),
            text: text.into(),
        }
    }

    #[test]
    fn admits_recent_long_review() {
        let review = canonical(Utc::now() - Duration::weeks(2), "this review has plenty of words to pass every threshold easily");
        assert!(admit(&review, Utc::now(), &opts()));
    }

    #[test]
    fn rejects_stale_review() {
        let review = canonical(
            Utc::now() - Duration::weeks(20),
            "old but otherwise long enough review text with many words here",
        );
        assert!(!admit(&review, Utc::now(), &opts()));
    }

    #[test]
    fn boundary_date_is_admitted() {
        let now = Utc::now();
        let review = canonical(
            now - Duration::weeks(10) + Duration::seconds(5),
            "sits just inside the window with comfortably many words in it",
        );
        assert!(admit(&review, now, &opts()));
    }

    #[test]
    fn rejects_review_short_by_both_measures() {
        let review = canonical(Utc::now() - Duration::days(2), "ok");
        assert!(!admit(&review, Utc::now(), &opts()));
    }

    #[test]
    fn admits_few_words_when_chars_reach_threshold() {
        // 3 words (< 10) but 32 chars (>= 20): shortness needs both.
        let review = canonical(Utc::now() - Duration::days(2), "extraordinarily good application");
        assert!(admit(&review, Utc::now(), &opts()));
    }

    #[test]
    fn admits_many_words_when_chars_fall_short() {
        // 10 single-letter words (>= 10 words) but 19 chars (< 20).
        let review = canonical(Utc::now() - Duration::days(2), "a b c d e f g h i j");
        assert_eq!(review.word_count(), 10);
        assert_eq!(review.char_count(), 19);
        assert!(admit(&review, Utc::now(), &opts()));
    }

    // ── Batch tests ─────────────────────────────────────────────────

    #[test]
    fn batch_counts_each_drop_reason() {
        let raws = vec![
            make_raw(serde_json::json!({
                "at": days_ago(7),
                "content": "crashes a lot whenever the market opens in the morning",
            })),
            make_raw(serde_json::json!({"content": "no date at all"})),
            make_raw(serde_json::json!({"at": days_ago(140), "content": "far too old to be admitted into the window"})),
            make_raw(serde_json::json!({"at": days_ago(1), "content": "meh"})),
        ];
        let (admitted, stats) = normalize_batch(
            &raws,
            Platform::GooglePlay,
            "com.example.app",
            &Redactor::new(),
            Utc::now(),
            &opts(),
        );
        assert_eq!(stats.fetched, 4);
        assert_eq!(stats.admitted, 1);
        assert_eq!(stats.dropped_malformed, 1);
        assert_eq!(stats.dropped_by_filter, 2);
        assert_eq!(admitted.len(), 1);
        assert!(admitted[0].text.starts_with("crashes a lot"));
    }

    #[test]
    fn batch_preserves_source_order() {
        let raws: Vec<RawReview> = (0..3)
            .map(|i| {
                make_raw(serde_json::json!({
                    "at": days_ago(i + 1),
                    "content": format!("review number {i} with enough words to clear the length bar"),
                }))
            })
            .collect();
        let (admitted, _) = normalize_batch(
            &raws,
            Platform::GooglePlay,
            "app",
            &Redactor::new(),
            Utc::now(),
            &opts(),
        );
        let order: Vec<&str> = admitted
            .iter()
            .map(|r| r.text.split_whitespace().nth(2).unwrap())
            .collect();
        assert_eq!(order, vec!["0", "1", "2"]);
    }

    #[test]
    fn empty_batch_yields_empty_stats() {
        let (admitted, stats) = normalize_batch(
            &[],
            Platform::GooglePlay,
            "app",
            &Redactor::new(),
            Utc::now(),
            &opts(),
        );
        assert!(admitted.is_empty());
        assert_eq!(stats.fetched, 0);
        assert_eq!(stats.admitted, 0);
    }
}
