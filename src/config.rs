//! Pipeline configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pipeline::types::Platform;

// ── Defaults ────────────────────────────────────────────────────────

const DEFAULT_APP_ID: &str = "com.nextbillion.groww";
const DEFAULT_COUNTRY: &str = "in";
const DEFAULT_FETCH_COUNT: usize = 500;
const DEFAULT_WEEKS_BACK: i64 = 10;
const DEFAULT_MIN_WORD_COUNT: usize = 10;
const DEFAULT_MIN_CHAR_COUNT: usize = 20;
const DEFAULT_TOP_THEMES: usize = 3;

// ── Theme set ───────────────────────────────────────────────────────

/// The fixed, ordered set of themes a review can be tagged with, plus the
/// designated fallback used when no rule matches (or a plugged-in classifier
/// returns a label outside the set).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSet {
    themes: Vec<String>,
    fallback: String,
}

impl ThemeSet {
    /// Build a theme set, validating that the fallback is a member.
    pub fn new(themes: Vec<String>, fallback: impl Into<String>) -> Result<Self, ConfigError> {
        let fallback = fallback.into();
        if !themes.iter().any(|t| t == &fallback) {
            return Err(ConfigError::FallbackNotInSet(fallback));
        }
        Ok(Self { themes, fallback })
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn contains(&self, theme: &str) -> bool {
        self.themes.iter().any(|t| t == theme)
    }

    /// Return `label` unchanged if it is a member, otherwise the fallback.
    pub fn clamp(&self, label: String) -> String {
        if self.contains(&label) {
            label
        } else {
            self.fallback.clone()
        }
    }
}

impl Default for ThemeSet {
    fn default() -> Self {
        // Fallback is a member by construction.
        Self {
            themes: vec![
                "App Performance & Bugs".to_string(),
                "Trading & Features".to_string(),
                "Customer Support".to_string(),
                "Pricing & Charges".to_string(),
                "User Experience".to_string(),
            ],
            fallback: "User Experience".to_string(),
        }
    }
}

// ── Filter options ──────────────────────────────────────────────────

/// Admission thresholds for the ingest filter.
#[derive(Debug, Clone, Copy)]
pub struct FilterOptions {
    /// Reviews older than this many weeks are dropped.
    pub weeks_back: i64,
    /// Word-count threshold for the shortness check.
    pub min_words: usize,
    /// Character-count threshold for the shortness check.
    pub min_chars: usize,
}

// ── Pipeline config ─────────────────────────────────────────────────

/// Immutable pipeline configuration, built once at startup and threaded
/// through every component.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// App identifier (Play package name or App Store numeric id).
    pub app_id: String,
    /// Storefront country code for RSS fetches.
    pub country: String,
    /// How many raw reviews to request per ingest.
    pub fetch_count: usize,
    /// Lookback window in weeks.
    pub weeks_back: i64,
    /// Word-count shortness threshold.
    pub min_word_count: usize,
    /// Character-count shortness threshold.
    pub min_char_count: usize,
    /// How many themes the digest ranks.
    pub top_themes: usize,
    /// Theme set reviews are classified into.
    pub themes: ThemeSet,
    /// Root directory for durable artifacts.
    pub base_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            fetch_count: DEFAULT_FETCH_COUNT,
            weeks_back: DEFAULT_WEEKS_BACK,
            min_word_count: DEFAULT_MIN_WORD_COUNT,
            min_char_count: DEFAULT_MIN_CHAR_COUNT,
            top_themes: DEFAULT_TOP_THEMES,
            themes: ThemeSet::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl PipelineConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
            std::env::var(name).ok().and_then(|s| s.parse().ok())
        }

        Self {
            app_id: std::env::var("REVIEW_APP_ID").unwrap_or(defaults.app_id),
            country: std::env::var("REVIEW_COUNTRY").unwrap_or(defaults.country),
            fetch_count: parse_var("REVIEW_FETCH_COUNT").unwrap_or(defaults.fetch_count),
            weeks_back: parse_var("REVIEW_WEEKS_BACK").unwrap_or(defaults.weeks_back),
            min_word_count: parse_var("REVIEW_MIN_WORDS").unwrap_or(defaults.min_word_count),
            min_char_count: parse_var("REVIEW_MIN_CHARS").unwrap_or(defaults.min_char_count),
            top_themes: parse_var("REVIEW_TOP_THEMES").unwrap_or(defaults.top_themes),
            themes: defaults.themes,
            base_dir: std::env::var("REVIEW_BASE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.base_dir),
        }
    }

    /// Admission thresholds derived from this config.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            weeks_back: self.weeks_back,
            min_words: self.min_word_count,
            min_chars: self.min_char_count,
        }
    }

    /// Short app handle used in artifact file names
    /// (`com.nextbillion.groww` → `groww`).
    pub fn app_slug(&self) -> String {
        self.app_id
            .rsplit('.')
            .next()
            .unwrap_or(&self.app_id)
            .to_lowercase()
    }

    /// Replace the target app, keeping everything else.
    pub fn with_target(mut self, target: &AppTarget) -> Self {
        self.app_id = target.app_id.clone();
        self
    }
}

// ── App target ──────────────────────────────────────────────────────

/// A resolved scrape target: which store, which app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppTarget {
    pub platform: Platform,
    pub app_id: String,
}

impl AppTarget {
    /// Parse a store URL or bare identifier.
    ///
    /// Accepted forms:
    /// - Play store URL with an `id=` query parameter
    /// - App Store URL with an `/id<digits>` path segment
    /// - bare numeric id (App Store)
    /// - bare package name containing a dot (Google Play)
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ConfigError::UnrecognizedTarget(input.to_string()));
        }

        if input.contains("play.google.com") {
            let app_id = input
                .split_once("id=")
                .map(|(_, rest)| rest.split('&').next().unwrap_or(rest))
                .filter(|id| !id.is_empty())
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "app_url".to_string(),
                    message: format!("no id= parameter in {input}"),
                })?;
            return Ok(Self {
                platform: Platform::GooglePlay,
                app_id: app_id.to_string(),
            });
        }

        if input.contains("apps.apple.com") || input.contains("itunes.apple.com") {
            let app_id = input
                .split("/id")
                .nth(1)
                .map(|rest| rest.chars().take_while(char::is_ascii_digit).collect())
                .filter(|id: &String| !id.is_empty())
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "app_url".to_string(),
                    message: format!("no /id<digits> segment in {input}"),
                })?;
            return Ok(Self {
                platform: Platform::AppStore,
                app_id,
            });
        }

        if input.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Self {
                platform: Platform::AppStore,
                app_id: input.to_string(),
            });
        }

        if input.contains('.') && !input.contains('/') && !input.contains(char::is_whitespace) {
            return Ok(Self {
                platform: Platform::GooglePlay,
                app_id: input.to_string(),
            });
        }

        Err(ConfigError::UnrecognizedTarget(input.to_string()))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
