//! Stage-gated pipeline controller.
//!
//! Five operator actions drive the stages INGEST → CATEGORIZE → REPORT →
//! DRAFT → SEND. Each action's entry precondition is the existence of the
//! previous stage's artifact; a missing precondition yields a typed error
//! report and the controller never runs the upstream stage implicitly.
//! Every action returns an [`ActionReport`]: what ran, how it went, which
//! actions are now runnable, and a small preview carrying counts and sample
//! fields — never raw payloads.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::{AppTarget, PipelineConfig};
use crate::error::{Error, SendError, StoreError, WorkflowError};
use crate::pipeline::classify::{Classifier, tag_reviews};
use crate::pipeline::normalize::normalize_batch;
use crate::pipeline::types::{CanonicalReview, TaggedReview};
use crate::redact::Redactor;
use crate::report::digest::{InsightTable, synthesize};
use crate::report::draft::{EmailDraft, compose_draft};
use crate::sender::OutboundSender;
use crate::source::ReviewSource;
use crate::store::{ArtifactKind, ArtifactStore};

// ── Actions ─────────────────────────────────────────────────────────

/// Operator-facing pipeline actions, named as they appear in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    #[serde(rename = "SCRAPE_REVIEWS")]
    ScrapeReviews,
    #[serde(rename = "CATEGORIZE_REVIEWS")]
    CategorizeReviews,
    #[serde(rename = "GENERATE_WEEKLY_NOTE")]
    GenerateWeeklyNote,
    #[serde(rename = "CREATE_EMAIL_DRAFT")]
    CreateEmailDraft,
    #[serde(rename = "SEND_EMAIL")]
    SendEmail,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ScrapeReviews => "SCRAPE_REVIEWS",
            Self::CategorizeReviews => "CATEGORIZE_REVIEWS",
            Self::GenerateWeeklyNote => "GENERATE_WEEKLY_NOTE",
            Self::CreateEmailDraft => "CREATE_EMAIL_DRAFT",
            Self::SendEmail => "SEND_EMAIL",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Action reports ──────────────────────────────────────────────────

/// Outcome carried by an action report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Error { message: String },
}

/// Result of running one action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    pub action_performed: Action,
    #[serde(flatten)]
    pub status: ActionStatus,
    /// Actions whose preconditions hold after this one, derived from which
    /// artifacts currently exist.
    pub next_available_actions: Vec<Action>,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub data_preview: serde_json::Value,
    pub run_id: Uuid,
}

impl ActionReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, ActionStatus::Success)
    }
}

// ── Pipeline ────────────────────────────────────────────────────────

/// Runs pipeline actions against injected collaborators.
pub struct Pipeline {
    config: PipelineConfig,
    redactor: Redactor,
    insights: InsightTable,
    source: Arc<dyn ReviewSource>,
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn ArtifactStore>,
    sender: Arc<dyn OutboundSender>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn ReviewSource>,
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn ArtifactStore>,
        sender: Arc<dyn OutboundSender>,
    ) -> Self {
        Self {
            config,
            redactor: Redactor::new(),
            insights: InsightTable::default_table(),
            source,
            classifier,
            store,
            sender,
        }
    }

    /// Actions currently runnable, from artifact existence alone.
    pub async fn available_actions(&self) -> Vec<Action> {
        let mut actions = vec![Action::ScrapeReviews];
        if self.store.exists(ArtifactKind::Filtered).await {
            actions.push(Action::CategorizeReviews);
        }
        if self.store.exists(ArtifactKind::Tagged).await {
            actions.push(Action::GenerateWeeklyNote);
            actions.push(Action::CreateEmailDraft);
        }
        if self.store.exists(ArtifactKind::Draft).await {
            actions.push(Action::SendEmail);
        }
        actions
    }

    // ── SCRAPE_REVIEWS ──────────────────────────────────────────────

    /// INGEST: fetch raw reviews, normalize and filter them, persist the
    /// filtered artifact.
    pub async fn scrape_reviews(&self, input: &str) -> ActionReport {
        match self.run_scrape(input).await {
            Ok(report) => report,
            Err(e) => self.report_failure(Action::ScrapeReviews, e).await,
        }
    }

    async fn run_scrape(&self, input: &str) -> Result<ActionReport, Error> {
        let target = AppTarget::parse(input)?;
        info!(
            app_id = %target.app_id,
            platform = %target.platform,
            source = self.source.name(),
            "Running SCRAPE_REVIEWS"
        );

        let raws = self.source.fetch(&target, self.config.fetch_count).await?;
        let (reviews, stats) = normalize_batch(
            &raws,
            target.platform,
            &target.app_id,
            &self.redactor,
            Utc::now(),
            &self.config.filter_options(),
        );

        let content = serde_json::to_string_pretty(&reviews).map_err(StoreError::from)?;
        self.store.write(ArtifactKind::Filtered, &content).await?;

        info!(
            admitted = stats.admitted,
            fetched = stats.fetched,
            "Filtered reviews artifact written"
        );
        Ok(self
            .report_success(
                Action::ScrapeReviews,
                json!({
                    "review_count": stats.admitted,
                    "app_id": target.app_id,
                    "fetched": stats.fetched,
                    "dropped_malformed": stats.dropped_malformed,
                    "dropped_by_filter": stats.dropped_by_filter,
                }),
            )
            .await)
    }

    // ── CATEGORIZE_REVIEWS ──────────────────────────────────────────

    /// CATEGORIZE: re-read the current filtered artifact, tag every review,
    /// fully overwrite the tagged artifact.
    pub async fn categorize_reviews(&self) -> ActionReport {
        match self.run_categorize().await {
            Ok(report) => report,
            Err(e) => self.report_failure(Action::CategorizeReviews, e).await,
        }
    }

    async fn run_categorize(&self) -> Result<ActionReport, Error> {
        self.require(ArtifactKind::Filtered, Action::ScrapeReviews)
            .await?;

        let content = self.store.read(ArtifactKind::Filtered).await?;
        let reviews: Vec<CanonicalReview> =
            serde_json::from_str(&content).map_err(StoreError::from)?;

        let tagged = tag_reviews(reviews, self.classifier.as_ref(), &self.config.themes).await;

        let content = serde_json::to_string_pretty(&tagged).map_err(StoreError::from)?;
        self.store.write(ArtifactKind::Tagged, &content).await?;

        // Distinct themes in first-appearance order, for the preview.
        let mut themes: Vec<&str> = Vec::new();
        for review in &tagged {
            if !themes.contains(&review.theme.as_str()) {
                themes.push(&review.theme);
            }
        }

        info!(
            tagged = tagged.len(),
            classifier = self.classifier.name(),
            "Tagged reviews artifact written"
        );
        Ok(self
            .report_success(
                Action::CategorizeReviews,
                json!({"themes": themes, "tagged_count": tagged.len()}),
            )
            .await)
    }

    // ── GENERATE_WEEKLY_NOTE ────────────────────────────────────────

    /// REPORT: rank themes over the tagged artifact, render the weekly
    /// digest, persist it. An empty tagged set is a no-data error and
    /// writes nothing.
    pub async fn generate_weekly_note(&self) -> ActionReport {
        match self.run_report().await {
            Ok(report) => report,
            Err(e) => self.report_failure(Action::GenerateWeeklyNote, e).await,
        }
    }

    async fn run_report(&self) -> Result<ActionReport, Error> {
        self.require(ArtifactKind::Tagged, Action::CategorizeReviews)
            .await?;

        let content = self.store.read(ArtifactKind::Tagged).await?;
        let tagged: Vec<TaggedReview> = serde_json::from_str(&content).map_err(StoreError::from)?;

        let digest = synthesize(
            &tagged,
            &self.insights,
            &self.config.app_id,
            self.config.top_themes,
        )
        .ok_or_else(|| WorkflowError::NoData("the tagged review set is empty".to_string()))?;

        let report = digest.render();
        self.store.write(ArtifactKind::Report, &report).await?;

        info!(themes = digest.entries.len(), "Weekly report artifact written");
        Ok(self
            .report_success(
                Action::GenerateWeeklyNote,
                json!({"report_preview": preview_text(&report, 500)}),
            )
            .await)
    }

    // ── CREATE_EMAIL_DRAFT ──────────────────────────────────────────

    /// DRAFT: wrap the weekly report in the outbound envelope and persist
    /// the draft. A missing report degrades to a placeholder body — DRAFT
    /// never runs REPORT implicitly.
    pub async fn create_email_draft(&self) -> ActionReport {
        match self.run_draft().await {
            Ok(report) => report,
            Err(e) => self.report_failure(Action::CreateEmailDraft, e).await,
        }
    }

    async fn run_draft(&self) -> Result<ActionReport, Error> {
        self.require(ArtifactKind::Tagged, Action::CategorizeReviews)
            .await?;

        let report = self.store.read(ArtifactKind::Report).await.ok();
        let draft = compose_draft(report.as_deref(), &self.config.app_id, self.config.weeks_back);

        self.store
            .write(ArtifactKind::Draft, &draft.to_file_format())
            .await?;

        info!(subject = %draft.subject, "Email draft artifact written");
        Ok(self
            .report_success(
                Action::CreateEmailDraft,
                json!({
                    "subject": draft.subject,
                    "body_preview": preview_text(&draft.body, 200),
                }),
            )
            .await)
    }

    // ── SEND_EMAIL ──────────────────────────────────────────────────

    /// SEND: deliver the persisted draft to `to`. Delivery failures are
    /// non-fatal — they are logged and reported, never retried here.
    pub async fn send_email(&self, to: &str) -> ActionReport {
        match self.run_send(to).await {
            Ok(report) => report,
            Err(e) => self.report_failure(Action::SendEmail, e).await,
        }
    }

    async fn run_send(&self, to: &str) -> Result<ActionReport, Error> {
        self.require(ArtifactKind::Draft, Action::CreateEmailDraft)
            .await?;

        let content = self.store.read(ArtifactKind::Draft).await?;
        let draft = EmailDraft::parse_file_format(&content);

        let outcome = self.sender.send(to, &draft.subject, &draft.body).await;
        self.log_send_outcome(to, &draft.subject, outcome.as_ref().err())
            .await;
        outcome?;

        Ok(self
            .report_success(
                Action::SendEmail,
                json!({"recipient": to, "status": "Sent"}),
            )
            .await)
    }

    /// Append the send outcome to the log. Pre-flight rejections (missing
    /// credentials, malformed recipient) never reach the log; only actual
    /// delivery attempts do.
    async fn log_send_outcome(&self, to: &str, subject: &str, error: Option<&SendError>) {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let line = match error {
            None => format!("{timestamp} | {to} | {subject} | SUCCESS"),
            Some(SendError::NotConfigured | SendError::InvalidRecipient) => return,
            Some(e) => format!("{timestamp} | {to} | {subject} | FAIL | {e}"),
        };
        if let Err(e) = self.store.append_send_log(&line).await {
            warn!("Failed to append send log: {e}");
        }
    }

    // ── Report construction ─────────────────────────────────────────

    async fn report_success(&self, action: Action, preview: serde_json::Value) -> ActionReport {
        ActionReport {
            action_performed: action,
            status: ActionStatus::Success,
            next_available_actions: self.available_actions().await,
            data_preview: preview,
            run_id: Uuid::new_v4(),
        }
    }

    async fn report_failure(&self, action: Action, error: Error) -> ActionReport {
        error!("{action} failed: {error}");
        ActionReport {
            action_performed: action,
            status: ActionStatus::Error {
                message: error.to_string(),
            },
            next_available_actions: self.available_actions().await,
            data_preview: serde_json::Value::Null,
            run_id: Uuid::new_v4(),
        }
    }

    async fn require(&self, kind: ArtifactKind, prior: Action) -> Result<(), Error> {
        if self.store.exists(kind).await {
            Ok(())
        } else {
            Err(WorkflowError::MissingArtifact {
                artifact: kind.name().to_string(),
                required_action: prior.to_string(),
            }
            .into())
        }
    }
}

/// First `limit` characters of `text` plus an ellipsis marker.
fn preview_text(text: &str, limit: usize) -> String {
    let mut preview: String = text.chars().take(limit).collect();
    preview.push_str("...");
    preview
}

// ── Tests ───────────────────────────────────────────────────────────
