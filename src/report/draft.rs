//! Outbound email draft composition.
//!
//! The draft wraps the rendered digest in a fixed envelope. A missing report
//! produces a documented placeholder sentence in the body instead of a
//! failure, so drafting degrades visibly rather than crashing.

use serde::{Deserialize, Serialize};

/// Body placeholder used when the report artifact does not exist yet.
pub const MISSING_REPORT_PLACEHOLDER: &str =
    "(Weekly report not found. Please generate it first.)";

/// Subject used when a draft artifact lacks the `Subject:` first line.
const DEFAULT_SUBJECT: &str = "Review Pulse";

/// A composed outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

/// Compose the weekly email draft around `report_text`.
pub fn compose_draft(report_text: Option<&str>, app_id: &str, weeks_back: i64) -> EmailDraft {
    let report = report_text.unwrap_or(MISSING_REPORT_PLACEHOLDER);

    let subject = format!("Market pulse: {app_id} | Weekly User Feedback Analysis");

    let mut body = String::new();
    body.push_str("Hi Team,\n\n");
    body.push_str(&format!(
        "Attached is the weekly analysis of user feedback for the {app_id} Android app, \
         covering the last {weeks_back} weeks. This report synthesizes recent Play Store \
         reviews to highlight key themes, emerging pain points, and strategic opportunities \
         for product improvement.\n\n"
    ));
    body.push_str("Overview of Key Insights:\n");
    body.push_str(report);
    body.push_str("\n\n");
    body.push_str(
        "We recommend prioritizing the high-impact action items identified above to enhance \
         user satisfaction and retention in the coming sprint.\n\n",
    );
    body.push_str("Please let us know if you require further data segmentation or specific user verbatims.\n\n");
    body.push_str("Best regards,\nProduct Insights Team");

    EmailDraft { subject, body }
}

impl EmailDraft {
    /// On-disk artifact form: `Subject: <subject>\n\n<body>`.
    pub fn to_file_format(&self) -> String {
        format!("Subject: {}\n\n{}", self.subject, self.body)
    }

    /// Parse the artifact form back. Total: content without a `Subject:`
    /// first line becomes the body under a default subject.
    pub fn parse_file_format(content: &str) -> Self {
        if let Some(rest) = content.strip_prefix("Subject: ")
            && let Some(pos) = rest.find('\n')
        {
            return Self {
                subject: rest[..pos].trim().to_string(),
                body: rest[pos + 1..].trim_start().to_string(),
            };
        }
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            body: content.to_string(),
        }
    }
}
