//! Run reports: console summary, Markdown file, and scheduled-run payload

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::models::{Decision, RunStats};

/// How a run ended when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// No rule enabled, no search was issued
    NothingToDo,
    /// The search matched nothing
    NoCandidates,
    Completed,
}

impl fmt::Display for CleanupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupOutcome::NothingToDo => write!(f, "No rules are enabled. Nothing to clean up."),
            CleanupOutcome::NoCandidates => write!(f, "No unwanted emails found."),
            CleanupOutcome::Completed => write!(f, "Cleanup completed"),
        }
    }
}

/// What happened to one classified message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub id: String,
    pub sender: String,
    pub subject: String,
    pub decision: Decision,
    /// Moved to trash, or would have been in dry-run mode
    pub trashed: bool,
}

/// Full record of a cleanup run
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub dry_run: bool,
    pub outcome: CleanupOutcome,
    pub query: Option<String>,
    pub items: Vec<ItemOutcome>,
    pub stats: RunStats,
}

impl CleanupReport {
    pub fn duration_seconds(&self) -> i64 {
        (self.completed_at - self.started_at).num_seconds()
    }

    /// Console summary block printed at the end of an interactive run
    pub fn summary_lines(&self) -> Vec<String> {
        let rule = "=".repeat(70);
        let mut lines = vec![
            rule.clone(),
            "SUMMARY".to_string(),
            rule.clone(),
            format!("Total emails checked: {}", self.stats.total_checked),
            format!("Allowlisted (protected): {}", self.stats.blocked_by_allowlist),
        ];

        if self.dry_run {
            lines.push(format!("Would move to Trash: {}", self.stats.total_trashed));
        } else {
            lines.push(format!("Moved to Trash: {}", self.stats.total_trashed));
        }
        if self.stats.skipped > 0 {
            lines.push(format!("Skipped (fetch errors): {}", self.stats.skipped));
        }
        if self.stats.trash_failed > 0 {
            lines.push(format!("Failed to trash: {}", self.stats.trash_failed));
        }
        lines.push(rule);
        lines
    }

    /// Generate Markdown report
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        if self.dry_run {
            md.push_str("# Email Cleanup Report (DRY RUN)\n\n");
            md.push_str("> **DRY RUN MODE** - No emails were moved to Trash. This report shows what WOULD happen.\n\n");
        } else {
            md.push_str("# Email Cleanup Report\n\n");
        }
        md.push_str(&format!(
            "Generated: {}\n\n",
            self.completed_at.format("%Y-%m-%d %H:%M:%S")
        ));

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- **Run ID:** {}\n", self.run_id));
        md.push_str(&format!("- **Outcome:** {}\n", self.outcome));
        if let Some(ref query) = self.query {
            md.push_str(&format!("- **Search query:** `{}`\n", query));
        }
        md.push_str(&format!(
            "- **Processing time:** {} minutes {} seconds\n",
            self.duration_seconds() / 60,
            self.duration_seconds() % 60
        ));
        md.push_str(&format!("- **Emails checked:** {}\n", self.stats.total_checked));
        md.push_str(&format!(
            "- **Allowlisted (protected):** {}\n",
            self.stats.blocked_by_allowlist
        ));
        let trashed_label = if self.dry_run { "Would move to Trash" } else { "Moved to Trash" };
        md.push_str(&format!("- **{}:** {}\n", trashed_label, self.stats.total_trashed));
        if self.stats.skipped > 0 {
            md.push_str(&format!("- **Skipped:** {}\n", self.stats.skipped));
        }
        if self.stats.trash_failed > 0 {
            md.push_str(&format!("- **Failed to trash:** {}\n", self.stats.trash_failed));
        }
        md.push('\n');

        if !self.items.is_empty() {
            md.push_str("## Messages\n\n");
            md.push_str("| # | Decision | Sender | Subject |\n");
            md.push_str("|---|----------|--------|---------|\n");
            for (idx, item) in self.items.iter().enumerate() {
                let decision = if item.decision.is_trash() && !item.trashed && !self.dry_run {
                    format!("{} (failed)", item.decision)
                } else {
                    item.decision.to_string()
                };
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    idx + 1,
                    escape_cell(&decision),
                    escape_cell(&item.sender),
                    escape_cell(&truncate(&item.subject, 60)),
                ));
            }
            md.push('\n');
        }

        if self.dry_run {
            md.push_str("---\n\n");
            md.push_str("_To apply these changes, run again with `--execute`._\n");
        }

        md
    }

    /// Save report to file
    pub async fn save(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, self.to_markdown()).await?;
        Ok(())
    }
}

/// Truncate to `max_len` characters, UTF-8 safe
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len.saturating_sub(3)).collect::<String>())
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Body of the scheduled-run payload
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RunStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Machine-readable result of a scheduled run
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ScheduledBody,
}

impl ScheduledResponse {
    pub fn success(report: &CleanupReport) -> Self {
        let message = match report.outcome {
            CleanupOutcome::Completed => "Email cleanup completed".to_string(),
            outcome => outcome.to_string(),
        };

        Self {
            status_code: 200,
            body: ScheduledBody {
                message,
                run_id: Some(report.run_id.clone()),
                dry_run: Some(report.dry_run),
                stats: Some(report.stats),
                error: None,
            },
        }
    }

    pub fn failure(error: &dyn fmt::Display) -> Self {
        Self {
            status_code: 500,
            body: ScheduledBody {
                message: "Error during email cleanup".to_string(),
                run_id: None,
                dry_run: None,
                stats: None,
                error: Some(error.to_string()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CleanupError;
    use crate::models::TrashReason;

    fn item(id: &str, sender: &str, subject: &str, decision: Decision, trashed: bool) -> ItemOutcome {
        ItemOutcome {
            id: id.to_string(),
            sender: sender.to_string(),
            subject: subject.to_string(),
            decision,
            trashed,
        }
    }

    fn report(dry_run: bool) -> CleanupReport {
        let started_at = Utc::now();
        CleanupReport {
            run_id: "run-1".to_string(),
            started_at,
            completed_at: started_at + chrono::Duration::seconds(75),
            dry_run,
            outcome: CleanupOutcome::Completed,
            query: Some("from:no-reply@ OR (subject:newsletter)".to_string()),
            items: vec![
                item("m1", "no-reply@x.com", "hi", Decision::Trash(TrashReason::NoReplySender), true),
                item("m2", "news@acme.com", "newsletter | weekly", Decision::Allowlisted, false),
            ],
            stats: RunStats {
                total_checked: 2,
                total_trashed: 1,
                blocked_by_allowlist: 1,
                ..RunStats::default()
            },
        }
    }

    #[test]
    fn test_summary_lines() {
        let lines = report(false).summary_lines();
        assert!(lines.contains(&"Total emails checked: 2".to_string()));
        assert!(lines.contains(&"Allowlisted (protected): 1".to_string()));
        assert!(lines.contains(&"Moved to Trash: 1".to_string()));

        let lines = report(true).summary_lines();
        assert!(lines.contains(&"Would move to Trash: 1".to_string()));
    }

    #[test]
    fn test_markdown_dry_run() {
        let md = report(true).to_markdown();
        assert!(md.contains("(DRY RUN)"));
        assert!(md.contains("**Run ID:** run-1"));
        assert!(md.contains("1 minutes 15 seconds"));
        assert!(md.contains("TRASH (no-reply sender)"));
        assert!(md.contains("newsletter \\| weekly"));
        assert!(md.contains("--execute"));
    }

    #[test]
    fn test_markdown_marks_failed_trash() {
        let mut report = report(false);
        report.items[0].trashed = false;
        report.stats.total_trashed = 0;
        report.stats.trash_failed = 1;

        let md = report.to_markdown();
        assert!(md.contains("TRASH (no-reply sender) (failed)"));
        assert!(md.contains("**Failed to trash:** 1"));
        assert!(!md.contains("DRY RUN"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 60), "short");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }

    #[test]
    fn test_scheduled_success_payload() {
        let response = ScheduledResponse::success(&report(false));
        assert!(response.is_success());

        let json: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["body"]["message"], "Email cleanup completed");
        assert_eq!(json["body"]["stats"]["total_checked"], 2);
        assert_eq!(json["body"]["stats"]["total_trashed"], 1);
        assert_eq!(json["body"]["stats"]["blocked_by_allowlist"], 1);
        assert!(json["body"].get("error").is_none());
    }

    #[test]
    fn test_scheduled_nothing_to_do_is_success() {
        let mut report = report(true);
        report.outcome = CleanupOutcome::NothingToDo;
        report.query = None;
        report.items.clear();
        report.stats = RunStats::default();

        let response = ScheduledResponse::success(&report);
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body.stats, Some(RunStats::default()));
    }

    #[test]
    fn test_scheduled_failure_payload() {
        let error = CleanupError::SearchError("HTTP 500".to_string());
        let response = ScheduledResponse::failure(&error);
        assert!(!response.is_success());

        let json: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
        assert_eq!(json["statusCode"], 500);
        assert_eq!(json["body"]["error"], "Search failed: HTTP 500");
        assert!(json["body"].get("stats").is_none());
    }
}
