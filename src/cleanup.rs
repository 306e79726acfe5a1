//! Cleanup run orchestration
//!
//! A run moves through `Init → Searching → Processing(i) → Trashing →
//! Summarized`. Only authentication, configuration, and search failures end a
//! run early; every per-message failure is logged, counted, and skipped.

use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classifier::MessageClassifier;
use crate::client::GmailClient;
use crate::config::Config;
use crate::error::{CleanupError, Result};
use crate::models::{CategoryLabels, Decision, Message, RunStats};
use crate::query::build_search_query;
use crate::report::{CleanupOutcome, CleanupReport, ItemOutcome};

/// Called once per processed candidate with `(position, total)`
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    Searching,
    /// Zero-based index of the candidate being processed
    Processing(usize),
    Trashing,
    Summarized,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Init => write!(f, "init"),
            RunPhase::Searching => write!(f, "searching"),
            RunPhase::Processing(i) => write!(f, "processing[{}]", i),
            RunPhase::Trashing => write!(f, "trashing"),
            RunPhase::Summarized => write!(f, "summarized"),
        }
    }
}

/// Run one cleanup pass against a mailbox
///
/// `dry_run` is decided by the caller (CLI flag or configuration). In dry-run
/// mode `trash_message` is never called and would-be-trashed messages are
/// counted in `total_trashed`.
pub async fn run_cleanup<C>(
    client: &C,
    config: &Config,
    dry_run: bool,
    on_progress: Option<ProgressCallback>,
) -> Result<CleanupReport>
where
    C: GmailClient + ?Sized,
{
    CleanupRun::new(client, config, dry_run, on_progress)
        .execute()
        .await
}

struct CleanupRun<'a, C: ?Sized> {
    client: &'a C,
    classifier: MessageClassifier,
    max_results: u32,
    dry_run: bool,
    on_progress: Option<ProgressCallback>,
    phase: RunPhase,
    stats: RunStats,
    items: Vec<ItemOutcome>,
}

impl<'a, C> CleanupRun<'a, C>
where
    C: GmailClient + ?Sized,
{
    fn new(
        client: &'a C,
        config: &Config,
        dry_run: bool,
        on_progress: Option<ProgressCallback>,
    ) -> Self {
        Self {
            client,
            classifier: MessageClassifier::from_config(config),
            max_results: config.execution.max_results_per_search,
            dry_run,
            on_progress,
            phase: RunPhase::Init,
            stats: RunStats::default(),
            items: Vec::new(),
        }
    }

    fn enter(&mut self, next: RunPhase) {
        debug!("Run phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    async fn execute(mut self) -> Result<CleanupReport> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!(
            "Starting cleanup run {} ({})",
            run_id,
            if self.dry_run { "dry run" } else { "live" }
        );

        let query = match build_search_query(self.classifier.rules()) {
            Some(query) => query,
            None => {
                info!("No rules are enabled. Nothing to clean up.");
                return Ok(self.finish(run_id, started_at, CleanupOutcome::NothingToDo, None));
            }
        };

        self.enter(RunPhase::Searching);
        info!("Search query: {}", query);
        let ids = self
            .client
            .search_message_ids(&query, self.max_results)
            .await
            .map_err(|e| match e {
                CleanupError::AuthError(_) => e,
                other => CleanupError::SearchError(other.to_string()),
            })?;

        if ids.is_empty() {
            info!("No unwanted emails found.");
            return Ok(self.finish(run_id, started_at, CleanupOutcome::NoCandidates, Some(query)));
        }
        info!("Found {} emails matching unwanted rules", ids.len());

        let total = ids.len();
        for (idx, id) in ids.iter().enumerate() {
            self.enter(RunPhase::Processing(idx));
            self.process(idx, id).await;
            if let Some(ref on_progress) = self.on_progress {
                on_progress(idx + 1, total);
            }
        }

        self.enter(RunPhase::Trashing);
        self.trash_flagged().await;

        Ok(self.finish(run_id, started_at, CleanupOutcome::Completed, Some(query)))
    }

    async fn process(&mut self, idx: usize, id: &str) {
        let message = match self.client.get_message(id).await {
            Ok(message) => message,
            Err(e) => {
                warn!("{}", CleanupError::item_fetch(id, &e));
                self.stats.skipped += 1;
                return;
            }
        };

        let labels = self.category_labels(&message).await;
        let decision = self.classifier.classify(&message, &labels);
        self.stats.total_checked += 1;

        match decision {
            Decision::Allowlisted => {
                self.stats.blocked_by_allowlist += 1;
                info!("[{}] {}: {}", idx + 1, decision, message.sender);
            }
            Decision::Trash(_) => {
                info!("[{}] {}: {}", idx + 1, decision, message.sender);
            }
            Decision::Keep => {
                debug!("[{}] {}: {}", idx + 1, decision, message.sender);
            }
        }
        debug!("[{}] Subject: {}", idx + 1, message.subject);

        self.items.push(ItemOutcome {
            id: message.id,
            sender: message.sender,
            subject: message.subject,
            decision,
            trashed: false,
        });
    }

    /// Resolve what the category rule can see for this message
    ///
    /// Labels from the full fetch are used when present. Otherwise a metadata
    /// lookup is made; if it fails the category rule cannot match.
    async fn category_labels(&self, message: &Message) -> CategoryLabels {
        if !self.classifier.needs_category_labels() {
            return CategoryLabels::NotRequired;
        }

        if let Some(ref labels) = message.labels {
            return CategoryLabels::Known(labels.clone());
        }

        match self.client.get_message_labels(&message.id).await {
            Ok(labels) => CategoryLabels::Known(labels),
            Err(e) => {
                warn!("{}", CleanupError::item_classify(&message.id, &e));
                CategoryLabels::Unavailable
            }
        }
    }

    async fn trash_flagged(&mut self) {
        let flagged = self.items.iter().filter(|i| i.decision.is_trash()).count();
        if flagged == 0 {
            info!("No emails needed to be trashed");
            return;
        }

        if self.dry_run {
            for item in self.items.iter_mut().filter(|i| i.decision.is_trash()) {
                item.trashed = true;
                self.stats.total_trashed += 1;
            }
            info!("[DRY RUN] Would trash {} emails (no action taken)", flagged);
            return;
        }

        info!("Moving {} emails to Trash...", flagged);
        for item in self.items.iter_mut().filter(|i| i.decision.is_trash()) {
            match self.client.trash_message(&item.id).await {
                Ok(()) => {
                    item.trashed = true;
                    self.stats.total_trashed += 1;
                }
                Err(e) => {
                    warn!("{} (sender {})", CleanupError::item_trash(&item.id, &e), item.sender);
                    self.stats.trash_failed += 1;
                }
            }
        }
        info!("Trashed {} of {} emails", self.stats.total_trashed, flagged);
    }

    fn finish(
        mut self,
        run_id: String,
        started_at: chrono::DateTime<Utc>,
        outcome: CleanupOutcome,
        query: Option<String>,
    ) -> CleanupReport {
        self.enter(RunPhase::Summarized);
        info!(
            "Run {} finished: checked={} trashed={} allowlisted={} skipped={} trash_failed={}",
            run_id,
            self.stats.total_checked,
            self.stats.total_trashed,
            self.stats.blocked_by_allowlist,
            self.stats.skipped,
            self.stats.trash_failed
        );

        CleanupReport {
            run_id,
            started_at,
            completed_at: Utc::now(),
            dry_run: self.dry_run,
            outcome,
            query,
            items: self.items,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_phase_display() {
        assert_eq!(RunPhase::Init.to_string(), "init");
        assert_eq!(RunPhase::Processing(3).to_string(), "processing[3]");
        assert_eq!(RunPhase::Summarized.to_string(), "summarized");
    }
}
