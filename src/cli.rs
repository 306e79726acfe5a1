//! Command-line interface

use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth;
use crate::cleanup::{run_cleanup, ProgressCallback};
use crate::client::ProductionGmailClient;
use crate::config::Config;
use crate::error::Result;
use crate::report::{CleanupReport, ScheduledResponse};

#[derive(Parser, Debug)]
#[command(name = "gmail-cleanup")]
#[command(version = "0.1.0")]
#[command(about = "Move unwanted Gmail messages to Trash by rule, sparing allowlisted senders", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to OAuth2 credentials file
    #[arg(long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Path to token cache file
    #[arg(long, default_value = ".gmail-cleanup/token.json")]
    pub token_cache: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate with Gmail API
    Auth {
        /// Force re-authentication even if token exists
        #[arg(long)]
        force: bool,
    },

    /// Search, classify, and trash unwanted emails
    Run {
        /// Only report what would be trashed
        #[arg(long, conflicts_with = "execute")]
        dry_run: bool,

        /// Actually move matching emails to Trash
        #[arg(long)]
        execute: bool,

        /// Write a Markdown report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Non-interactive run that prints a JSON status payload
    Scheduled {
        /// Authorized-user secret file, used when GMAIL_AUTHORIZED_USER is unset
        #[arg(long)]
        authorized_user: Option<PathBuf>,
    },

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

/// Map the `--dry-run`/`--execute` flags to an explicit mode, if any
///
/// The flags are mutually exclusive at parse time. `None` means the configured
/// `execution.dry_run` applies.
pub fn dry_run_override(dry_run: bool, execute: bool) -> Option<bool> {
    if execute {
        Some(false)
    } else if dry_run {
        Some(true)
    } else {
        None
    }
}

/// Progress reporter using indicatif
pub struct ProgressReporter {
    multi: MultiProgress,
    spinner_style: ProgressStyle,
    bar_style: ProgressStyle,
}

impl ProgressReporter {
    pub fn with_multi_progress(multi: MultiProgress) -> Self {
        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed:>6}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");

        let bar_style = ProgressStyle::default_bar()
            .template("[{elapsed:>6}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");

        Self {
            multi,
            spinner_style,
            bar_style,
        }
    }

    pub fn multi_progress(&self) -> &MultiProgress {
        &self.multi
    }

    pub fn add_spinner(&self, msg: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(self.spinner_style.clone());
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn add_progress_bar(&self, len: u64, msg: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new(len));
        pb.set_style(self.bar_style.clone());
        pb.set_message(msg.to_string());
        pb
    }

    /// Finish a spinner and clear it from the multi-progress display
    pub fn finish_spinner(&self, pb: &ProgressBar, msg: &str) {
        pb.finish_and_clear();
        let _ = self.multi.println(format!("  ✓ {}", msg));
    }

    pub fn println(&self, msg: impl AsRef<str>) {
        let _ = self.multi.println(msg);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::with_multi_progress(MultiProgress::new())
    }
}

/// Interactive cleanup run: authenticate, process, print the summary
///
/// `dry_run_override` carries the `--dry-run`/`--execute` choice, `None`
/// falls back to the configuration.
pub async fn run_interactive(
    cli: &Cli,
    dry_run_override: Option<bool>,
    report_path: Option<&Path>,
    multi: MultiProgress,
) -> Result<CleanupReport> {
    let reporter = ProgressReporter::with_multi_progress(multi);

    let config_spinner = reporter.add_spinner("Loading configuration...");
    let config = Config::load(&cli.config).await?;
    reporter.finish_spinner(
        &config_spinner,
        &format!("Configuration loaded from {:?}", cli.config),
    );

    let dry_run = dry_run_override.unwrap_or(config.execution.dry_run);

    let auth_spinner = reporter.add_spinner("Authenticating with Gmail API...");
    let hub = auth::initialize_gmail_hub(&cli.credentials, &cli.token_cache).await?;
    reporter.finish_spinner(&auth_spinner, "Successfully authenticated with Gmail API");

    let client = ProductionGmailClient::new(hub);

    let rule = "=".repeat(70);
    reporter.println(&rule);
    reporter.println("EMAIL CLEANUP PROCESS STARTED");
    reporter.println(&rule);
    reporter.println(format!(
        "Dry Run Mode: {}",
        if dry_run {
            "YES (no emails will be trashed)"
        } else {
            "NO (emails will be moved to trash)"
        }
    ));

    let process_bar = reporter.add_progress_bar(0, "Processing emails...");
    let bar = process_bar.clone();
    let on_progress: ProgressCallback = Arc::new(move |position, total| {
        bar.set_length(total as u64);
        bar.set_position(position as u64);
    });

    let report = run_cleanup(&client, &config, dry_run, Some(on_progress)).await?;
    process_bar.finish_and_clear();

    for line in report.summary_lines() {
        reporter.println(line);
    }

    if let Some(path) = report_path {
        report.save(path).await?;
        info!("Report saved to {:?}", path);
        reporter.println(format!("Report saved to: {:?}", path));
    }

    if report.dry_run && report.stats.total_trashed > 0 {
        reporter.println("Dry run completed! Run with --execute to move these emails to Trash.");
    }

    Ok(report)
}

/// Unattended cleanup run
///
/// Never fails: every error is folded into a status 500 payload.
pub async fn run_scheduled(cli: &Cli, authorized_user: Option<&Path>) -> ScheduledResponse {
    match scheduled_report(cli, authorized_user).await {
        Ok(report) => ScheduledResponse::success(&report),
        Err(e) => {
            tracing::error!("Scheduled cleanup failed: {}", e);
            ScheduledResponse::failure(&e)
        }
    }
}

async fn scheduled_report(cli: &Cli, authorized_user: Option<&Path>) -> Result<CleanupReport> {
    let config = Config::load(&cli.config).await?;
    let user = auth::load_authorized_user(authorized_user).await?;
    let hub = auth::initialize_gmail_hub_from_authorized_user(user).await?;
    info!("Authenticated with Gmail API (scheduled)");

    let client = ProductionGmailClient::new(hub);
    run_cleanup(&client, &config, config.execution.dry_run, None).await
}
