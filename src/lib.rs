//! Gmail Cleanup
//!
//! Finds unwanted messages in a Gmail mailbox by rule and moves them to Trash,
//! while never touching allowlisted senders or domains.
//!
//! # Overview
//!
//! - **Rules**: no-reply senders, subject keywords, and Gmail category tags,
//!   each independently toggleable and evaluated in a fixed priority order
//! - **Allowlist**: sender fragments and domains that override every rule
//! - **Dry run**: classify and report without calling the trash endpoint
//! - **Scheduled runs**: non-interactive credentials and a JSON status payload
//!
//! # Example Usage
//!
//! ```no_run
//! use gmail_cleanup::{auth, cleanup::run_cleanup, client::ProductionGmailClient, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!
//!     let hub = auth::initialize_gmail_hub(
//!         "credentials.json".as_ref(),
//!         ".gmail-cleanup/token.json".as_ref()
//!     ).await?;
//!     let client = ProductionGmailClient::new(hub);
//!
//!     let report = run_cleanup(&client, &config, true, None).await?;
//!     for line in report.summary_lines() {
//!         println!("{}", line);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`allowlist`] - Protected sender and domain matching
//! - [`auth`] - OAuth2 authentication and Gmail API initialization
//! - [`classifier`] - Rule evaluation with allowlist precedence
//! - [`cleanup`] - Run orchestration
//! - [`cli`] - Command-line interface
//! - [`client`] - Gmail API client with retry logic
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result aliases
//! - [`headers`] - Sender and subject header decoding
//! - [`models`] - Core data structures
//! - [`query`] - Gmail search query construction
//! - [`report`] - Console, Markdown, and scheduled-run reports

pub mod allowlist;
pub mod auth;
pub mod classifier;
pub mod cleanup;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod models;
pub mod query;
pub mod report;

// Re-export commonly used types for convenience
pub use error::{CleanupError, Result};

// Core data models
pub use models::{CategoryLabels, Decision, Message, RunStats, TrashReason};

pub use allowlist::{Allowlist, AllowlistMatch};
pub use classifier::{classify, MessageClassifier};
pub use query::build_search_query;

// Config types
pub use config::{AllowlistConfig, Config, ExecutionConfig, RuleConfig};

// Client traits
pub use client::{GmailClient, ProductionGmailClient};

// Orchestration and reporting
pub use cleanup::{run_cleanup, ProgressCallback, RunPhase};
pub use report::{CleanupOutcome, CleanupReport, ItemOutcome, ScheduledResponse};

// CLI types (for binary usage)
pub use cli::{Cli, Commands, ProgressReporter};
