use anyhow::Result;
use clap::Parser;
use gmail_cleanup::auth::{self, MODIFY_SCOPE};
use gmail_cleanup::cli::{self, Cli, Commands};
use gmail_cleanup::config::Config;
use gmail_cleanup::error::CleanupError;
use indicatif::MultiProgress;
use std::io::Write;
use std::process;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// A writer that prints through MultiProgress to avoid progress bar conflicts
#[derive(Clone)]
struct MultiProgressWriter {
    multi: Arc<MultiProgress>,
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MultiProgressWriter {
    fn new(multi: Arc<MultiProgress>) -> Self {
        Self {
            multi,
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Write for MultiProgressWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut buffer = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut buffer = self.buffer.lock().unwrap_or_else(|p| p.into_inner());
        if !buffer.is_empty() {
            let msg = String::from_utf8_lossy(&buffer);
            let msg = msg.trim_end_matches('\n');
            if !msg.is_empty() {
                let _ = self.multi.println(msg);
            }
            buffer.clear();
        }
        Ok(())
    }
}

impl Drop for MultiProgressWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// MakeWriter implementation for tracing
#[derive(Clone)]
struct MultiProgressMakeWriter {
    multi: Arc<MultiProgress>,
}

impl MultiProgressMakeWriter {
    fn new(multi: Arc<MultiProgress>) -> Self {
        Self { multi }
    }
}

impl<'a> MakeWriter<'a> for MultiProgressMakeWriter {
    type Writer = MultiProgressWriter;

    fn make_writer(&'a self) -> Self::Writer {
        MultiProgressWriter::new(Arc::clone(&self.multi))
    }
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            display_error(&e);
            eprintln!("\nFor help, run: gmail-cleanup --help");
            process::exit(1);
        }
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        "gmail_cleanup=debug,warn"
    } else {
        "gmail_cleanup=info,warn"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Returns the process exit code
async fn run() -> Result<i32> {
    // On Windows, ring avoids the NASM/CMake toolchain aws-lc-rs needs
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let multi_progress = Arc::new(MultiProgress::new());
    if matches!(cli.command, Commands::Scheduled { .. }) {
        // Keep stdout for the payload; log JSON lines to stderr
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter(cli.verbose))
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter(cli.verbose))
            .with_writer(MultiProgressMakeWriter::new(Arc::clone(&multi_progress)))
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }

    match cli.command {
        Commands::Auth { force } => {
            tracing::info!("Authenticating with Gmail API...");

            if let Some(parent) = cli.token_cache.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            if force && cli.token_cache.exists() {
                tokio::fs::remove_file(&cli.token_cache).await?;
                tracing::info!("Removed existing token cache");
            }

            let hub = auth::initialize_gmail_hub(&cli.credentials, &cli.token_cache).await?;

            println!("✓ Successfully authenticated with Gmail API");
            println!("Token cached at: {:?}", cli.token_cache);

            let (_, profile) = hub
                .users()
                .get_profile("me")
                .add_scope(MODIFY_SCOPE)
                .doit()
                .await
                .map_err(CleanupError::from)?;
            println!(
                "Connected to account: {}",
                profile.email_address.unwrap_or_default()
            );

            Ok(0)
        }

        Commands::Run {
            dry_run,
            execute,
            ref report,
        } => {
            if let Some(parent) = cli.token_cache.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            cli::run_interactive(
                &cli,
                cli::dry_run_override(dry_run, execute),
                report.as_deref(),
                (*multi_progress).clone(),
            )
            .await?;

            Ok(0)
        }

        Commands::Scheduled {
            ref authorized_user,
        } => {
            let response = cli::run_scheduled(&cli, authorized_user.as_deref()).await;
            println!("{}", response.to_json()?);
            Ok(if response.is_success() { 0 } else { 1 })
        }

        Commands::InitConfig { ref output, force } => {
            tracing::info!("Generating example configuration file");

            if output.exists() && !force {
                return Err(CleanupError::ConfigError(format!(
                    "Configuration file already exists at {:?}. Use --force to overwrite.",
                    output
                ))
                .into());
            }

            Config::create_example(output).await?;

            println!("Created example configuration file at: {:?}", output);
            println!("\nPlease edit this file to customize your settings.");
            println!("Key settings to review:");
            println!("  - rules.*.enabled: Which cleanup rules apply");
            println!("  - rules.keywords.list: Subject keywords that mark unwanted mail");
            println!("  - allowlist.senders / allowlist.domains: Senders that are never trashed");
            println!("  - execution.dry_run: Set to false to trash without --execute");

            Ok(0)
        }
    }
}

/// Display error with context
fn display_error(error: &anyhow::Error) {
    eprintln!("Error: {}", error);

    for cause in error.chain().skip(1) {
        eprintln!("  Caused by: {}", cause);
    }

    if let Some(cleanup_err) = error.downcast_ref::<CleanupError>() {
        match cleanup_err {
            CleanupError::AuthError(_) => {
                eprintln!("\nHint: Make sure your credentials.json file is valid.");
                eprintln!("      You can download it from Google Cloud Console.");
                eprintln!("      Try running: gmail-cleanup auth --force");
            }
            CleanupError::SearchError(_) | CleanupError::ApiError(_) => {
                eprintln!("\nHint: This may be a temporary API error.");
                eprintln!("      Try running the command again.");
            }
            CleanupError::RateLimitExceeded { .. } => {
                eprintln!("\nHint: You've hit Gmail API rate limits.");
                eprintln!("      Wait a few seconds and try again.");
            }
            CleanupError::ConfigError(_) => {
                eprintln!("\nHint: Check your configuration file for errors.");
                eprintln!("      Run: gmail-cleanup init-config --force");
            }
            _ => {}
        }
    }
}
