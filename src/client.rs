//! Gmail API client with retry logic

use async_trait::async_trait;
use google_gmail1::api::Message as GmailMessage;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{GmailHub, MODIFY_SCOPE};
use crate::error::{CleanupError, Result};
use crate::headers;
use crate::models::Message;

/// Upper bound on any single backoff sleep, including server-requested ones
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// The mailbox capabilities a cleanup run consumes
///
/// Passed explicitly to the orchestrator so runs can be driven by a mock in tests.
#[async_trait]
pub trait GmailClient: Send + Sync {
    /// Search for message IDs matching a query, bounded to one page of `max_results`
    async fn search_message_ids(&self, query: &str, max_results: u32) -> Result<Vec<String>>;

    /// Fetch a message with decoded sender and subject
    async fn get_message(&self, id: &str) -> Result<Message>;

    /// Fetch only the label ids of a message (metadata lookup)
    async fn get_message_labels(&self, id: &str) -> Result<Vec<String>>;

    /// Move a message to trash
    async fn trash_message(&self, id: &str) -> Result<()>;
}

/// Production Gmail client with retry logic
///
/// Transient failures (rate limiting, 5xx, network) are retried with
/// exponential backoff; everything else is returned immediately.
pub struct ProductionGmailClient {
    hub: GmailHub,
    max_retries: u32,
}

impl ProductionGmailClient {
    /// Create a new production Gmail client
    pub fn new(hub: GmailHub) -> Self {
        Self {
            hub,
            max_retries: 3,
        }
    }

    /// Check if an error is retryable
    fn should_retry(error: &CleanupError) -> bool {
        error.is_transient()
    }

    /// Execute an async operation with exponential backoff retry
    async fn with_retry<T, F, Fut>(
        operation_name: &str,
        max_retries: u32,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut delay = Duration::from_secs(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if Self::should_retry(&e) && attempts <= max_retries => {
                    if let CleanupError::RateLimitExceeded { retry_after } = e {
                        delay = delay.max(Duration::from_secs(retry_after)).min(MAX_BACKOFF);
                    }
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                        operation_name,
                        attempts,
                        max_retries + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, MAX_BACKOFF);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Parse a Gmail API message into our Message structure
fn parse_message(msg: GmailMessage) -> Result<Message> {
    let id = msg
        .id
        .ok_or_else(|| CleanupError::InvalidMessageFormat("Missing message ID".to_string()))?;

    let part_headers = msg
        .payload
        .as_ref()
        .and_then(|p| p.headers.as_ref())
        .ok_or_else(|| CleanupError::InvalidMessageFormat("Missing headers".to_string()))?;

    let mut raw_from = "";
    let mut raw_subject = "";

    for header in part_headers {
        if let (Some(name), Some(value)) = (&header.name, &header.value) {
            match name.to_lowercase().as_str() {
                "from" => raw_from = value.as_str(),
                "subject" => raw_subject = value.as_str(),
                _ => {}
            }
        }
    }

    let sender = headers::decode_sender(raw_from)?;
    let subject = headers::decode_subject(raw_subject)?;

    Ok(Message {
        id,
        sender,
        subject,
        labels: msg.label_ids,
    })
}

#[async_trait]
impl GmailClient for ProductionGmailClient {
    async fn search_message_ids(&self, query: &str, max_results: u32) -> Result<Vec<String>> {
        Self::with_retry("search_message_ids", self.max_retries, || async {
            let (_, response) = self
                .hub
                .users()
                .messages_list("me")
                .q(query)
                .max_results(max_results)
                .add_scope(MODIFY_SCOPE)
                .doit()
                .await?;

            let ids: Vec<String> = response
                .messages
                .unwrap_or_default()
                .into_iter()
                .filter_map(|m| m.id)
                .collect();

            if response.next_page_token.is_some() {
                debug!(
                    "More than {} messages match; only the first page is processed",
                    max_results
                );
            }

            Ok(ids)
        })
        .await
    }

    async fn get_message(&self, id: &str) -> Result<Message> {
        let msg = Self::with_retry("get_message", self.max_retries, || async {
            let (_, msg) = self
                .hub
                .users()
                .messages_get("me", id)
                .format("full")
                .add_scope(MODIFY_SCOPE)
                .doit()
                .await?;
            Ok(msg)
        })
        .await?;

        parse_message(msg)
    }

    async fn get_message_labels(&self, id: &str) -> Result<Vec<String>> {
        Self::with_retry("get_message_labels", self.max_retries, || async {
            let (_, msg) = self
                .hub
                .users()
                .messages_get("me", id)
                .format("metadata")
                .add_scope(MODIFY_SCOPE)
                .doit()
                .await?;
            Ok(msg.label_ids.unwrap_or_default())
        })
        .await
    }

    async fn trash_message(&self, id: &str) -> Result<()> {
        Self::with_retry("trash_message", self.max_retries, || async {
            self.hub
                .users()
                .messages_trash("me", id)
                .add_scope(MODIFY_SCOPE)
                .doit()
                .await?;
            Ok(())
        })
        .await
    }
}
