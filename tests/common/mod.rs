//! Common test utilities and fixtures

#![allow(dead_code)]

use gmail_cleanup::client::GmailClient;
use gmail_cleanup::config::{AllowlistConfig, Config, RuleConfig};
use gmail_cleanup::error::{CleanupError, Result};
use gmail_cleanup::models::Message;
use mockall::mock;
use std::collections::HashMap;

// Mock implementation of GmailClient for testing
mock! {
    pub GmailClient {}

    #[async_trait::async_trait]
    impl GmailClient for GmailClient {
        async fn search_message_ids(&self, query: &str, max_results: u32) -> Result<Vec<String>>;
        async fn get_message(&self, id: &str) -> Result<Message>;
        async fn get_message_labels(&self, id: &str) -> Result<Vec<String>>;
        async fn trash_message(&self, id: &str) -> Result<()>;
    }
}

/// Create a test message without label ids
pub fn create_test_message(id: &str, sender: &str, subject: &str) -> Message {
    Message {
        id: id.to_string(),
        sender: sender.to_string(),
        subject: subject.to_string(),
        labels: None,
    }
}

/// Create a test message whose fetch carried label ids
pub fn create_labeled_message(id: &str, sender: &str, subject: &str, labels: &[&str]) -> Message {
    Message {
        labels: Some(labels.iter().map(|l| l.to_string()).collect()),
        ..create_test_message(id, sender, subject)
    }
}

/// Build a config from rule toggles and allowlisted sender fragments
pub fn create_test_config(
    no_reply: bool,
    keywords: &[&str],
    category: bool,
    allowlisted_senders: &[&str],
) -> Config {
    let mut rules = RuleConfig::disabled();
    rules.no_reply.enabled = no_reply;
    rules.keywords.enabled = !keywords.is_empty();
    rules.keywords.list = keywords.iter().map(|k| k.to_string()).collect();
    rules.category.enabled = category;

    Config {
        rules,
        allowlist: AllowlistConfig {
            senders: allowlisted_senders.iter().map(|s| s.to_string()).collect(),
            domains: Vec::new(),
        },
        ..Config::default()
    }
}

/// Mock mailbox whose search returns every message once and whose fetches
/// serve them by id
///
/// Trash and label lookups are left unconfigured so each test states exactly
/// which mutating calls it expects.
pub fn mock_mailbox(messages: Vec<Message>) -> MockGmailClient {
    let mut mock = MockGmailClient::new();

    let ids: Vec<String> = messages.iter().map(|m| m.id.clone()).collect();
    mock.expect_search_message_ids()
        .times(1)
        .returning(move |_, _| Ok(ids.clone()));

    let by_id: HashMap<String, Message> =
        messages.into_iter().map(|m| (m.id.clone(), m)).collect();
    mock.expect_get_message().returning(move |id| {
        by_id
            .get(id)
            .cloned()
            .ok_or_else(|| CleanupError::MessageNotFound(id.to_string()))
    });

    mock
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_message() {
        let message = create_test_message("m1", "a@b.com", "hello");
        assert_eq!(message.id, "m1");
        assert_eq!(message.labels, None);
    }

    #[test]
    fn test_create_test_config() {
        let config = create_test_config(true, &["newsletter"], false, &["acme"]);
        assert!(config.rules.no_reply.enabled);
        assert!(config.rules.keywords.enabled);
        assert!(!config.rules.category.enabled);
        assert_eq!(config.allowlist.senders, vec!["acme".to_string()]);
        assert!(config.validate().is_ok());
    }
}
