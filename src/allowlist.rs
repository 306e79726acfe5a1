//! Protected senders and domains
//!
//! Allowlist entries override every cleanup rule. Sender fragments match as a
//! case-insensitive substring in either direction; domains match as an
//! `@domain` suffix. Blank entries are dropped when the allowlist is built so
//! they can never match every sender.

use crate::config::AllowlistConfig;

/// Which allowlist entry protected a sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowlistMatch {
    Sender(String),
    Domain(String),
}

/// Normalized, ready-to-match allowlist
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    /// Lowercased, non-empty sender fragments
    senders: Vec<String>,
    /// Lowercased `@domain` suffixes
    domain_suffixes: Vec<String>,
}

impl Allowlist {
    /// Create an empty allowlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration, normalizing case and skipping blank entries
    pub fn from_config(config: &AllowlistConfig) -> Self {
        let senders = config
            .senders
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let domain_suffixes = config
            .domains
            .iter()
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .filter(|d| !d.is_empty())
            .map(|d| format!("@{}", d))
            .collect();

        Self {
            senders,
            domain_suffixes,
        }
    }

    /// Find the entry protecting this sender, if any
    pub fn find_match(&self, sender: &str) -> Option<AllowlistMatch> {
        let sender = sender.trim().to_lowercase();
        if sender.is_empty() {
            return None;
        }

        if let Some(fragment) = self
            .senders
            .iter()
            .find(|allowed| sender.contains(allowed.as_str()) || allowed.contains(&sender))
        {
            return Some(AllowlistMatch::Sender(fragment.clone()));
        }

        self.domain_suffixes
            .iter()
            .find(|suffix| sender.ends_with(suffix.as_str()))
            .map(|suffix| AllowlistMatch::Domain(suffix.trim_start_matches('@').to_string()))
    }

    /// Check if a sender is protected
    pub fn is_allowlisted(&self, sender: &str) -> bool {
        self.find_match(sender).is_some()
    }

    /// Get the number of usable entries
    pub fn len(&self) -> usize {
        self.senders.len() + self.domain_suffixes.len()
    }

    /// Check if there are no usable entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
