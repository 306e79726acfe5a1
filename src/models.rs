use serde::{Deserialize, Serialize};
use std::fmt;

/// A fetched message, reduced to what classification needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    /// Bare address with any display name stripped
    pub sender: String,
    /// Subject decoded from any RFC 2047 encoding
    pub subject: String,
    /// Label ids carried by the fetch, if the response included them
    pub labels: Option<Vec<String>>,
}

/// What the classifier knows about a message's category labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryLabels {
    /// The category rule is disabled, labels were never looked up
    NotRequired,
    Known(Vec<String>),
    /// The lookup failed; the category rule does not match
    Unavailable,
}

/// Why a message was flagged for trash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum TrashReason {
    NoReplySender,
    SubjectKeyword(String),
    Category(String),
}

impl fmt::Display for TrashReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrashReason::NoReplySender => write!(f, "no-reply sender"),
            TrashReason::SubjectKeyword(keyword) => write!(f, "subject keyword '{}'", keyword),
            TrashReason::Category(tag) => {
                let mut chars = tag.chars();
                let title: String = match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                };
                write!(f, "Gmail {} category", title)
            }
        }
    }
}

/// Outcome of classifying one message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Allowlisted,
    Trash(TrashReason),
    Keep,
}

impl Decision {
    pub fn is_trash(&self) -> bool {
        matches!(self, Decision::Trash(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allowlisted => write!(f, "BLOCKED (allowlisted)"),
            Decision::Trash(reason) => write!(f, "TRASH ({})", reason),
            Decision::Keep => write!(f, "KEEP"),
        }
    }
}

/// Counters for a single cleanup run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunStats {
    /// Messages fetched and classified
    pub total_checked: usize,
    /// Messages moved to trash, or that would be in dry-run mode
    pub total_trashed: usize,
    pub blocked_by_allowlist: usize,
    /// Candidates that could not be fetched or decoded
    pub skipped: usize,
    /// Trash calls that failed in live mode
    pub trash_failed: usize,
}
