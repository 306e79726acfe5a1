//! Rule-based trash classification with allowlist precedence

use crate::allowlist::Allowlist;
use crate::config::{Config, RuleConfig};
use crate::models::{CategoryLabels, Decision, Message, TrashReason};

/// Classify one message
///
/// The allowlist is checked first and short-circuits every rule. Rules are
/// then tried in fixed priority order (no-reply sender, subject keyword,
/// category) and the first match is reported.
pub fn classify(
    sender: &str,
    subject: &str,
    labels: &CategoryLabels,
    allowlist: &Allowlist,
    rules: &RuleConfig,
) -> Decision {
    if allowlist.is_allowlisted(sender) {
        return Decision::Allowlisted;
    }

    if let Some(reason) = match_no_reply(sender, rules)
        .or_else(|| match_subject_keyword(subject, rules))
        .or_else(|| match_category(labels, rules))
    {
        return Decision::Trash(reason);
    }

    Decision::Keep
}

fn match_no_reply(sender: &str, rules: &RuleConfig) -> Option<TrashReason> {
    if !rules.no_reply.enabled {
        return None;
    }

    let pattern = rules.no_reply.pattern.trim().to_lowercase();
    if pattern.is_empty() || sender.is_empty() {
        return None;
    }

    sender
        .to_lowercase()
        .contains(&pattern)
        .then_some(TrashReason::NoReplySender)
}

fn match_subject_keyword(subject: &str, rules: &RuleConfig) -> Option<TrashReason> {
    if !rules.keywords.enabled || subject.is_empty() {
        return None;
    }

    let subject_lower = subject.to_lowercase();
    rules
        .keywords
        .list
        .iter()
        .filter(|k| !k.trim().is_empty())
        .find(|k| subject_lower.contains(&k.to_lowercase()))
        .map(|k| TrashReason::SubjectKeyword(k.clone()))
}

fn match_category(labels: &CategoryLabels, rules: &RuleConfig) -> Option<TrashReason> {
    if !rules.category.enabled {
        return None;
    }

    match labels {
        CategoryLabels::Known(labels) => {
            let label_id = rules.category.label_id();
            labels
                .iter()
                .any(|l| l.eq_ignore_ascii_case(&label_id))
                .then(|| TrashReason::Category(rules.category.query_tag()))
        }
        CategoryLabels::NotRequired | CategoryLabels::Unavailable => None,
    }
}

/// Classifier bound to one run's immutable rules and allowlist
#[derive(Debug, Clone)]
pub struct MessageClassifier {
    rules: RuleConfig,
    allowlist: Allowlist,
}

impl MessageClassifier {
    pub fn new(rules: RuleConfig, allowlist: Allowlist) -> Self {
        Self { rules, allowlist }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.rules.clone(),
            Allowlist::from_config(&config.allowlist),
        )
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// Whether classifying a message needs its category labels
    pub fn needs_category_labels(&self) -> bool {
        self.rules.category.enabled
    }

    pub fn classify(&self, message: &Message, labels: &CategoryLabels) -> Decision {
        classify(
            &message.sender,
            &message.subject,
            labels,
            &self.allowlist,
            &self.rules,
        )
    }
}
