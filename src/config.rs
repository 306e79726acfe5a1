use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CleanupError, Result};

/// Gmail caps `messages.list` at 500 results per page
pub const MAX_RESULTS_LIMIT: u32 = 500;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub rules: RuleConfig,
    #[serde(default)]
    pub allowlist: AllowlistConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Rules that flag a message as unwanted
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RuleConfig {
    #[serde(default)]
    pub no_reply: NoReplyRule,
    #[serde(default)]
    pub keywords: KeywordRule,
    #[serde(default)]
    pub category: CategoryRule,
}

impl RuleConfig {
    /// A rule set with every rule switched off
    pub fn disabled() -> Self {
        Self {
            no_reply: NoReplyRule {
                enabled: false,
                ..NoReplyRule::default()
            },
            keywords: KeywordRule {
                enabled: false,
                ..KeywordRule::default()
            },
            category: CategoryRule {
                enabled: false,
                ..CategoryRule::default()
            },
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.no_reply.enabled || self.keywords.enabled || self.category.enabled
    }
}

/// Sender contains a no-reply style address fragment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoReplyRule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_no_reply_pattern")]
    pub pattern: String,
}

impl Default for NoReplyRule {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            pattern: default_no_reply_pattern(),
        }
    }
}

/// Subject contains one of the listed keywords
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordRule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_keywords")]
    pub list: Vec<String>,
}

impl Default for KeywordRule {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            list: default_keywords(),
        }
    }
}

/// Gmail assigned the message to a category tab (e.g. promotions)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRule {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_category_tag")]
    pub tag: String,
}

impl CategoryRule {
    /// Search clause value, e.g. `promotions` for `category:promotions`
    pub fn query_tag(&self) -> String {
        self.tag.trim().to_lowercase()
    }

    /// Label id Gmail attaches to messages in this category
    pub fn label_id(&self) -> String {
        format!("CATEGORY_{}", self.tag.trim().to_uppercase())
    }
}

impl Default for CategoryRule {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            tag: default_category_tag(),
        }
    }
}

/// Senders and domains that are never trashed
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AllowlistConfig {
    #[serde(default)]
    pub senders: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    #[serde(default = "default_max_results")]
    pub max_results_per_search: u32,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            dry_run: default_dry_run(),
            max_results_per_search: default_max_results(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_no_reply_pattern() -> String {
    "no-reply@".to_string()
}

fn default_keywords() -> Vec<String> {
    vec![
        "newsletter".to_string(),
        "unsubscribe".to_string(),
        "promotional".to_string(),
        "promotion".to_string(),
        "unsubscribe here".to_string(),
    ]
}

fn default_category_tag() -> String {
    "promotions".to_string()
}

fn default_dry_run() -> bool {
    true
}

fn default_max_results() -> u32 {
    100
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CleanupError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| CleanupError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CleanupError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CleanupError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| CleanupError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    ///
    /// Having every rule disabled is valid; the run simply has nothing to do.
    pub fn validate(&self) -> Result<()> {
        let max_results = self.execution.max_results_per_search;
        if max_results == 0 {
            return Err(CleanupError::ConfigError(
                "execution.max_results_per_search must be at least 1".to_string(),
            ));
        }
        if max_results > MAX_RESULTS_LIMIT {
            return Err(CleanupError::ConfigError(format!(
                "execution.max_results_per_search cannot exceed {} (Gmail page size limit)",
                MAX_RESULTS_LIMIT
            )));
        }

        let rules = &self.rules;
        if rules.no_reply.enabled && rules.no_reply.pattern.trim().is_empty() {
            return Err(CleanupError::ConfigError(
                "rules.no_reply.pattern cannot be empty when the rule is enabled".to_string(),
            ));
        }
        if rules.no_reply.enabled && rules.no_reply.pattern.contains('"') {
            return Err(CleanupError::ConfigError(
                "rules.no_reply.pattern cannot contain double quotes".to_string(),
            ));
        }

        if rules.keywords.enabled {
            if rules.keywords.list.is_empty() {
                return Err(CleanupError::ConfigError(
                    "rules.keywords.list cannot be empty when the rule is enabled".to_string(),
                ));
            }
            if rules.keywords.list.iter().any(|k| k.trim().is_empty()) {
                return Err(CleanupError::ConfigError(
                    "rules.keywords.list cannot contain empty strings".to_string(),
                ));
            }
            // Keywords are sent as quoted search phrases
            if let Some(keyword) = rules.keywords.list.iter().find(|k| k.contains('"')) {
                return Err(CleanupError::ConfigError(format!(
                    "rules.keywords.list entry '{}' cannot contain double quotes",
                    keyword
                )));
            }
        }

        if rules.category.enabled {
            let tag = rules.category.tag.trim();
            if tag.is_empty() {
                return Err(CleanupError::ConfigError(
                    "rules.category.tag cannot be empty when the rule is enabled".to_string(),
                ));
            }
            if !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(CleanupError::ConfigError(format!(
                    "Invalid rules.category.tag: '{}'. Must be a Gmail category such as 'promotions' or 'social'",
                    tag
                )));
            }
        }

        // Empty allowlist entries are ignored at match time
        let empty_senders = self
            .allowlist
            .senders
            .iter()
            .filter(|s| s.trim().is_empty())
            .count();
        let empty_domains = self
            .allowlist
            .domains
            .iter()
            .filter(|d| d.trim().is_empty())
            .count();
        if empty_senders + empty_domains > 0 {
            tracing::warn!(
                "Ignoring {} empty allowlist sender(s) and {} empty allowlist domain(s)",
                empty_senders,
                empty_domains
            );
        }

        if !rules.any_enabled() {
            tracing::warn!("No cleanup rules are enabled");
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self::default();
        config.save(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.rules.no_reply.enabled);
        assert_eq!(config.rules.no_reply.pattern, "no-reply@");

        assert!(config.rules.keywords.enabled);
        assert_eq!(config.rules.keywords.list.len(), 5);
        assert!(config
            .rules
            .keywords
            .list
            .contains(&"newsletter".to_string()));

        assert!(config.rules.category.enabled);
        assert_eq!(config.rules.category.tag, "promotions");

        assert!(config.allowlist.senders.is_empty());
        assert!(config.allowlist.domains.is_empty());

        // Dry run is the safe default
        assert!(config.execution.dry_run);
        assert_eq!(config.execution.max_results_per_search, 100);
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_all_rules_disabled_is_valid() {
        let config = Config {
            rules: RuleConfig::disabled(),
            ..Config::default()
        };
        assert!(!config.rules.any_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_max_results_zero() {
        let mut config = Config::default();
        config.execution.max_results_per_search = 0;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("at least 1"));
    }

    #[test]
    fn test_config_validation_max_results_too_high() {
        let mut config = Config::default();
        config.execution.max_results_per_search = 501;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("cannot exceed 500"));
    }

    #[test]
    fn test_config_validation_max_results_boundary_valid() {
        let mut config = Config::default();

        config.execution.max_results_per_search = 1;
        assert!(config.validate().is_ok());

        config.execution.max_results_per_search = 500;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_keyword() {
        let mut config = Config::default();
        config.rules.keywords.list.push("  ".to_string());
        let result = config.validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot contain empty strings"));
    }

    #[test]
    fn test_config_validation_rejects_quoted_keyword() {
        let mut config = Config::default();
        config.rules.keywords.list.push("say \"hi\" now".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CleanupError::ConfigError(_)));
        assert!(err.to_string().contains("cannot contain double quotes"));

        config.rules.keywords.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_quoted_no_reply_pattern() {
        let mut config = Config::default();
        config.rules.no_reply.pattern = "\"no-reply\"@".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_keyword_list() {
        let mut config = Config::default();
        config.rules.keywords.list.clear();
        assert!(config.validate().is_err());

        // A disabled rule may have an empty list
        config.rules.keywords.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_no_reply_pattern() {
        let mut config = Config::default();
        config.rules.no_reply.pattern = String::new();
        let result = config.validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("rules.no_reply.pattern"));
    }

    #[test]
    fn test_config_validation_invalid_category_tag() {
        let mut config = Config::default();
        config.rules.category.tag = "promo tions".to_string();
        let result = config.validate();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid rules.category.tag"));
    }

    #[test]
    fn test_empty_allowlist_entries_are_not_errors() {
        let mut config = Config::default();
        config.allowlist.senders.push(String::new());
        config.allowlist.domains.push("   ".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_category_tag_mapping() {
        let rule = CategoryRule {
            enabled: true,
            tag: "Promotions".to_string(),
        };
        assert_eq!(rule.query_tag(), "promotions");
        assert_eq!(rule.label_id(), "CATEGORY_PROMOTIONS");
    }

    #[tokio::test]
    async fn test_config_load_save_roundtrip() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        let mut config = Config::default();
        config.allowlist.senders.push("acme".to_string());
        config.execution.max_results_per_search = 250;
        config.save(path).await.unwrap();

        let loaded = Config::load(path).await.unwrap();

        assert_eq!(loaded.rules, config.rules);
        assert_eq!(loaded.allowlist, config.allowlist);
        assert_eq!(loaded.execution.max_results_per_search, 250);
    }

    #[tokio::test]
    async fn test_config_load_nonexistent_returns_default() {
        let path = Path::new("/tmp/nonexistent-gmail-cleanup-config-12345.toml");

        let config = Config::load(path).await.unwrap();

        assert!(config.execution.dry_run);
        assert_eq!(config.execution.max_results_per_search, 100);
    }

    #[tokio::test]
    async fn test_config_load_invalid_toml() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        tokio::fs::write(path, "this is not valid toml {[}]")
            .await
            .unwrap();

        let result = Config::load(path).await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config file"));
    }

    #[tokio::test]
    async fn test_config_partial_with_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        let partial_config = r#"
[rules.category]
enabled = false

[allowlist]
senders = ["windsor metro west", "kelvin.guerra"]
domains = ["company.com"]

[execution]
dry_run = false
"#;
        tokio::fs::write(path, partial_config).await.unwrap();

        let config = Config::load(path).await.unwrap();

        assert!(!config.rules.category.enabled);
        assert_eq!(config.rules.category.tag, "promotions");
        assert!(!config.execution.dry_run);
        assert_eq!(config.allowlist.senders.len(), 2);
        assert_eq!(config.allowlist.domains, vec!["company.com".to_string()]);

        // Untouched sections keep their defaults
        assert!(config.rules.no_reply.enabled);
        assert!(config.rules.keywords.enabled);
        assert_eq!(config.execution.max_results_per_search, 100);
    }

    #[tokio::test]
    async fn test_config_load_rejects_invalid_values() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        tokio::fs::write(path, "[execution]\nmax_results_per_search = 0\n")
            .await
            .unwrap();

        let result = Config::load(path).await;
        assert!(matches!(result, Err(CleanupError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_config_create_example() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        Config::create_example(path).await.unwrap();

        let config = Config::load(path).await.unwrap();
        assert_eq!(config.rules, RuleConfig::default());
    }
}
