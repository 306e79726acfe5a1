//! Gmail search query construction from the enabled rules

use crate::config::RuleConfig;

/// Builds the Gmail search query covering every enabled rule
///
/// Clauses are OR-joined in rule priority order: the no-reply sender clause,
/// the parenthesized subject keyword clauses, then the category clause.
/// Returns `None` when no rule contributes a clause so the caller never issues
/// an unbounded search.
pub fn build_search_query(rules: &RuleConfig) -> Option<String> {
    let mut clauses = Vec::new();

    if rules.no_reply.enabled {
        let pattern = rules.no_reply.pattern.trim();
        if !pattern.is_empty() {
            clauses.push(format!("from:{}", quote_term(pattern)));
        }
    }

    if rules.keywords.enabled {
        let subject_terms: Vec<String> = rules
            .keywords
            .list
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| format!("subject:{}", quote_term(k)))
            .collect();

        if !subject_terms.is_empty() {
            clauses.push(format!("({})", subject_terms.join(" OR ")));
        }
    }

    if rules.category.enabled {
        let tag = rules.category.query_tag();
        if !tag.is_empty() {
            clauses.push(format!("category:{}", tag));
        }
    }

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" OR "))
    }
}

/// Quote multi-word terms so Gmail treats them as a phrase
///
/// Terms never contain `"`; `Config::validate` rejects them.
fn quote_term(term: &str) -> String {
    if term.chars().any(char::is_whitespace) {
        format!("\"{}\"", term)
    } else {
        term.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryRule, KeywordRule, NoReplyRule};

    fn rules(no_reply: bool, keywords: &[&str], category: bool) -> RuleConfig {
        RuleConfig {
            no_reply: NoReplyRule {
                enabled: no_reply,
                ..NoReplyRule::default()
            },
            keywords: KeywordRule {
                enabled: !keywords.is_empty(),
                list: keywords.iter().map(|k| k.to_string()).collect(),
            },
            category: CategoryRule {
                enabled: category,
                ..CategoryRule::default()
            },
        }
    }

    #[test]
    fn test_all_rules() {
        let query = build_search_query(&rules(true, &["newsletter", "promotion"], true));
        assert_eq!(
            query.as_deref(),
            Some("from:no-reply@ OR (subject:newsletter OR subject:promotion) OR category:promotions")
        );
    }

    #[test]
    fn test_no_rules_enabled() {
        assert_eq!(build_search_query(&RuleConfig::disabled()), None);
    }

    #[test]
    fn test_single_rule() {
        assert_eq!(
            build_search_query(&rules(true, &[], false)).as_deref(),
            Some("from:no-reply@")
        );
        assert_eq!(
            build_search_query(&rules(false, &["newsletter"], false)).as_deref(),
            Some("(subject:newsletter)")
        );
        assert_eq!(
            build_search_query(&rules(false, &[], true)).as_deref(),
            Some("category:promotions")
        );
    }

    #[test]
    fn test_multi_word_keyword_is_quoted() {
        let query = build_search_query(&rules(false, &["unsubscribe here"], false));
        assert_eq!(query.as_deref(), Some("(subject:\"unsubscribe here\")"));
    }

    #[test]
    fn test_enabled_keyword_rule_with_only_blank_keywords() {
        let mut config = RuleConfig::disabled();
        config.keywords.enabled = true;
        config.keywords.list = vec!["  ".to_string()];
        assert_eq!(build_search_query(&config), None);
    }

    #[test]
    fn test_deterministic() {
        let config = RuleConfig::default();
        assert_eq!(build_search_query(&config), build_search_query(&config));
    }
}
