use crate::core::keyword::normalize_keyword;
use crate::core::tables::{MIN_PREFIX_QUERY_LEN, SERVICE_ALIASES};
use crate::domain::model::MatchType;
use std::collections::BTreeMap;

/// Which host-side keys a rule keyword resolved to, and through which tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub match_type: MatchType,
    /// Normalized host-side keywords, sorted.
    pub keys: Vec<String>,
}

impl MatchOutcome {
    fn none() -> Self {
        Self {
            match_type: MatchType::None,
            keys: Vec::new(),
        }
    }

    fn single(match_type: MatchType, key: String) -> Self {
        Self {
            match_type,
            keys: vec![key],
        }
    }
}

/// Finds the host-side entries for a rule-side keyword.
///
/// Tiers are tried in order and the first that matches wins: exact
/// normalized equality, then the alias table (keyed by display form), then
/// every longer key starting with the query when the query is at least
/// [`MIN_PREFIX_QUERY_LEN`] characters.
pub fn resolve_match<V>(rule_keyword: &str, index: &BTreeMap<String, V>) -> MatchOutcome {
    let query = normalize_keyword(rule_keyword);

    if index.contains_key(&query) {
        return MatchOutcome::single(MatchType::Exact, query);
    }

    if let Some(alias) = SERVICE_ALIASES.get(rule_keyword) {
        let alias = normalize_keyword(alias);
        if index.contains_key(&alias) {
            return MatchOutcome::single(MatchType::Alias, alias);
        }
    }

    if query.chars().count() >= MIN_PREFIX_QUERY_LEN {
        // BTreeMap order keeps the matches sorted.
        let keys: Vec<String> = index
            .range(query.clone()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(&query))
            .filter(|key| **key != query)
            .cloned()
            .collect();
        if !keys.is_empty() {
            return MatchOutcome {
                match_type: MatchType::Prefix,
                keys,
            };
        }
    }

    MatchOutcome::none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(keys: &[&str]) -> BTreeMap<String, ()> {
        keys.iter().map(|k| (k.to_string(), ())).collect()
    }

    #[test]
    fn test_exact_match_is_separator_insensitive() {
        let idx = index(&["newrelic", "stripe"]);
        let outcome = resolve_match("new-relic", &idx);
        assert_eq!(outcome.match_type, MatchType::Exact);
        assert_eq!(outcome.keys, vec!["newrelic"]);
    }

    #[test]
    fn test_alias_match() {
        let idx = index(&["meraki"]);
        let outcome = resolve_match("cisco-meraki", &idx);
        assert_eq!(outcome.match_type, MatchType::Alias);
        assert_eq!(outcome.keys, vec!["meraki"]);
    }

    #[test]
    fn test_alias_target_missing_falls_through() {
        let idx = index(&["stripe"]);
        let outcome = resolve_match("cisco-meraki", &idx);
        assert_eq!(outcome.match_type, MatchType::None);
        assert!(outcome.keys.is_empty());
    }

    #[test]
    fn test_exact_beats_alias() {
        let idx = index(&["ciscomeraki", "meraki"]);
        let outcome = resolve_match("cisco-meraki", &idx);
        assert_eq!(outcome.match_type, MatchType::Exact);
        assert_eq!(outcome.keys, vec!["ciscomeraki"]);
    }

    #[test]
    fn test_prefix_match_returns_all_sorted() {
        let idx = index(&["azurestorage", "azuredevops", "aws", "azurezz"]);
        let outcome = resolve_match("azure", &idx);
        assert_eq!(outcome.match_type, MatchType::Prefix);
        assert_eq!(outcome.keys, vec!["azuredevops", "azurestorage", "azurezz"]);
    }

    #[test]
    fn test_prefix_requires_minimum_length() {
        let idx = index(&["agechecker"]);
        assert_eq!(resolve_match("age", &idx).match_type, MatchType::None);
        assert_eq!(resolve_match("agec", &idx).match_type, MatchType::Prefix);
    }

    #[test]
    fn test_prefix_never_matches_unrelated_longer_keys() {
        let idx = index(&["coinbase"]);
        let outcome = resolve_match("coincap", &idx);
        assert_eq!(outcome.match_type, MatchType::None);
    }

    #[test]
    fn test_no_match_on_empty_index() {
        let idx = index(&[]);
        assert_eq!(resolve_match("stripe", &idx), MatchOutcome::none());
    }
}
