use crate::core::tables::EXACT_NAME_HOSTS;
use crate::domain::model::{CombinedExport, SlimExport, ValuePattern};
use std::collections::BTreeMap;

pub const SLIM_SCHEMA_VERSION: u32 = 1;

/// Builds the slim view from a full export.
///
/// A pattern carries its service keyword only when that service has hosts;
/// a missing keyword means there is nothing to corroborate the value against.
pub fn project_slim(full: &CombinedExport) -> SlimExport {
    let keyword_host_map: BTreeMap<String, Vec<String>> = full
        .catalog
        .services
        .iter()
        .filter(|service| !service.hosts.is_empty())
        .map(|service| (service.keyword.clone(), service.hosts.clone()))
        .collect();

    let mut value_patterns: Vec<ValuePattern> = full
        .catalog
        .services
        .iter()
        .flat_map(|service| {
            let linked = keyword_host_map
                .contains_key(&service.keyword)
                .then(|| service.keyword.clone());
            service.rules.iter().map(move |rule| ValuePattern {
                id: rule.id.clone(),
                keyword: linked.clone(),
                regex: rule.regex.clone(),
                keywords: rule.keywords.clone(),
                secret_group: rule.secret_group.filter(|group| *group > 0),
            })
        })
        .collect();

    // Linked patterns first, then keyword, then id.
    value_patterns.sort_by(|a, b| {
        a.keyword
            .is_none()
            .cmp(&b.keyword.is_none())
            .then_with(|| a.keyword.cmp(&b.keyword))
            .then_with(|| a.id.cmp(&b.id))
    });

    SlimExport {
        schema_version: SLIM_SCHEMA_VERSION,
        generated_at: full.generated_at,
        keyword_host_map,
        exact_name_host_map: exact_name_host_map(),
        value_patterns,
    }
}

/// An owned copy of the exact-name table.
pub fn exact_name_host_map() -> BTreeMap<String, Vec<String>> {
    EXACT_NAME_HOSTS
        .iter()
        .map(|(name, hosts)| {
            (
                (*name).to_string(),
                hosts.iter().map(|host| (*host).to_string()).collect(),
            )
        })
        .collect()
}
