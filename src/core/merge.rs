use crate::core::keyword::normalize_keyword;
use crate::core::matcher::{resolve_match, MatchOutcome};
use crate::domain::model::{
    AggregateStats, CanonicalService, HostEntity, HostOnlyEntity, MatchType, MergedCatalog,
    RulePattern,
};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashSet};

struct RuleGroup<'a> {
    keyword: &'a str,
    rules: Vec<&'a RulePattern>,
}

/// Best claim on one host key: lowest tier rank, then longest query, then
/// the group's normalized keyword.
type Claim<'a> = (u8, Reverse<usize>, &'a str);

fn tier_rank(match_type: MatchType) -> u8 {
    match match_type {
        MatchType::Exact => 0,
        MatchType::Alias => 1,
        MatchType::Prefix => 2,
        MatchType::None => 3,
    }
}

/// Merges host entities and rule patterns into one record per rule-side
/// keyword.
///
/// Output is a pure function of the inputs: services come out in normalized
/// keyword order, host-only entities by keyword then source name. Each host
/// entity ends up either claimed by exactly one service or host-only.
pub fn merge(host_entities: &[HostEntity], rules: &[RulePattern]) -> MergedCatalog {
    let mut host_index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (position, entity) in host_entities.iter().enumerate() {
        host_index
            .entry(normalize_keyword(&entity.keyword))
            .or_default()
            .push(position);
    }

    let mut groups: BTreeMap<String, RuleGroup> = BTreeMap::new();
    for rule in rules {
        groups
            .entry(normalize_keyword(&rule.keyword))
            .or_insert_with(|| RuleGroup {
                keyword: &rule.keyword,
                rules: Vec::new(),
            })
            .rules
            .push(rule);
    }

    let outcomes: Vec<(&str, MatchOutcome)> = groups
        .iter()
        .map(|(norm, group)| (norm.as_str(), resolve_match(group.keyword, &host_index)))
        .collect();

    // A host key matched by several groups goes to the strongest claim only.
    let mut claims: BTreeMap<&str, Claim> = BTreeMap::new();
    for (norm, outcome) in &outcomes {
        let claim = (
            tier_rank(outcome.match_type),
            Reverse(norm.len()),
            *norm,
        );
        for key in &outcome.keys {
            claims
                .entry(key.as_str())
                .and_modify(|best| {
                    if claim < *best {
                        *best = claim;
                    }
                })
                .or_insert(claim);
        }
    }

    let mut consumed: HashSet<usize> = HashSet::new();
    let mut services = Vec::with_capacity(groups.len());
    for (norm, outcome) in &outcomes {
        let group = &groups[*norm];

        let won: Vec<&String> = outcome
            .keys
            .iter()
            .filter(|key| claims.get(key.as_str()).map(|c| c.2) == Some(*norm))
            .collect();
        if won.len() < outcome.keys.len() {
            tracing::debug!(
                "{} lost {} of {} {} matches to stronger claims",
                group.keyword,
                outcome.keys.len() - won.len(),
                outcome.keys.len(),
                outcome.match_type
            );
        }

        let mut hosts = BTreeSet::new();
        let mut source_names = BTreeSet::new();
        for key in &won {
            for &position in host_index.get(key.as_str()).into_iter().flatten() {
                let entity = &host_entities[position];
                hosts.extend(entity.hosts.iter().cloned());
                source_names.insert(entity.source_name.clone());
                consumed.insert(position);
            }
        }

        services.push(CanonicalService {
            keyword: group.keyword.to_string(),
            hosts: hosts.into_iter().collect(),
            match_type: if won.is_empty() {
                MatchType::None
            } else {
                outcome.match_type
            },
            matched_source_names: source_names.into_iter().collect(),
            rules: group.rules.iter().map(|rule| (*rule).clone()).collect(),
        });
    }

    let mut host_only: Vec<HostOnlyEntity> = host_entities
        .iter()
        .enumerate()
        .filter(|(position, _)| !consumed.contains(position))
        .map(|(_, entity)| HostOnlyEntity::from(entity.clone()))
        .collect();
    host_only.sort_by(|a, b| {
        a.keyword
            .cmp(&b.keyword)
            .then_with(|| a.source_name.cmp(&b.source_name))
    });

    let stats = compute_stats(&services, &host_only);
    let mut no_host_keywords: Vec<String> = services
        .iter()
        .filter(|service| service.hosts.is_empty())
        .map(|service| service.keyword.clone())
        .collect();
    no_host_keywords.sort();

    MergedCatalog {
        stats,
        services,
        host_only,
        no_host_keywords,
    }
}

/// Tier counts only include services that actually gained hosts.
pub fn compute_stats(services: &[CanonicalService], host_only: &[HostOnlyEntity]) -> AggregateStats {
    let mut stats = AggregateStats::default();

    for service in services {
        stats.total_rules += service.rules.len();
        if service.hosts.is_empty() {
            stats.services_no_hosts += 1;
            continue;
        }
        stats.services_with_hosts += 1;
        stats.rules_with_hosts += service.rules.len();
        match service.match_type {
            MatchType::Exact => stats.match_exact += 1,
            MatchType::Alias => stats.match_alias += 1,
            MatchType::Prefix => stats.match_prefix += 1,
            MatchType::None => {}
        }
    }

    stats.host_only_services = host_only.len();
    stats.total_services = services.len() + host_only.len();
    stats
}
