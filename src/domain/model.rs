use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A host-side detector: its source directory name, the derived keyword and
/// the verification hosts found in its sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntity {
    pub source_name: String,
    pub keyword: String,
    pub hosts: Vec<String>,
}

/// A value-matching rule from the rules catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePattern {
    pub id: String,
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub regex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entropy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_group: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Alias,
    Prefix,
    None,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Alias => "alias",
            MatchType::Prefix => "prefix",
            MatchType::None => "none",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical service: the rules sharing a normalized keyword plus every
/// host claimed for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalService {
    pub keyword: String,
    pub hosts: Vec<String>,
    pub match_type: MatchType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_source_names: Vec<String>,
    pub rules: Vec<RulePattern>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostOnlyEntity {
    pub keyword: String,
    pub source_name: String,
    pub hosts: Vec<String>,
}

impl From<HostEntity> for HostOnlyEntity {
    fn from(entity: HostEntity) -> Self {
        Self {
            keyword: entity.keyword,
            source_name: entity.source_name,
            hosts: entity.hosts,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_services: usize,
    pub services_with_hosts: usize,
    pub services_no_hosts: usize,
    pub host_only_services: usize,
    pub total_rules: usize,
    pub rules_with_hosts: usize,
    pub match_exact: usize,
    pub match_alias: usize,
    pub match_prefix: usize,
}

/// Result of one merge pass. Contains nothing time-dependent, so identical
/// inputs serialize to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedCatalog {
    pub stats: AggregateStats,
    pub services: Vec<CanonicalService>,
    pub host_only: Vec<HostOnlyEntity>,
    pub no_host_keywords: Vec<String>,
}

/// The full export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedExport {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub catalog: MergedCatalog,
}

impl CombinedExport {
    pub fn new(catalog: MergedCatalog, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            catalog,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuePattern {
    pub id: String,
    /// Present only when the owning service has hosts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    pub regex: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_group: Option<u32>,
}

/// Slim view for consumers that only forward secrets to known hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlimExport {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub keyword_host_map: BTreeMap<String, Vec<String>>,
    pub exact_name_host_map: BTreeMap<String, Vec<String>>,
    pub value_patterns: Vec<ValuePattern>,
}

impl SlimExport {
    pub fn linked_pattern_count(&self) -> usize {
        self.value_patterns
            .iter()
            .filter(|p| p.keyword.is_some())
            .count()
    }
}

/// Everything the extract stage hands to the merge.
#[derive(Debug, Clone, Default)]
pub struct SourceSnapshot {
    pub host_entities: Vec<HostEntity>,
    pub rules: Vec<RulePattern>,
    pub skipped_detectors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportPayload {
    Full(CombinedExport),
    Slim(SlimExport),
}

/// Transform output: the payload to write plus the stats for the summary.
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub payload: ExportPayload,
    pub stats: AggregateStats,
}
