use crate::core::keyword::keyword_from_rule_id;
use crate::domain::model::RulePattern;
use crate::utils::error::{ExportError, Result};
use serde::Deserialize;
use std::path::Path;

/// The parts of a gitleaks-style rules file the export needs.
#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    #[serde(default)]
    id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    regex: String,
    #[serde(default)]
    entropy: f64,
    #[serde(default)]
    secret_group: u32,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    skip_report: bool,
}

impl From<RawRule> for RulePattern {
    fn from(raw: RawRule) -> Self {
        RulePattern {
            keyword: keyword_from_rule_id(&raw.id),
            id: raw.id,
            description: Some(raw.description).filter(|d| !d.trim().is_empty()),
            regex: raw.regex,
            entropy: Some(raw.entropy).filter(|e| *e > 0.0),
            secret_group: Some(raw.secret_group).filter(|g| *g > 0),
            keywords: raw.keywords,
        }
    }
}

/// Reads a rules file and returns every reportable rule that has a regex.
pub fn extract_rules(path: &Path) -> Result<Vec<RulePattern>> {
    let content = std::fs::read_to_string(path).map_err(|e| ExportError::RuleExtractionError {
        message: format!("{}: {}", path.display(), e),
    })?;
    parse_rules(&content)
}

/// Drops `skipReport` rules and path-only rules (no regex), derives each
/// keyword, and sorts by keyword then id.
pub fn parse_rules(content: &str) -> Result<Vec<RulePattern>> {
    let file: RulesFile = toml::from_str(content)?;

    let mut rules: Vec<RulePattern> = file
        .rules
        .into_iter()
        .filter(|rule| !rule.skip_report && !rule.regex.trim().is_empty())
        .map(RulePattern::from)
        .collect();

    rules.sort_by(|a, b| a.keyword.cmp(&b.keyword).then_with(|| a.id.cmp(&b.id)));
    Ok(rules)
}
