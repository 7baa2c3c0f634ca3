//! Keyword derivation for both catalogs and the normalized join key.

use crate::core::tables::{
    CREDENTIAL_SUFFIXES, CREDENTIAL_WORDS, HOST_KEYWORD_OVERRIDES, MIN_STRIP_RESIDUE_LEN,
    RULE_KEYWORD_OVERRIDES,
};

/// Derives a service keyword from a hyphenated rule id such as
/// `openai-api-key` by cutting at the first credential word.
///
/// An id made only of credential words (`private-key`) cannot be segmented
/// and is returned whole.
pub fn keyword_from_rule_id(rule_id: &str) -> String {
    let rule_id = rule_id.trim().to_lowercase();
    if rule_id.is_empty() {
        return String::new();
    }

    let service_parts: Vec<&str> = rule_id
        .split('-')
        .take_while(|part| !CREDENTIAL_WORDS.contains(*part))
        .collect();
    if service_parts.is_empty() {
        return rule_id;
    }

    let candidate = service_parts.join("-");
    match RULE_KEYWORD_OVERRIDES.get(candidate.as_str()) {
        Some(keyword) => (*keyword).to_string(),
        None => candidate,
    }
}

/// Derives a service keyword from a concatenated detector name such as
/// `cloudflareapitoken`.
///
/// Overrides win outright. Otherwise the longest credential suffix that
/// leaves at least [`MIN_STRIP_RESIDUE_LEN`] characters is stripped.
pub fn keyword_from_detector_name(name: &str) -> String {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return String::new();
    }

    if let Some(keyword) = HOST_KEYWORD_OVERRIDES.get(name.as_str()) {
        return (*keyword).to_string();
    }

    let longest = CREDENTIAL_SUFFIXES
        .iter()
        .filter(|suffix| {
            name.ends_with(**suffix) && name.len() - suffix.len() >= MIN_STRIP_RESIDUE_LEN
        })
        .max_by_key(|suffix| suffix.len());

    match longest {
        Some(suffix) => name[..name.len() - suffix.len()].to_string(),
        None => name,
    }
}

/// Comparison form of a keyword: lower case without `-` or `_`. Never shown.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
