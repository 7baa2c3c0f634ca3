//! Fixed lookup tables for keyword derivation, cross-catalog matching and the
//! slim export. These are data, not configuration: they are built once on
//! first use and never mutated.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Minimum normalized length of a rule keyword before prefix matching is tried.
pub const MIN_PREFIX_QUERY_LEN: usize = 4;

/// Minimum length of what is left after stripping a credential suffix.
pub const MIN_STRIP_RESIDUE_LEN: usize = 3;

/// Concatenated credential-type suffixes appended to detector names, e.g.
/// `cloudflareapitoken`. Bare `io` is deliberately absent: frame.io, fly.io,
/// keen.io and friends carry it as part of the brand.
pub const CREDENTIAL_SUFFIXES: &[&str] = &[
    "personalaccesstoken",
    "personaltoken",
    "personalapikey",
    "organizationapi",
    "globalapikey",
    "apppassword",
    "consumerkey",
    "orgtoken",
    "bottoken",
    "accesstoken",
    "apitokenv2",
    "apitoken",
    "apikey",
    "api",
    "oauth2",
    "oauth",
    "webhook",
    "tokenv2",
    "tokenv3",
    "token",
    "cakey",
    "key",
    "v2",
    "v3",
    "cloud",
    "license",
];

const CREDENTIAL_WORD_LIST: &[&str] = &[
    // credential nouns
    "api", "key", "token", "secret", "password", "credential", "credentials",
    // auth
    "access", "auth", "authentication", "oauth", "pat", "sso", "scim",
    // roles and scopes
    "admin", "user", "client", "service", "bot", "app", "org", "organization",
    "account", "personal", "personnal",
    // modifiers
    "public", "pub", "private", "global", "shared", "custom", "sensitive",
    "long", "short", "lived", "fine", "grained", "legacy", "workspace",
    "routable", "test", "batch", "bearer",
    // infra and ci
    "deploy", "runner", "cicd", "job", "trigger", "registration", "pipeline",
    "feed", "incoming", "session", "cookie", "kubernetes", "agent", "feature",
    "flag", "cloud", "upload", "reference", "identity",
    // crypto and encodings
    "signing", "encryption", "ca", "origin", "insert", "browser", "base64",
    "config", "refresh",
    // web
    "webhook", "url", "header", "page",
    // gitlab abbreviations
    "ptt", "rrt",
];

/// Words that describe a credential rather than a service. A hyphenated rule
/// id is cut at the first of these.
pub static CREDENTIAL_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| CREDENTIAL_WORD_LIST.iter().copied().collect());

/// Corrections for rule-side candidates the heuristic gets wrong.
pub static RULE_KEYWORD_OVERRIDES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("aws-amazon-bedrock", "aws"),
        ("contentful-delivery", "contentful"),
        ("curl", "curl"),
        ("hashicorp-tf", "hashicorp"),
        ("microsoft-teams", "microsoft-teams"),
        ("new-relic", "newrelic"),
        ("settlemint-application", "settlemint"),
        ("yandex-aws", "yandex"),
    ])
});

/// Detector names where suffix stripping is wrong or ambiguous.
pub static HOST_KEYWORD_OVERRIDES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("gcpapplicationdefaultcredentials", "gcp"),
        ("hubspot_apikey", "hubspot"),
        ("adafruitio", "adafruit"),
        ("adobeio", "adobe"),
        ("flyio", "flyio"),
        ("frameio", "frameio"),
        // "key" would strip to the generic "private"
        ("privatekey", "privatekey"),
        ("sonarcloud", "sonar"),
    ])
});

/// Rule-side keyword (display form) to host-side keyword, for services whose
/// names still diverge after normalization.
pub static SERVICE_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("cisco-meraki", "meraki"),
        ("maxmind-license", "maxmind"),
        ("private-key", "privatekey"),
    ])
});

/// Environment variable names that keyword matching cannot catch: too short,
/// too generic, or not containing the service name at all. Upper case.
pub const EXACT_NAME_HOSTS: &[(&str, &[&str])] = &[
    ("NODE_AUTH_TOKEN", &["registry.npmjs.org"]),
    ("DD_API_KEY", &["api.datadoghq.com", "*.datadoghq.com"]),
    ("HF_TOKEN", &["huggingface.co", "*.huggingface.co"]),
    ("CO_API_KEY", &["api.cohere.com"]),
    ("FLY_API_TOKEN", &["api.fly.io"]),
    ("RENDER_API_KEY", &["api.render.com"]),
    ("LINEAR_API_KEY", &["api.linear.app"]),
    ("TOGETHER_API_KEY", &["api.together.xyz"]),
    ("REPLICATE_API_TOKEN", &["api.replicate.com"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixes_exclude_bare_io() {
        assert!(!CREDENTIAL_SUFFIXES.contains(&"io"));
    }

    #[test]
    fn test_suffix_list_has_no_duplicates() {
        let unique: HashSet<_> = CREDENTIAL_SUFFIXES.iter().collect();
        assert_eq!(unique.len(), CREDENTIAL_SUFFIXES.len());
    }

    #[test]
    fn test_credential_words_cover_common_modifiers() {
        for word in ["api", "token", "oauth", "legacy", "bearer", "session"] {
            assert!(CREDENTIAL_WORDS.contains(word), "missing {}", word);
        }
        assert!(!CREDENTIAL_WORDS.contains("github"));
    }

    #[test]
    fn test_exact_name_keys_are_upper_case() {
        for (key, hosts) in EXACT_NAME_HOSTS {
            assert_eq!(*key, key.to_uppercase());
            assert!(!hosts.is_empty());
        }
    }
}
