use crate::config::ExportSettings;
use crate::core::ExportMode;
use crate::utils::error::{ExportError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

static ENV_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

/// Optional run configuration file. Every key may be omitted; the command
/// line overrides whatever is set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub trufflehog: Option<String>,
    pub gitleaks: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub mode: Option<ExportMode>,
    pub force: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub strict: Option<bool>,
    pub allow_ip_hosts: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExportError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ExportError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DETECTORS_DIR})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Writes every value present in the file into `settings`.
    pub fn apply_to(&self, settings: &mut ExportSettings) {
        if let Some(dir) = &self.sources.trufflehog {
            settings.trufflehog_dir = Some(dir.clone());
        }
        if let Some(path) = &self.sources.gitleaks {
            settings.gitleaks_path = Some(path.clone());
        }
        if let Some(path) = &self.output.path {
            settings.output_path = path.clone();
        }
        if let Some(mode) = self.output.mode {
            settings.mode = mode;
        }
        if let Some(force) = self.output.force {
            settings.force = force;
        }
        if let Some(strict) = self.extract.strict {
            settings.strict = strict;
        }
        if let Some(allow) = self.extract.allow_ip_hosts {
            settings.allow_ip_hosts = allow;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[sources]
trufflehog = "../trufflehog/pkg/detectors"
gitleaks = "../gitleaks/config/gitleaks.toml"

[output]
path = "dist/secrets.json"
mode = "gondolin"
force = true

[extract]
strict = true
allow_ip_hosts = false
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let mut settings = ExportSettings::default();
        config.apply_to(&mut settings);

        assert_eq!(settings.trufflehog_dir.as_deref(), Some("../trufflehog/pkg/detectors"));
        assert_eq!(settings.output_path, "dist/secrets.json");
        assert_eq!(settings.mode, ExportMode::Slim);
        assert!(settings.force);
        assert!(settings.strict);
        assert!(!settings.allow_ip_hosts);
    }

    #[test]
    fn test_empty_config_keeps_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        let mut settings = ExportSettings::default();
        config.apply_to(&mut settings);
        assert_eq!(settings, ExportSettings::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SHE_TEST_RULES_PATH", "/opt/rules.toml");

        let toml_content = r#"
[sources]
gitleaks = "${SHE_TEST_RULES_PATH}"
trufflehog = "${SHE_TEST_UNSET_VARIABLE}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.sources.gitleaks.as_deref(), Some("/opt/rules.toml"));
        assert_eq!(
            config.sources.trufflehog.as_deref(),
            Some("${SHE_TEST_UNSET_VARIABLE}")
        );

        std::env::remove_var("SHE_TEST_RULES_PATH");
    }

    #[test]
    fn test_invalid_mode_is_config_error() {
        let err = TomlConfig::from_toml_str("[output]\nmode = \"csv\"\n").unwrap_err();
        assert!(matches!(err, ExportError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\npath = \"out.json\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.path.as_deref(), Some("out.json"));
    }
}
