#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::adapters::storage::STDOUT_PATH;
use crate::core::{ConfigProvider, ExportMode};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_any_present, validate_existing_dir, validate_existing_file, validate_path, Validate,
};
use serde::{Deserialize, Serialize};

/// Fully resolved run settings: config file values with command-line
/// overrides applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub trufflehog_dir: Option<String>,
    pub gitleaks_path: Option<String>,
    pub output_path: String,
    pub mode: ExportMode,
    pub force: bool,
    pub strict: bool,
    pub allow_ip_hosts: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            trufflehog_dir: None,
            gitleaks_path: None,
            output_path: STDOUT_PATH.to_string(),
            mode: ExportMode::Full,
            force: false,
            strict: false,
            allow_ip_hosts: false,
        }
    }
}

impl ConfigProvider for ExportSettings {
    fn trufflehog_dir(&self) -> Option<&str> {
        self.trufflehog_dir.as_deref()
    }

    fn gitleaks_path(&self) -> Option<&str> {
        self.gitleaks_path.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn mode(&self) -> ExportMode {
        self.mode
    }

    fn force(&self) -> bool {
        self.force
    }

    fn strict(&self) -> bool {
        self.strict
    }

    fn allow_ip_hosts(&self) -> bool {
        self.allow_ip_hosts
    }
}

impl Validate for ExportSettings {
    fn validate(&self) -> Result<()> {
        validate_any_present(&[
            ("sources.trufflehog", self.trufflehog_dir.as_deref()),
            ("sources.gitleaks", self.gitleaks_path.as_deref()),
        ])?;

        if let Some(dir) = &self.trufflehog_dir {
            validate_existing_dir("sources.trufflehog", dir)?;
        }
        if let Some(path) = &self.gitleaks_path {
            validate_existing_file("sources.gitleaks", path)?;
        }
        validate_path("output.path", &self.output_path)?;

        Ok(())
    }
}
