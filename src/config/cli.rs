use crate::config::toml_config::TomlConfig;
use crate::config::ExportSettings;
use crate::core::ExportMode;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "secret-host-export")]
#[command(about = "Combine detector verification hosts and secret rules into one dataset")]
pub struct CliConfig {
    /// Path to the detectors source tree (one directory per detector)
    #[arg(long)]
    pub trufflehog: Option<String>,

    /// Path to the gitleaks-style rules TOML file
    #[arg(long)]
    pub gitleaks: Option<String>,

    /// Output file path, or - for stdout
    #[arg(long)]
    pub out: Option<String>,

    /// Output mode: full (all data) or slim (keyword/host maps and value patterns)
    #[arg(long, value_enum)]
    pub mode: Option<ExportMode>,

    /// Overwrite --out if it already exists
    #[arg(long)]
    pub force: bool,

    /// Treat host extraction warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Allow exporting public IP-literal hosts
    #[arg(long)]
    pub allow_ip_hosts: bool,

    /// Optional TOML file with [sources], [output] and [extract] tables
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl CliConfig {
    /// Loads the config file, if any, and layers the command line on top.
    pub fn into_settings(self) -> Result<ExportSettings> {
        let mut settings = ExportSettings::default();

        if let Some(path) = &self.config {
            tracing::debug!("Loading configuration from: {}", path);
            TomlConfig::from_file(path)?.apply_to(&mut settings);
        }

        if let Some(dir) = self.trufflehog {
            settings.trufflehog_dir = Some(dir);
        }
        if let Some(path) = self.gitleaks {
            settings.gitleaks_path = Some(path);
        }
        if let Some(out) = self.out {
            settings.output_path = out;
        }
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        settings.force |= self.force;
        settings.strict |= self.strict;
        settings.allow_ip_hosts |= self.allow_ip_hosts;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_flags() {
        let cli = CliConfig::parse_from([
            "secret-host-export",
            "--gitleaks",
            "rules.toml",
            "--mode",
            "gondolin",
            "--out",
            "out.json",
            "--force",
        ]);
        let settings = cli.into_settings().unwrap();

        assert_eq!(settings.gitleaks_path.as_deref(), Some("rules.toml"));
        assert_eq!(settings.trufflehog_dir, None);
        assert_eq!(settings.mode, ExportMode::Slim);
        assert_eq!(settings.output_path, "out.json");
        assert!(settings.force);
        assert!(!settings.strict);
    }

    #[test]
    fn test_command_line_overrides_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"[sources]\ngitleaks = \"file-rules.toml\"\ntrufflehog = \"detectors\"\n\n[output]\npath = \"file.json\"\nmode = \"slim\"\n\n[extract]\nstrict = true\n",
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "secret-host-export",
            "--config",
            file.path().to_str().unwrap(),
            "--gitleaks",
            "cli-rules.toml",
            "--mode",
            "full",
        ]);
        let settings = cli.into_settings().unwrap();

        assert_eq!(settings.gitleaks_path.as_deref(), Some("cli-rules.toml"));
        assert_eq!(settings.trufflehog_dir.as_deref(), Some("detectors"));
        assert_eq!(settings.output_path, "file.json");
        assert_eq!(settings.mode, ExportMode::Full);
        assert!(settings.strict);
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let result = CliConfig::try_parse_from(["secret-host-export", "--mode", "csv"]);
        assert!(result.is_err());
    }
}
