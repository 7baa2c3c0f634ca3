use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Rules file parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Host extraction failed: {message}")]
    HostExtractionError { message: String },

    #[error("Rule extraction failed: {message}")]
    RuleExtractionError { message: String },

    #[error("Output file already exists: {path} (use --force to overwrite)")]
    OutputExistsError { path: String },
}

impl ExportError {
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ExportError::IoError(_) => "Check that the input paths exist and are readable",
            ExportError::SerializationError(_) => "Report this as a bug; the export could not be encoded",
            ExportError::TomlError(_) => "Make sure the rules file is valid TOML",
            ExportError::ConfigError { .. }
            | ExportError::MissingConfigError { .. }
            | ExportError::InvalidConfigValueError { .. } => {
                "Review the command-line flags and the config file"
            }
            ExportError::HostExtractionError { .. } => {
                "Inspect the reported warnings or rerun without --strict"
            }
            ExportError::RuleExtractionError { .. } => "Check the --gitleaks path and file contents",
            ExportError::OutputExistsError { .. } => "Pass --force or choose another --out path",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::ConfigError { .. }
            | ExportError::MissingConfigError { .. }
            | ExportError::InvalidConfigValueError { .. }
            | ExportError::OutputExistsError { .. } => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
