use crate::adapters::gitleaks::extract_rules;
use crate::adapters::storage::STDOUT_PATH;
use crate::adapters::trufflehog::{extract_host_entities, HostExtractOptions};
use crate::core::merge::merge;
use crate::core::projection::project_slim;
use crate::core::{ConfigProvider, ExportMode, Pipeline, Storage};
use crate::domain::model::{
    CombinedExport, ExportDocument, ExportPayload, SourceSnapshot,
};
use crate::utils::error::{ExportError, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

/// How many extraction warnings are echoed to the log.
const MAX_LOGGED_WARNINGS: usize = 5;

pub struct ExportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    generated_at: Option<DateTime<Utc>>,
}

impl<S: Storage, C: ConfigProvider> ExportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            generated_at: None,
        }
    }

    /// Pins the export timestamp instead of using the current time.
    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ExportPipeline<S, C> {
    async fn extract(&self) -> Result<SourceSnapshot> {
        let mut snapshot = SourceSnapshot::default();

        if let Some(dir) = self.config.trufflehog_dir() {
            let options = HostExtractOptions {
                allow_ip_hosts: self.config.allow_ip_hosts(),
            };
            let extraction = extract_host_entities(Path::new(dir), &options)?;

            if !extraction.skipped.is_empty() {
                tracing::info!("Detectors: skipped {}", extraction.skipped.len());
                for skipped in &extraction.skipped {
                    tracing::debug!("skipped {}", skipped);
                }
            }
            if !extraction.warnings.is_empty() {
                tracing::warn!(
                    "Detectors: {} warnings (showing up to {})",
                    extraction.warnings.len(),
                    MAX_LOGGED_WARNINGS
                );
                for warning in extraction.warnings.iter().take(MAX_LOGGED_WARNINGS) {
                    tracing::warn!("  - {}", warning);
                }
                if self.config.strict() {
                    return Err(ExportError::HostExtractionError {
                        message: format!(
                            "{} warnings in strict mode (first: {})",
                            extraction.warnings.len(),
                            extraction.warnings[0]
                        ),
                    });
                }
            }
            tracing::info!(
                "Detectors: extracted {} with hosts",
                extraction.entities.len()
            );

            snapshot.host_entities = extraction.entities;
            snapshot.skipped_detectors = extraction.skipped;
            snapshot.warnings = extraction.warnings;
        }

        if let Some(path) = self.config.gitleaks_path() {
            snapshot.rules = extract_rules(Path::new(path))?;
            tracing::info!("Rules: extracted {}", snapshot.rules.len());
        }

        Ok(snapshot)
    }

    async fn transform(&self, snapshot: SourceSnapshot) -> Result<ExportDocument> {
        let catalog = merge(&snapshot.host_entities, &snapshot.rules);
        let stats = catalog.stats.clone();
        let full = CombinedExport::new(catalog, self.generated_at.unwrap_or_else(Utc::now));

        let payload = match self.config.mode() {
            ExportMode::Full => ExportPayload::Full(full),
            ExportMode::Slim => {
                let slim = project_slim(&full);
                tracing::info!(
                    "Slim export: {} keyword mappings, {} exact-name mappings, {} value patterns ({} linked to hosts)",
                    slim.keyword_host_map.len(),
                    slim.exact_name_host_map.len(),
                    slim.value_patterns.len(),
                    slim.linked_pattern_count()
                );
                ExportPayload::Slim(slim)
            }
        };

        Ok(ExportDocument { payload, stats })
    }

    async fn load(&self, document: ExportDocument) -> Result<String> {
        let mut data = serde_json::to_vec_pretty(&document.payload)?;
        data.push(b'\n');

        let output_path = self.config.output_path();
        self.storage
            .write_file(output_path, &data, self.config.force())
            .await?;

        if output_path == STDOUT_PATH {
            Ok("stdout".to_string())
        } else {
            Ok(output_path.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MatchType;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        fn exists(&self, _path: &str) -> bool {
            false
        }

        async fn write_file(&self, path: &str, data: &[u8], _overwrite: bool) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        trufflehog_dir: Option<String>,
        gitleaks_path: Option<String>,
        mode: ExportMode,
        strict: bool,
    }

    impl MockConfig {
        fn new(mode: ExportMode) -> Self {
            Self {
                trufflehog_dir: None,
                gitleaks_path: None,
                mode,
                strict: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn trufflehog_dir(&self) -> Option<&str> {
            self.trufflehog_dir.as_deref()
        }

        fn gitleaks_path(&self) -> Option<&str> {
            self.gitleaks_path.as_deref()
        }

        fn output_path(&self) -> &str {
            "export.json"
        }

        fn mode(&self) -> ExportMode {
            self.mode
        }

        fn force(&self) -> bool {
            false
        }

        fn strict(&self) -> bool {
            self.strict
        }

        fn allow_ip_hosts(&self) -> bool {
            false
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn snapshot() -> SourceSnapshot {
        SourceSnapshot {
            host_entities: vec![crate::domain::model::HostEntity {
                source_name: "stripe".to_string(),
                keyword: "stripe".to_string(),
                hosts: vec!["api.stripe.com".to_string()],
            }],
            rules: crate::adapters::gitleaks::parse_rules(
                r#"
[[rules]]
id = "stripe-access-token"
regex = '''sk_live_[a-z]+'''

[[rules]]
id = "age-secret-key"
regex = '''AGE-SECRET-KEY-1[A-Z]+'''
"#,
            )
            .unwrap(),
            ..SourceSnapshot::default()
        }
    }

    #[tokio::test]
    async fn test_extract_without_sources_is_empty() {
        let pipeline = ExportPipeline::new(MockStorage::default(), MockConfig::new(ExportMode::Full));
        let snapshot = pipeline.extract().await.unwrap();
        assert!(snapshot.host_entities.is_empty());
        assert!(snapshot.rules.is_empty());
    }

    #[tokio::test]
    async fn test_extract_strict_mode_fails_on_warnings() {
        let temp = tempfile::TempDir::new().unwrap();
        let detector = temp.path().join("broken");
        std::fs::create_dir_all(&detector).unwrap();
        std::fs::write(detector.join("broken.go"), r#"u := "http://[::1""#).unwrap();

        let mut config = MockConfig::new(ExportMode::Full);
        config.trufflehog_dir = Some(temp.path().to_str().unwrap().to_string());
        config.strict = true;

        let pipeline = ExportPipeline::new(MockStorage::default(), config);
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, ExportError::HostExtractionError { .. }));
    }

    #[tokio::test]
    async fn test_transform_full_mode() {
        let pipeline = ExportPipeline::new(MockStorage::default(), MockConfig::new(ExportMode::Full))
            .with_generated_at(fixed_time());

        let document = pipeline.transform(snapshot()).await.unwrap();

        assert_eq!(document.stats.services_with_hosts, 1);
        assert_eq!(document.stats.services_no_hosts, 1);
        let ExportPayload::Full(full) = document.payload else {
            panic!("expected full payload");
        };
        assert_eq!(full.generated_at, fixed_time());
        assert_eq!(full.catalog.services[1].keyword, "stripe");
        assert_eq!(full.catalog.services[1].match_type, MatchType::Exact);
    }

    #[tokio::test]
    async fn test_transform_slim_mode() {
        let pipeline = ExportPipeline::new(MockStorage::default(), MockConfig::new(ExportMode::Slim))
            .with_generated_at(fixed_time());

        let document = pipeline.transform(snapshot()).await.unwrap();

        let ExportPayload::Slim(slim) = document.payload else {
            panic!("expected slim payload");
        };
        assert_eq!(slim.keyword_host_map.len(), 1);
        assert_eq!(slim.value_patterns[0].id, "stripe-access-token");
        assert_eq!(slim.value_patterns[1].keyword, None);
    }

    #[tokio::test]
    async fn test_load_writes_pretty_json() {
        let storage = MockStorage::default();
        let pipeline = ExportPipeline::new(storage.clone(), MockConfig::new(ExportMode::Full))
            .with_generated_at(fixed_time());

        let document = pipeline.transform(snapshot()).await.unwrap();
        let destination = pipeline.load(document).await.unwrap();
        assert_eq!(destination, "export.json");

        let data = storage.get_file("export.json").await.unwrap();
        let text = String::from_utf8(data).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"generated_at\": \"2026-01-01T00:00:00Z\""));

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["stats"]["total_rules"], 2);
        assert_eq!(json["services"][1]["match_type"], "exact");
        assert_eq!(json["no_host_keywords"][0], "age");
    }
}
