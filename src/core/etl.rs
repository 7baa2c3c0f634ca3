use crate::core::Pipeline;
use crate::domain::model::AggregateStats;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub destination: String,
    pub stats: AggregateStats,
    /// Detectors that could not be read.
    pub skipped_detectors: Vec<String>,
    /// Extraction warnings, e.g. unparsable URL literals.
    pub warnings: Vec<String>,
}

pub struct ExportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ExportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Extracting sources...");
        let mut snapshot = self.pipeline.extract().await?;
        tracing::debug!(
            "Extracted {} host entities and {} rules",
            snapshot.host_entities.len(),
            snapshot.rules.len()
        );
        let skipped_detectors = std::mem::take(&mut snapshot.skipped_detectors);
        let warnings = std::mem::take(&mut snapshot.warnings);

        tracing::info!("Merging catalogs...");
        let document = self.pipeline.transform(snapshot).await?;
        let stats = document.stats.clone();

        tracing::info!("Writing export...");
        let destination = self.pipeline.load(document).await?;
        tracing::info!("Output saved to: {}", destination);

        log_summary(&stats);
        if !skipped_detectors.is_empty() || !warnings.is_empty() {
            tracing::info!(
                "Detectors skipped:     {}, extraction warnings: {}",
                skipped_detectors.len(),
                warnings.len()
            );
        }
        Ok(RunSummary {
            destination,
            stats,
            skipped_detectors,
            warnings,
        })
    }
}

pub fn log_summary(stats: &AggregateStats) {
    tracing::info!("=== Summary ===");
    tracing::info!("Total services:        {}", stats.total_services);
    tracing::info!(
        "  With hosts+rules:    {} (exact:{} prefix:{} alias:{})",
        stats.services_with_hosts,
        stats.match_exact,
        stats.match_prefix,
        stats.match_alias
    );
    tracing::info!("  Rules only (no host): {}", stats.services_no_hosts);
    tracing::info!("  Hosts only (no rule): {}", stats.host_only_services);
    tracing::info!(
        "Total rules:           {} ({} with hosts)",
        stats.total_rules,
        stats.rules_with_hosts
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        CombinedExport, ExportDocument, ExportPayload, MergedCatalog, SourceSnapshot,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPipeline {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<SourceSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SourceSnapshot {
                skipped_detectors: vec!["broken: unreadable".to_string()],
                warnings: vec!["a.go:3: parse url".to_string()],
                ..SourceSnapshot::default()
            })
        }

        async fn transform(&self, _snapshot: SourceSnapshot) -> Result<ExportDocument> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let stats = AggregateStats {
                total_services: 2,
                ..AggregateStats::default()
            };
            Ok(ExportDocument {
                payload: ExportPayload::Full(CombinedExport::new(
                    MergedCatalog::default(),
                    chrono::Utc::now(),
                )),
                stats,
            })
        }

        async fn load(&self, _document: ExportDocument) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("memory".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_drives_every_stage_once() {
        let engine = ExportEngine::new(CountingPipeline::default());
        let summary = engine.run().await.unwrap();

        assert_eq!(summary.destination, "memory");
        assert_eq!(summary.stats.total_services, 2);
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
        assert_eq!(summary.skipped_detectors, vec!["broken: unreadable"]);
        assert_eq!(summary.warnings, vec!["a.go:3: parse url"]);
    }
}
