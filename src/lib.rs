pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::LocalStorage;
pub use config::ExportSettings;
pub use crate::core::{
    etl::{ExportEngine, RunSummary},
    export_pipeline::ExportPipeline,
    keyword::{keyword_from_detector_name, keyword_from_rule_id, normalize_keyword},
    matcher::{resolve_match, MatchOutcome},
    merge::merge,
    projection::project_slim,
};
pub use domain::model::{
    AggregateStats, CanonicalService, CombinedExport, HostEntity, HostOnlyEntity, MatchType,
    MergedCatalog, RulePattern, SlimExport, ValuePattern,
};
pub use domain::ports::ExportMode;
pub use utils::error::{ExportError, Result};
