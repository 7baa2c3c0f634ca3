pub mod etl;
pub mod export_pipeline;
pub mod keyword;
pub mod matcher;
pub mod merge;
pub mod projection;
pub mod tables;

pub use crate::domain::model::{ExportDocument, SourceSnapshot};
pub use crate::domain::ports::{ConfigProvider, ExportMode, Pipeline, Storage};
pub use crate::utils::error::Result;
