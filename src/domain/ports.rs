use crate::domain::model::{ExportDocument, SourceSnapshot};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    #[default]
    Full,
    #[serde(alias = "gondolin")]
    #[cfg_attr(feature = "cli", value(alias = "gondolin"))]
    Slim,
}

pub trait Storage: Send + Sync {
    fn exists(&self, path: &str) -> bool;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
        overwrite: bool,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn trufflehog_dir(&self) -> Option<&str>;
    fn gitleaks_path(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn mode(&self) -> ExportMode;
    fn force(&self) -> bool;
    fn strict(&self) -> bool;
    fn allow_ip_hosts(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceSnapshot>;
    async fn transform(&self, snapshot: SourceSnapshot) -> Result<ExportDocument>;
    async fn load(&self, document: ExportDocument) -> Result<String>;
}
