use anyhow::Context;
use clap::Parser;
use secret_host_export::utils::{logger, validation::Validate};
use secret_host_export::{
    CliConfig, ExportEngine, ExportError, ExportPipeline, LocalStorage, RunSummary,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting secret-host-export");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        tracing::error!("❌ {:#}", e);
        let exit_code = match e.downcast_ref::<ExportError>() {
            Some(export_error) => {
                tracing::error!("💡 Suggestion: {}", export_error.recovery_suggestion());
                export_error.exit_code()
            }
            None => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: CliConfig) -> anyhow::Result<RunSummary> {
    let settings = cli
        .into_settings()
        .context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;

    let pipeline = ExportPipeline::new(LocalStorage::new(), settings);
    let engine = ExportEngine::new(pipeline);

    let summary = engine.run().await.context("export failed")?;
    tracing::info!("✅ Export completed: {}", summary.destination);
    Ok(summary)
}
