use clap::Parser;
use spatial_etl::core::Pipeline;
use spatial_etl::domain::model::{CSV_MIME, GEOJSON_MIME};
use spatial_etl::utils::logger::{self, LogFormat};
use spatial_etl::utils::validation::Validate;
use spatial_etl::{
    Cli, EtlEngine, LocalStorage, ProjFactory, ProximityPipeline, ShapefilePipeline, SpatialError,
};

fn report_failure(e: &SpatialError) -> ! {
    tracing::error!(
        "❌ Pipeline failed: {} (Category: {:?})",
        e,
        e.category()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("⚠️ Error: {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

async fn run_engine<P: Pipeline>(pipeline: P, monitor: bool, mime: &str) {
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Completed successfully!");
            println!("✅ Completed successfully!");
            println!("📁 Output saved to: {} ({})", output_path, mime);
        }
        Err(e) => report_failure(&e),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 初始化日誌
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(format, cli.verbose);
    tracing::debug!("CLI args: {:?}", cli);

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(e.exit_code());
        }
    };
    if let Err(e) = config.validate() {
        report_failure(&e);
    }

    let monitor = cli.monitor || config.monitoring_enabled();
    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".".to_string());

    if let Some(settings) = cli.proximity_settings(&config) {
        if let Err(e) = settings.validate() {
            report_failure(&e);
        }
        let pipeline = ProximityPipeline::new(storage, ProjFactory, settings);
        run_engine(pipeline, monitor, CSV_MIME).await;
    } else if let Some(settings) = cli.shapefile_settings(&config) {
        if let Err(e) = settings.validate() {
            report_failure(&e);
        }
        let pipeline = ShapefilePipeline::new(storage, ProjFactory, settings);
        run_engine(pipeline, monitor, GEOJSON_MIME).await;
    }

    Ok(())
}
