use crate::core::{Counted, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting {} pipeline...", self.pipeline.name());

        // Extract
        let raw_data = self.pipeline.extract().await?;
        let extracted = raw_data.record_count();
        tracing::info!("Extracted {} records", extracted);
        self.monitor.record_phase("Extract", extracted);

        // Transform
        let transformed = self.pipeline.transform(raw_data).await?;
        let transformed_count = transformed.record_count();
        tracing::info!("Transformed {} records", transformed_count);
        self.monitor.record_phase("Transform", transformed_count);

        // Load
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.record_phase("Load", transformed_count);

        if self.monitor.is_enabled() {
            self.monitor.log_summary();
        }

        Ok(output_path)
    }
}
