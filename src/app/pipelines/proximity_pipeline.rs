use crate::config::ProximitySettings;
use crate::core::annotate::{annotate_records, AnnotateOptions};
use crate::core::records::{read_records, write_annotated};
use crate::core::{AnnotatedRecordSet, Pipeline, RecordSet, Storage, TransformerFactory};
use crate::utils::error::Result;

/// CSV → column detection → reprojection → proximity flags → CSV.
pub struct ProximityPipeline<S: Storage, F: TransformerFactory> {
    storage: S,
    factory: F,
    settings: ProximitySettings,
}

impl<S: Storage, F: TransformerFactory> ProximityPipeline<S, F> {
    pub fn new(storage: S, factory: F, settings: ProximitySettings) -> Self {
        Self {
            storage,
            factory,
            settings,
        }
    }

    fn annotate(&self, records: RecordSet) -> Result<AnnotatedRecordSet> {
        let transformer = self
            .factory
            .create(&self.settings.source_crs, &self.settings.target_crs)?;

        annotate_records(
            records,
            &self.settings.radii,
            transformer.as_ref(),
            AnnotateOptions {
                strategy: self.settings.strategy,
                on_reprojection_error: self.settings.on_reprojection_error,
            },
        )
    }
}

#[async_trait::async_trait]
impl<S: Storage, F: TransformerFactory> Pipeline for ProximityPipeline<S, F> {
    type Extracted = RecordSet;
    type Transformed = AnnotatedRecordSet;

    fn name(&self) -> &'static str {
        "proximity"
    }

    async fn extract(&self) -> Result<RecordSet> {
        tracing::info!("📥 Reading CSV from: {}", self.settings.input_path);
        let data = self.storage.read_file(&self.settings.input_path).await?;
        tracing::debug!("Read {} bytes", data.len());

        read_records(&data)
    }

    async fn transform(&self, data: RecordSet) -> Result<AnnotatedRecordSet> {
        tracing::info!(
            "🔄 Reprojecting {} -> {}, radii {:?}, strategy {:?}",
            self.settings.source_crs,
            self.settings.target_crs,
            self.settings.radii.as_slice(),
            self.settings.strategy
        );

        self.annotate(data)
    }

    async fn load(&self, result: AnnotatedRecordSet) -> Result<String> {
        let csv_output = write_annotated(&result)?;

        tracing::debug!("Writing CSV ({} bytes) to storage", csv_output.len());
        self.storage
            .write_file(&self.settings.output_path, &csv_output)
            .await?;

        Ok(self.settings.output_path.clone())
    }
}
