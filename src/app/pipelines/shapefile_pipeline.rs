use crate::config::ShapefileSettings;
use crate::core::shapefile_convert::{convert_archive, inspect_archive};
use crate::core::{GeoJsonOutput, Pipeline, ShapefileBundle, Storage, TransformerFactory};
use crate::utils::error::Result;
use std::path::Path;

/// Zipped shapefile → reprojected GeoJSON FeatureCollection.
pub struct ShapefilePipeline<S: Storage, F: TransformerFactory> {
    storage: S,
    factory: F,
    settings: ShapefileSettings,
}

impl<S: Storage, F: TransformerFactory> ShapefilePipeline<S, F> {
    pub fn new(storage: S, factory: F, settings: ShapefileSettings) -> Self {
        Self {
            storage,
            factory,
            settings,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, F: TransformerFactory> Pipeline for ShapefilePipeline<S, F> {
    type Extracted = ShapefileBundle;
    type Transformed = GeoJsonOutput;

    fn name(&self) -> &'static str {
        "shapefile"
    }

    async fn extract(&self) -> Result<ShapefileBundle> {
        tracing::info!("📥 Reading archive from: {}", self.settings.input_path);
        let bytes = self.storage.read_file(&self.settings.input_path).await?;

        // 先確認是合法的 zip，避免到 transform 才失敗
        let entry_count = inspect_archive(&bytes)?;
        let name = Path::new(&self.settings.input_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.settings.input_path.clone());

        Ok(ShapefileBundle {
            name,
            bytes,
            entry_count,
        })
    }

    async fn transform(&self, data: ShapefileBundle) -> Result<GeoJsonOutput> {
        tracing::info!(
            "🔄 Converting {} to {}",
            data.name,
            self.settings.convert.target_crs
        );

        convert_archive(&data.bytes, &self.factory, &self.settings.convert)
    }

    async fn load(&self, result: GeoJsonOutput) -> Result<String> {
        tracing::debug!(
            "Writing GeoJSON ({} bytes, {} features) to storage",
            result.document.len(),
            result.feature_count
        );
        self.storage
            .write_file(&self.settings.output_path, result.document.as_bytes())
            .await?;

        Ok(self.settings.output_path.clone())
    }
}
