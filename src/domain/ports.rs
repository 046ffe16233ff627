use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Anything the engine can report a size for between phases.
pub trait Counted {
    fn record_count(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Counted + Send;
    type Transformed: Counted + Send;

    fn name(&self) -> &'static str;
    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    async fn load(&self, result: Self::Transformed) -> Result<String>;
}

/// A fixed source → destination coordinate transform. Output is always
/// `(x, y)` in the destination's easting/longitude-first order.
pub trait CoordinateTransformer {
    fn transform(&self, x: f64, y: f64) -> Result<(f64, f64)>;
}

/// Builds transformers for CRS definitions only known at run time
/// (e.g. the WKT inside a shapefile's `.prj`).
pub trait TransformerFactory: Send + Sync {
    fn create(&self, source_crs: &str, target_crs: &str) -> Result<Box<dyn CoordinateTransformer>>;
}
