pub mod proximity_pipeline;
pub mod shapefile_pipeline;

pub use proximity_pipeline::ProximityPipeline;
pub use shapefile_pipeline::ShapefilePipeline;
