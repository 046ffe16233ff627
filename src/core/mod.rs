pub mod annotate;
pub mod columns;
pub mod etl;
pub mod proximity;
pub mod records;
pub mod reproject;
pub mod shapefile_convert;

pub use crate::domain::model::{AnnotatedRecordSet, GeoJsonOutput, RecordSet, ShapefileBundle};
pub use crate::domain::ports::{
    CoordinateTransformer, Counted, Pipeline, Storage, TransformerFactory,
};
pub use crate::utils::error::Result;
