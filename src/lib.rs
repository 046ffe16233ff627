pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, LocalStorage};

pub use app::pipelines::{ProximityPipeline, ShapefilePipeline};
pub use config::toml_config::TomlConfig;
pub use config::{ProximitySettings, ShapefileSettings};
pub use crate::core::etl::EtlEngine;
pub use crate::core::reproject::{ProjFactory, ProjTransformer};
pub use utils::error::{Result, SpatialError};
