// Domain layer: core models and ports (interfaces). No geospatial crates here.

pub mod model;
pub mod ports;
