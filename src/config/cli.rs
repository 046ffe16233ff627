use crate::config::toml_config::TomlConfig;
use crate::config::{ProximityOverrides, ProximitySettings, ShapefileOverrides, ShapefileSettings};
use crate::core::proximity::ProximityStrategy;
use crate::core::Storage;
use crate::domain::model::{MAX_RADIUS, MIN_RADIUS};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "spatial-etl")]
#[command(about = "Easting/Northing proximity flags and shapefile-to-GeoJSON conversion")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory for output files (overrides config)
    #[arg(long, global = true)]
    pub output_dir: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU/memory usage per phase")]
    pub monitor: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Add lon/lat (X/Y) and Within_{r}m columns to an Easting/Northing CSV
    Proximity {
        /// CSV file with Easting/Northing columns
        #[arg(short, long)]
        input: String,

        /// Buffer distances in meters, comma separated (default 2,3,5,10,15,20)
        #[arg(
            short,
            long,
            value_delimiter = ',',
            value_parser = clap::value_parser!(u32).range(MIN_RADIUS as i64..=MAX_RADIUS as i64)
        )]
        radii: Vec<u32>,

        /// Source CRS of the Easting/Northing values
        #[arg(long)]
        source_crs: Option<String>,

        /// matrix or rtree
        #[arg(long, value_parser = parse_strategy)]
        strategy: Option<ProximityStrategy>,

        /// Output file name
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Convert a zipped shapefile to WGS84 GeoJSON
    Shapefile {
        /// Zip archive holding the .shp and its companion files
        #[arg(short, long)]
        input: String,

        /// CRS to assume when the archive has no .prj
        #[arg(long)]
        fallback_crs: Option<String>,

        /// Indent the GeoJSON output
        #[arg(long)]
        pretty: bool,

        /// Output file name
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn parse_strategy(value: &str) -> std::result::Result<ProximityStrategy, String> {
    value.parse().map_err(|e: crate::utils::error::SpatialError| e.to_string())
}

impl Cli {
    pub fn load_config(&self) -> Result<TomlConfig> {
        match &self.config {
            Some(path) => TomlConfig::from_file(path),
            None => Ok(TomlConfig::default()),
        }
    }

    pub fn proximity_settings(&self, config: &TomlConfig) -> Option<ProximitySettings> {
        match &self.command {
            Command::Proximity {
                input,
                radii,
                source_crs,
                strategy,
                output,
            } => Some(ProximitySettings::resolve(
                config,
                input.clone(),
                ProximityOverrides {
                    radii: (!radii.is_empty()).then(|| radii.clone()),
                    source_crs: source_crs.clone(),
                    strategy: *strategy,
                    output_dir: self.output_dir.clone(),
                    output_filename: output.clone(),
                },
            )),
            Command::Shapefile { .. } => None,
        }
    }

    pub fn shapefile_settings(&self, config: &TomlConfig) -> Option<ShapefileSettings> {
        match &self.command {
            Command::Shapefile {
                input,
                fallback_crs,
                pretty,
                output,
            } => Some(ShapefileSettings::resolve(
                config,
                input.clone(),
                ShapefileOverrides {
                    fallback_source_crs: fallback_crs.clone(),
                    pretty: *pretty,
                    output_dir: self.output_dir.clone(),
                    output_filename: output.clone(),
                },
            )),
            Command::Proximity { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
