#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::proximity::ProximityStrategy;
use crate::core::reproject::ReprojectionPolicy;
use crate::core::shapefile_convert::ConvertOptions;
use crate::domain::model::RadiusSelection;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::{Path, PathBuf};
use toml_config::{validate_radii, TomlConfig};

#[cfg(feature = "cli")]
pub use cli::{Cli, Command, LocalStorage};

/// Everything one proximity run needs, after CLI flags were applied on top
/// of the TOML file.
#[derive(Debug, Clone)]
pub struct ProximitySettings {
    pub input_path: String,
    pub output_path: String,
    pub source_crs: String,
    pub target_crs: String,
    pub radii: RadiusSelection,
    pub strategy: ProximityStrategy,
    pub on_reprojection_error: ReprojectionPolicy,
}

#[derive(Debug, Clone, Default)]
pub struct ProximityOverrides {
    pub radii: Option<Vec<u32>>,
    pub source_crs: Option<String>,
    pub strategy: Option<ProximityStrategy>,
    pub output_dir: Option<String>,
    pub output_filename: Option<String>,
}

impl ProximitySettings {
    pub fn resolve(config: &TomlConfig, input_path: String, overrides: ProximityOverrides) -> Self {
        let output_dir = overrides
            .output_dir
            .unwrap_or_else(|| config.output.directory.clone());
        let output_filename = overrides
            .output_filename
            .unwrap_or_else(|| config.proximity.output_filename.clone());

        Self {
            input_path,
            output_path: join_output(&output_dir, &output_filename),
            source_crs: overrides
                .source_crs
                .unwrap_or_else(|| config.proximity.source_crs.clone()),
            target_crs: config.proximity.target_crs.clone(),
            radii: RadiusSelection::new(
                overrides
                    .radii
                    .unwrap_or_else(|| config.proximity.default_radii.clone()),
            ),
            strategy: overrides.strategy.unwrap_or(config.proximity.strategy),
            on_reprojection_error: config.proximity.on_reprojection_error,
        }
    }
}

impl Validate for ProximitySettings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input_path)?;
        validation::validate_file_extension("input", &self.input_path, &["csv", "txt"])?;
        validation::validate_path("output", &self.output_path)?;
        validation::validate_non_empty_string("source_crs", &self.source_crs)?;
        validation::validate_non_empty_string("target_crs", &self.target_crs)?;
        validate_radii("radii", self.radii.as_slice())
    }
}

#[derive(Debug, Clone)]
pub struct ShapefileSettings {
    pub input_path: String,
    pub output_path: String,
    pub convert: ConvertOptions,
}

#[derive(Debug, Clone, Default)]
pub struct ShapefileOverrides {
    pub fallback_source_crs: Option<String>,
    pub pretty: bool,
    pub output_dir: Option<String>,
    pub output_filename: Option<String>,
}

impl ShapefileSettings {
    pub fn resolve(config: &TomlConfig, input_path: String, overrides: ShapefileOverrides) -> Self {
        let output_dir = overrides
            .output_dir
            .unwrap_or_else(|| config.output.directory.clone());
        let output_filename = overrides
            .output_filename
            .unwrap_or_else(|| config.shapefile.output_filename.clone());

        Self {
            input_path,
            output_path: join_output(&output_dir, &output_filename),
            convert: ConvertOptions {
                target_crs: config.shapefile.target_crs.clone(),
                fallback_source_crs: overrides
                    .fallback_source_crs
                    .or_else(|| config.shapefile.fallback_source_crs.clone()),
                pretty: overrides.pretty || config.shapefile.pretty,
                temp_root: config.shapefile.temp_dir.as_ref().map(PathBuf::from),
            },
        }
    }
}

impl Validate for ShapefileSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input_path)?;
        validation::validate_file_extension("input", &self.input_path, &["zip"])?;
        validation::validate_path("output", &self.output_path)?;
        validation::validate_non_empty_string("target_crs", &self.convert.target_crs)
    }
}

/// The suggested names are display names ("x/y"), so separators become `-`
/// and the file always lands directly inside `dir`.
pub fn safe_file_name(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect()
}

fn join_output(dir: &str, filename: &str) -> String {
    Path::new(dir)
        .join(safe_file_name(filename))
        .to_string_lossy()
        .into_owned()
}
