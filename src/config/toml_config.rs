use crate::core::proximity::ProximityStrategy;
use crate::core::reproject::ReprojectionPolicy;
use crate::domain::model::{
    DEFAULT_CSV_OUTPUT, DEFAULT_GEOJSON_OUTPUT, DEFAULT_RADII, DEFAULT_SOURCE_CRS, MAX_RADIUS,
    MIN_RADIUS, WGS84,
};
use crate::utils::error::{Result, SpatialError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub output: OutputConfig,
    pub proximity: ProximityConfig,
    pub shapefile: ShapefileConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "./output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    pub source_crs: String,
    pub target_crs: String,
    pub default_radii: Vec<u32>,
    pub strategy: ProximityStrategy,
    pub on_reprojection_error: ReprojectionPolicy,
    pub output_filename: String,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            source_crs: DEFAULT_SOURCE_CRS.to_string(),
            target_crs: WGS84.to_string(),
            default_radii: DEFAULT_RADII.to_vec(),
            strategy: ProximityStrategy::default(),
            on_reprojection_error: ReprojectionPolicy::default(),
            output_filename: DEFAULT_CSV_OUTPUT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapefileConfig {
    pub target_crs: String,
    pub fallback_source_crs: Option<String>,
    pub output_filename: String,
    pub pretty: bool,
    /// Parent directory for archive extraction; system temp when unset.
    pub temp_dir: Option<String>,
}

impl Default for ShapefileConfig {
    fn default() -> Self {
        Self {
            target_crs: WGS84.to_string(),
            fallback_source_crs: None,
            output_filename: DEFAULT_GEOJSON_OUTPUT.to_string(),
            pretty: false,
            temp_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SpatialError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PROJ_SOURCE_CRS})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SpatialError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

pub fn validate_radii(field_name: &str, radii: &[u32]) -> Result<()> {
    for &radius in radii {
        validation::validate_range(field_name, radius, MIN_RADIUS, MAX_RADIUS)?;
    }
    Ok(())
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("output.directory", &self.output.directory)?;

        validation::validate_non_empty_string("proximity.source_crs", &self.proximity.source_crs)?;
        validation::validate_non_empty_string("proximity.target_crs", &self.proximity.target_crs)?;
        validate_radii("proximity.default_radii", &self.proximity.default_radii)?;
        validation::validate_path(
            "proximity.output_filename",
            &self.proximity.output_filename,
        )?;

        validation::validate_non_empty_string("shapefile.target_crs", &self.shapefile.target_crs)?;
        if let Some(crs) = &self.shapefile.fallback_source_crs {
            validation::validate_non_empty_string("shapefile.fallback_source_crs", crs)?;
        }
        validation::validate_path(
            "shapefile.output_filename",
            &self.shapefile.output_filename,
        )?;
        if let Some(dir) = &self.shapefile.temp_dir {
            validation::validate_path("shapefile.temp_dir", dir)?;
        }

        Ok(())
    }
}
