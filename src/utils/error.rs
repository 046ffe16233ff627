use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpatialError {
    #[error("CSV parse error: {message}")]
    ParseError { message: String },

    #[error("None of {aliases:?} found in columns {headers:?} (looking for {field})")]
    ColumnNotFoundError {
        field: String,
        aliases: Vec<String>,
        headers: Vec<String>,
    },

    #[error("Reprojection failed: {message}")]
    ReprojectionError { message: String },

    #[error("No .shp file found in archive (entries: {entries:?})")]
    NoGeometryFileError { entries: Vec<String> },

    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    #[error("Record {record} has an unsupported geometry: {message}")]
    InvalidGeometryError { record: usize, message: String },

    #[error("Shapefile read error: {0}")]
    ShapefileError(#[from] shapefile::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Transform,
    Configuration,
    System,
}

impl SpatialError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    pub fn reprojection(message: impl Into<String>) -> Self {
        Self::ReprojectionError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ParseError { .. }
            | Self::ColumnNotFoundError { .. }
            | Self::NoGeometryFileError { .. }
            | Self::ArchiveError(_)
            | Self::InvalidGeometryError { .. }
            | Self::ShapefileError(_) => ErrorCategory::Input,
            Self::ReprojectionError { .. } | Self::SerializationError(_) => {
                ErrorCategory::Transform
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    /// 給使用者看的單行訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ParseError { message } => {
                format!("The uploaded file is not a well-formed CSV: {}", message)
            }
            Self::ColumnNotFoundError {
                aliases, headers, ..
            } => format!(
                "None of {:?} found in columns {:?}",
                aliases, headers
            ),
            Self::ReprojectionError { message } => {
                format!("Coordinates could not be reprojected: {}", message)
            }
            Self::NoGeometryFileError { .. } => {
                "No .shp file found in the uploaded archive".to_string()
            }
            Self::ArchiveError(e) => format!("The uploaded file is not a valid zip archive: {}", e),
            Self::ShapefileError(e) => format!("The shapefile could not be read: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ParseError { .. } => "Check that the file is comma-delimited and has a header row",
            Self::ColumnNotFoundError { .. } => {
                "Rename the coordinate columns to Easting/Northing (or East/North, X/Y)"
            }
            Self::ReprojectionError { .. } => {
                "Check the coordinate values and the configured source CRS"
            }
            Self::NoGeometryFileError { .. } => {
                "Zip the .shp together with its .shx, .dbf and .prj companions"
            }
            Self::ArchiveError(_) => "Upload a .zip archive containing the shapefile",
            Self::InvalidGeometryError { .. } => "Repair or remove the offending record and re-export",
            Self::ShapefileError(_) => "Make sure the .shp, .shx and .dbf files share one basename",
            Self::IoError(_) => "Check file paths and permissions",
            Self::SerializationError(_) => "Report this input; the output could not be encoded",
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file or CLI flags"
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input => 1,
            ErrorCategory::Transform => 2,
            ErrorCategory::Configuration => 3,
            ErrorCategory::System => 4,
        }
    }
}

impl From<csv::Error> for SpatialError {
    fn from(e: csv::Error) -> Self {
        Self::parse(e.to_string())
    }
}

impl From<proj::ProjCreateError> for SpatialError {
    fn from(e: proj::ProjCreateError) -> Self {
        Self::reprojection(e.to_string())
    }
}

impl From<proj::ProjError> for SpatialError {
    fn from(e: proj::ProjError) -> Self {
        Self::reprojection(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpatialError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_not_found_message_lists_aliases_and_headers() {
        let err = SpatialError::ColumnNotFoundError {
            field: "easting".to_string(),
            aliases: vec!["easting".to_string(), "east".to_string(), "x".to_string()],
            headers: vec!["id".to_string(), "Northing".to_string()],
        };

        let message = err.user_friendly_message();
        assert!(message.contains("east"));
        assert!(message.contains("Northing"));
        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_exit_codes_follow_category() {
        assert_eq!(SpatialError::parse("bad").exit_code(), 1);
        assert_eq!(SpatialError::reprojection("bad").exit_code(), 2);
        let config_err = SpatialError::ConfigValidationError {
            field: "proximity.strategy".to_string(),
            message: "unknown".to_string(),
        };
        assert_eq!(config_err.exit_code(), 3);
    }
}
