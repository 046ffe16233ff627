use crate::domain::model::GeoJsonOutput;
use crate::domain::ports::{CoordinateTransformer, TransformerFactory};
use crate::utils::error::{Result, SpatialError};
use geo::{Coord, Geometry, MapCoords};
use geojson::{Feature, FeatureCollection};
use serde_json::{Map, Number, Value};
use shapefile::dbase::{FieldValue, Record};
use shapefile::Shape;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub target_crs: String,
    /// Used when the archive carries no `.prj`.
    pub fallback_source_crs: Option<String>,
    pub pretty: bool,
    /// Where the per-call extraction directory is created; system temp when unset.
    pub temp_root: Option<PathBuf>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            target_crs: crate::domain::model::WGS84.to_string(),
            fallback_source_crs: None,
            pretty: false,
            temp_root: None,
        }
    }
}

fn is_resource_fork(path: &Path) -> bool {
    path.components()
        .next()
        .map(|c| c.as_os_str() == "__MACOSX")
        .unwrap_or(false)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Opens the archive and counts its file entries.
pub fn inspect_archive(bytes: &[u8]) -> Result<usize> {
    let archive = ZipArchive::new(Cursor::new(bytes))?;
    Ok(archive.len())
}

/// The first `.shp` entry in archive order. When an archive holds several,
/// later ones are ignored.
fn locate_geometry_file<R: std::io::Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<PathBuf> {
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        entries.push(entry.name().to_string());
        if entry.is_dir() {
            continue;
        }
        if let Some(path) = entry.enclosed_name() {
            if !is_resource_fork(&path) && has_extension(&path, "shp") {
                return Ok(path);
            }
        }
    }

    Err(SpatialError::NoGeometryFileError { entries })
}

fn read_projection(shp_path: &Path) -> Result<Option<String>> {
    for extension in ["prj", "PRJ"] {
        let candidate = shp_path.with_extension(extension);
        if candidate.is_file() {
            let wkt = std::fs::read_to_string(&candidate)?;
            let wkt = wkt.trim();
            if !wkt.is_empty() {
                return Ok(Some(wkt.to_string()));
            }
        }
    }
    Ok(None)
}

fn json_number(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

fn field_to_json(value: FieldValue) -> Value {
    match value {
        FieldValue::Character(s) => s.map(Value::String).unwrap_or(Value::Null),
        FieldValue::Memo(s) => Value::String(s),
        FieldValue::Numeric(n) => n.map(json_number).unwrap_or(Value::Null),
        FieldValue::Float(f) => f.map(|f| json_number(f64::from(f))).unwrap_or(Value::Null),
        FieldValue::Double(d) | FieldValue::Currency(d) => json_number(d),
        FieldValue::Integer(i) => Value::from(i),
        FieldValue::Logical(b) => b.map(Value::Bool).unwrap_or(Value::Null),
        // ISO 8601
        FieldValue::Date(d) => d
            .map(|d| Value::String(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())))
            .unwrap_or(Value::Null),
        FieldValue::DateTime(dt) => {
            let (date, time) = (dt.date(), dt.time());
            Value::String(format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
                date.year(),
                date.month(),
                date.day(),
                time.hours(),
                time.minutes(),
                time.seconds()
            ))
        }
        #[allow(unreachable_patterns)]
        other => Value::String(format!("{:?}", other)),
    }
}

fn record_properties(record: Record) -> Map<String, Value> {
    record
        .into_iter()
        .map(|(name, value)| (name, field_to_json(value)))
        .collect()
}

fn reproject_geometry(
    geometry: &Geometry<f64>,
    transformer: &dyn CoordinateTransformer,
) -> Result<Geometry<f64>> {
    geometry.try_map_coords(|c: Coord<f64>| {
        let (x, y) = transformer.transform(c.x, c.y)?;
        if !x.is_finite() || !y.is_finite() {
            return Err(SpatialError::reprojection(format!(
                "({}, {}) has no finite position in the target CRS",
                c.x, c.y
            )));
        }
        Ok(Coord { x, y })
    })
}

fn shape_to_geometry(shape: Shape, record_index: usize) -> Result<Option<Geometry<f64>>> {
    if let Shape::NullShape = shape {
        return Ok(None);
    }
    Geometry::<f64>::try_from(shape)
        .map(Some)
        .map_err(|e| SpatialError::InvalidGeometryError {
            record: record_index,
            message: format!("{:?}", e),
        })
}

fn read_features(shp_path: &Path, transformer: &dyn CoordinateTransformer) -> Result<Vec<Feature>> {
    let mut reader = shapefile::Reader::from_path(shp_path)?;
    let mut features = Vec::new();

    for (index, item) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = item?;
        let geometry = match shape_to_geometry(shape, index)? {
            Some(g) => Some(reproject_geometry(&g, transformer)?),
            None => None,
        };

        features.push(Feature {
            bbox: None,
            geometry: geometry.map(|g| geojson::Geometry::new(geojson::Value::from(&g))),
            id: None,
            properties: Some(record_properties(record)),
            foreign_members: None,
        });
    }

    Ok(features)
}

/// Archive bytes → GeoJSON FeatureCollection in the target CRS.
///
/// Entries are unpacked into a fresh temporary directory which is removed
/// when this returns, whether or not conversion succeeded.
pub fn convert_archive(
    bytes: &[u8],
    factory: &dyn TransformerFactory,
    options: &ConvertOptions,
) -> Result<GeoJsonOutput> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let relative_shp = locate_geometry_file(&mut archive)?;

    let workdir = match &options.temp_root {
        Some(root) => tempfile::Builder::new()
            .prefix("spatial-etl-")
            .tempdir_in(root)?,
        None => tempfile::Builder::new().prefix("spatial-etl-").tempdir()?,
    };
    archive.extract(workdir.path())?;
    let shp_path = workdir.path().join(&relative_shp);
    tracing::debug!("Extracted archive to {}", workdir.path().display());

    let source_crs = match read_projection(&shp_path)? {
        Some(wkt) => wkt,
        None => match &options.fallback_source_crs {
            Some(crs) => {
                tracing::warn!(
                    "⚠️ {} has no .prj, assuming {}",
                    relative_shp.display(),
                    crs
                );
                crs.clone()
            }
            None => {
                return Err(SpatialError::reprojection(format!(
                    "{} has no .prj and no fallback source CRS is configured",
                    relative_shp.display()
                )))
            }
        },
    };

    let transformer = factory.create(&source_crs, &options.target_crs)?;
    let features = read_features(&shp_path, transformer.as_ref())?;
    let feature_count = features.len();
    tracing::info!(
        "🗺️ Read {} features from {}",
        feature_count,
        relative_shp.display()
    );

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    let document = if options.pretty {
        serde_json::to_string_pretty(&collection)?
    } else {
        serde_json::to_string(&collection)?
    };

    workdir.close()?;

    Ok(GeoJsonOutput {
        document,
        feature_count,
        source_crs,
    })
}
