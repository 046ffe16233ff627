use crate::domain::model::Point;
use crate::domain::ports::{CoordinateTransformer, TransformerFactory};
use crate::utils::error::{Result, SpatialError};
use proj::Proj;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What to do when a single row cannot be reprojected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReprojectionPolicy {
    /// Emit NaN lon/lat for that row and keep going.
    #[default]
    Nan,
    /// Fail the whole batch.
    Abort,
}

impl FromStr for ReprojectionPolicy {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nan" => Ok(Self::Nan),
            "abort" => Ok(Self::Abort),
            other => Err(SpatialError::InvalidConfigValueError {
                field: "on_reprojection_error".to_string(),
                value: other.to_string(),
                reason: "Valid values: nan, abort".to_string(),
            }),
        }
    }
}

/// PROJ-backed transformer. Axis order is normalized so input and output are
/// always easting/longitude first.
pub struct ProjTransformer {
    proj: Proj,
    description: String,
}

impl ProjTransformer {
    pub fn new(source_crs: &str, target_crs: &str) -> Result<Self> {
        let proj = Proj::new_known_crs(source_crs, target_crs, None).map_err(|e| {
            SpatialError::reprojection(format!(
                "cannot build transform {} -> {}: {}",
                summarize_crs(source_crs),
                target_crs,
                e
            ))
        })?;

        Ok(Self {
            proj,
            description: format!("{} -> {}", summarize_crs(source_crs), target_crs),
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl CoordinateTransformer for ProjTransformer {
    fn transform(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let (lon, lat) = self.proj.convert((x, y))?;
        Ok((lon, lat))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjFactory;

impl TransformerFactory for ProjFactory {
    fn create(&self, source_crs: &str, target_crs: &str) -> Result<Box<dyn CoordinateTransformer>> {
        let transformer = ProjTransformer::new(source_crs, target_crs)?;
        tracing::debug!("Built transformer {}", transformer.description());
        Ok(Box::new(transformer))
    }
}

// WKT 可能很長，log 只留第一段
fn summarize_crs(crs: &str) -> String {
    let trimmed = crs.trim();
    match trimmed.find(',') {
        Some(idx) if trimmed.len() > 60 => format!("{}...", &trimmed[..idx]),
        _ => trimmed.to_string(),
    }
}

/// Reprojects every point, one output pair per input point, in order.
///
/// Non-finite inputs never reach the transformer and come back as NaN. A
/// transformer error or a non-finite result is handled per `policy`.
pub fn reproject_points(
    transformer: &dyn CoordinateTransformer,
    points: &[Point],
    policy: ReprojectionPolicy,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut lons = Vec::with_capacity(points.len());
    let mut lats = Vec::with_capacity(points.len());
    let mut failures = 0usize;

    for (row, point) in points.iter().enumerate() {
        if !point.is_finite() {
            lons.push(f64::NAN);
            lats.push(f64::NAN);
            continue;
        }

        let outcome = match transformer.transform(point.x, point.y) {
            Ok((lon, lat)) if lon.is_finite() && lat.is_finite() => Ok((lon, lat)),
            Ok((lon, lat)) => Err(SpatialError::reprojection(format!(
                "({}, {}) mapped outside the target domain ({}, {})",
                point.x, point.y, lon, lat
            ))),
            Err(e) => Err(e),
        };

        match outcome {
            Ok((lon, lat)) => {
                lons.push(lon);
                lats.push(lat);
            }
            Err(e) => match policy {
                ReprojectionPolicy::Abort => {
                    return Err(SpatialError::reprojection(format!("row {}: {}", row + 1, e)));
                }
                ReprojectionPolicy::Nan => {
                    failures += 1;
                    tracing::warn!("⚠️ Row {} could not be reprojected: {}", row + 1, e);
                    lons.push(f64::NAN);
                    lats.push(f64::NAN);
                }
            },
        }
    }

    if failures > 0 {
        tracing::warn!("{} of {} rows left without lon/lat", failures, points.len());
    }

    Ok((lons, lats))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Shifts and scales so results are easy to predict; refuses negative x.
    pub(crate) struct FakeTransformer;

    impl CoordinateTransformer for FakeTransformer {
        fn transform(&self, x: f64, y: f64) -> Result<(f64, f64)> {
            if x < 0.0 {
                return Err(SpatialError::reprojection("negative easting"));
            }
            Ok((100.0 + x / 1000.0, -(y / 1000.0)))
        }
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("nan".parse::<ReprojectionPolicy>().unwrap(), ReprojectionPolicy::Nan);
        assert_eq!(" ABORT".parse::<ReprojectionPolicy>().unwrap(), ReprojectionPolicy::Abort);
        assert!("skip".parse::<ReprojectionPolicy>().is_err());
    }

    #[test]
    fn test_preserves_length_and_order() {
        let points = vec![
            Point::new(1000.0, 2000.0),
            Point::new(3000.0, 4000.0),
            Point::new(5000.0, 6000.0),
        ];

        let (lons, lats) =
            reproject_points(&FakeTransformer, &points, ReprojectionPolicy::Nan).unwrap();

        assert_eq!(lons, vec![101.0, 103.0, 105.0]);
        assert_eq!(lats, vec![-2.0, -4.0, -6.0]);
    }

    #[test]
    fn test_non_finite_input_becomes_nan() {
        let points = vec![Point::new(f64::NAN, 2000.0), Point::new(1000.0, 2000.0)];

        let (lons, lats) =
            reproject_points(&FakeTransformer, &points, ReprojectionPolicy::Abort).unwrap();

        assert!(lons[0].is_nan() && lats[0].is_nan());
        assert_eq!(lons[1], 101.0);
    }

    #[test]
    fn test_row_failure_under_nan_policy() {
        let points = vec![Point::new(-1.0, 0.0), Point::new(2000.0, 0.0)];

        let (lons, _) = reproject_points(&FakeTransformer, &points, ReprojectionPolicy::Nan).unwrap();

        assert_eq!(lons.len(), 2);
        assert!(lons[0].is_nan());
        assert_eq!(lons[1], 102.0);
    }

    #[test]
    fn test_row_failure_under_abort_policy() {
        let points = vec![Point::new(2000.0, 0.0), Point::new(-1.0, 0.0)];

        let err = reproject_points(&FakeTransformer, &points, ReprojectionPolicy::Abort).unwrap_err();

        assert!(matches!(err, SpatialError::ReprojectionError { .. }));
        assert!(err.to_string().contains("row 2"));
    }
}
