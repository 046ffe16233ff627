use crate::core::columns::{find_column, EASTING, NORTHING};
use crate::core::proximity::{proximity_flags, ProximityStrategy};
use crate::core::records::numeric_column;
use crate::core::reproject::{reproject_points, ReprojectionPolicy};
use crate::domain::model::{AnnotatedRecordSet, Point, RadiusSelection, RecordSet};
use crate::domain::ports::CoordinateTransformer;
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotateOptions {
    pub strategy: ProximityStrategy,
    pub on_reprojection_error: ReprojectionPolicy,
}

/// Record set + radii → annotated record set.
///
/// Column detection runs before anything else so a missing column never
/// produces partial output. Distances use the planar source coordinates; the
/// transformer is only used for the X/Y output columns.
pub fn annotate_records(
    records: RecordSet,
    radii: &RadiusSelection,
    transformer: &dyn CoordinateTransformer,
    options: AnnotateOptions,
) -> Result<AnnotatedRecordSet> {
    let (easting_index, easting_column) = find_column(&records.headers, &EASTING)?;
    let (northing_index, northing_column) = find_column(&records.headers, &NORTHING)?;
    tracing::debug!(
        "Detected coordinate columns: easting='{}', northing='{}'",
        easting_column,
        northing_column
    );

    let eastings = numeric_column(&records, easting_index)?;
    let northings = numeric_column(&records, northing_index)?;
    let points: Vec<Point> = eastings
        .into_iter()
        .zip(northings)
        .map(|(x, y)| Point::new(x, y))
        .collect();

    let (lon, lat) = reproject_points(transformer, &points, options.on_reprojection_error)?;

    let flags = proximity_flags(&points, radii.as_slice(), options.strategy);
    for (radius, values) in &flags {
        tracing::debug!(
            "Within_{}m: {} of {} records flagged",
            radius,
            values.iter().filter(|&&v| v == 1).count(),
            values.len()
        );
    }

    Ok(AnnotatedRecordSet {
        records,
        easting_column,
        northing_column,
        lon,
        lat,
        flags,
    })
}
