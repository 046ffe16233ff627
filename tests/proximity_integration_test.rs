use anyhow::Result;
use spatial_etl::config::ProximityOverrides;
use spatial_etl::core::proximity::ProximityStrategy;
use spatial_etl::core::reproject::{reproject_points, ReprojectionPolicy};
use spatial_etl::core::CoordinateTransformer;
use spatial_etl::domain::model::Point;
use spatial_etl::{
    EtlEngine, LocalStorage, ProjFactory, ProjTransformer, ProximityPipeline, ProximitySettings,
    SpatialError, TomlConfig,
};
use tempfile::TempDir;

fn settings_for(dir: &TempDir, input: &str, overrides: ProximityOverrides) -> ProximitySettings {
    ProximitySettings::resolve(
        &TomlConfig::default(),
        dir.path().join(input).to_string_lossy().into_owned(),
        ProximityOverrides {
            output_dir: Some(dir.path().join("output").to_string_lossy().into_owned()),
            ..overrides
        },
    )
}

#[test]
fn test_mga56_reference_point_maps_to_central_meridian() -> Result<()> {
    let transformer = ProjTransformer::new("EPSG:7856", "EPSG:4326")?;

    // zone 56 central meridian on the equator
    let (lon, lat) = transformer.transform(500000.0, 10000000.0)?;

    assert!((lon - 153.0).abs() < 1e-6, "lon was {}", lon);
    assert!(lat.abs() < 1e-6, "lat was {}", lat);
    Ok(())
}

#[test]
fn test_sydney_coordinate_lands_in_sydney() -> Result<()> {
    let transformer = ProjTransformer::new("EPSG:7856", "EPSG:4326")?;

    let (lon, lat) = transformer.transform(334000.0, 6252000.0)?;

    assert!((151.0..151.4).contains(&lon), "lon was {}", lon);
    assert!((-34.0..-33.7).contains(&lat), "lat was {}", lat);
    Ok(())
}

#[test]
fn test_nan_input_propagates_without_aborting_batch() -> Result<()> {
    let transformer = ProjTransformer::new("EPSG:7856", "EPSG:4326")?;
    let points = vec![
        Point::new(f64::NAN, 6252000.0),
        Point::new(334000.0, 6252000.0),
    ];

    let (lons, lats) = reproject_points(&transformer, &points, ReprojectionPolicy::Nan)?;

    assert_eq!(lons.len(), 2);
    assert!(lons[0].is_nan() && lats[0].is_nan());
    assert!(lons[1].is_finite() && lats[1].is_finite());
    Ok(())
}

#[test]
fn test_unknown_crs_is_reprojection_error() {
    let err = ProjTransformer::new("EPSG:999999", "EPSG:4326").err();
    assert!(matches!(err, Some(SpatialError::ReprojectionError { .. })));
}

#[tokio::test]
async fn test_end_to_end_proximity_csv() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join("survey.csv"),
        "Point,Easting,Northing,Code\n\
         P1,334000,6252000,TREE\n\
         P2,334000,6252004,TREE\n\
         P3,334000,6252009,POLE\n\
         P4,334500,6252500,PIT\n",
    )?;

    let settings = settings_for(
        &dir,
        "survey.csv",
        ProximityOverrides {
            radii: Some(vec![5, 10]),
            ..ProximityOverrides::default()
        },
    );
    let pipeline = ProximityPipeline::new(LocalStorage::new(String::new()), ProjFactory, settings);
    let output_path = EtlEngine::new(pipeline).run().await?;

    assert!(output_path.ends_with("Updated CSV with x-y and radius marked.csv"));

    // one flat file, no directory split out of the "x/y" display name
    let entries: Vec<std::fs::DirEntry> =
        std::fs::read_dir(dir.path().join("output"))?.collect::<std::result::Result<_, _>>()?;
    assert_eq!(entries.len(), 1);
    assert!(entries[0].file_type()?.is_file());
    assert_eq!(
        entries[0].file_name().to_string_lossy(),
        "Updated CSV with x-y and radius marked.csv"
    );

    let mut reader = csv::Reader::from_path(&output_path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    assert_eq!(
        headers,
        vec!["Point", "Easting", "Northing", "Code", "X", "Y", "Within_5m", "Within_10m"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    assert_eq!(rows.len(), 4);
    let ids: Vec<&str> = rows.iter().map(|r| &r[0]).collect();
    assert_eq!(ids, vec!["P1", "P2", "P3", "P4"]);

    let within_5: Vec<&str> = rows.iter().map(|r| &r[6]).collect();
    let within_10: Vec<&str> = rows.iter().map(|r| &r[7]).collect();
    assert_eq!(within_5, vec!["1", "1", "1", "0"]);
    assert_eq!(within_10, vec!["1", "1", "1", "0"]);

    for row in &rows {
        let lon: f64 = row[4].parse()?;
        let lat: f64 = row[5].parse()?;
        assert!((150.0..153.0).contains(&lon));
        assert!((-35.0..-33.0).contains(&lat));
    }
    Ok(())
}

#[tokio::test]
async fn test_rtree_strategy_matches_matrix_output() -> Result<()> {
    let dir = TempDir::new()?;
    let mut csv = String::from("east,north\n");
    for i in 0..40 {
        csv.push_str(&format!("{},{}\n", 334000 + (i * 7) % 23, 6252000 + (i * 5) % 17));
    }
    std::fs::write(dir.path().join("grid.csv"), csv)?;

    let mut outputs = Vec::new();
    for (strategy, name) in [
        (ProximityStrategy::Matrix, "matrix.csv"),
        (ProximityStrategy::Rtree, "rtree.csv"),
    ] {
        let settings = settings_for(
            &dir,
            "grid.csv",
            ProximityOverrides {
                radii: Some(vec![1, 2, 3]),
                strategy: Some(strategy),
                output_filename: Some(name.to_string()),
                ..ProximityOverrides::default()
            },
        );
        let pipeline =
            ProximityPipeline::new(LocalStorage::new(String::new()), ProjFactory, settings);
        let path = EtlEngine::new(pipeline).run().await?;
        outputs.push(std::fs::read_to_string(path)?);
    }

    assert_eq!(outputs[0], outputs[1]);
    Ok(())
}

#[tokio::test]
async fn test_missing_columns_produce_no_output_file() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("bad.csv"), "id,lat,lon\n1,-33.8,151.2\n")?;

    let settings = settings_for(&dir, "bad.csv", ProximityOverrides::default());
    let output_path = settings.output_path.clone();
    let pipeline = ProximityPipeline::new(LocalStorage::new(String::new()), ProjFactory, settings);

    let result = EtlEngine::new(pipeline).run().await;

    match result {
        Err(SpatialError::ColumnNotFoundError { aliases, headers, .. }) => {
            assert_eq!(aliases, vec!["Easting", "east", "X"]);
            assert_eq!(headers, vec!["id", "lat", "lon"]);
        }
        other => panic!("expected ColumnNotFoundError, got {:?}", other),
    }
    assert!(!std::path::Path::new(&output_path).exists());
    Ok(())
}
