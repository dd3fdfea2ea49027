use std::path::PathBuf;

use hexsample::export::ExportOutcome;
use hexsample::pipeline::{run, PipelineOutcome, Stage};
use hexsample::Config;
use hexutil::Timer;

const POINTS: &str = "\
pano_id,lon,lat,year
p1,52,75,2022
p2,60,80,2021
p3,125,73.2,2020
p4,130,70,2023.0
p5,300,300,2021
p6,,50,2021
p7,40,40,unknown
";

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hexsample_pipeline_{}", name));
    let _ = fs_err::remove_dir_all(&dir);
    fs_err::create_dir_all(&dir).unwrap();
    dir
}

fn rectangle(x1: f64, y1: f64, x2: f64, y2: f64) -> String {
    format!(
        r#"{{"type": "FeatureCollection", "features": [{{"type": "Feature", "properties": {{}},
            "geometry": {{"type": "Polygon", "coordinates": [[[{x1}, {y1}], [{x2}, {y1}], [{x2}, {y2}], [{x1}, {y2}], [{x1}, {y1}]]]}}}}]}}"#,
        x1 = x1,
        y1 = y1,
        x2 = x2,
        y2 = y2
    )
}

/// A 200m square in a local meter grid, with POINTS as the candidates
fn local_setup(name: &str) -> Config {
    let dir = scratch_dir(name);
    fs_err::write(dir.join("boundary.geojson"), rectangle(0.0, 0.0, 200.0, 200.0)).unwrap();
    fs_err::write(dir.join("points.csv"), POINTS).unwrap();
    Config {
        points_path: dir.join("points.csv").display().to_string(),
        boundary_path: dir.join("boundary.geojson").display().to_string(),
        boundary_frame: Some("LOCAL:site".to_string()),
        output_dir: dir.join("out").display().to_string(),
        points_frame: "LOCAL:site".to_string(),
        target_frame: "LOCAL:site".to_string(),
        ..Default::default()
    }
}

fn completed(outcome: PipelineOutcome) -> hexsample::pipeline::Report {
    match outcome {
        PipelineOutcome::Completed(report) => report,
        PipelineOutcome::NoResults(stage) => panic!("stopped early: {}", stage),
    }
}

#[test]
fn end_to_end_in_a_local_frame() {
    let config = local_setup("local");
    let report = completed(run(&config, &mut Timer::throwaway()).unwrap());

    assert_eq!(report.records, 7);
    assert_eq!(report.records_in_years, 5);
    assert_eq!(report.samples, 4);
    assert_eq!(report.samples_in_study_area, 3);
    assert_eq!(report.tiles, 27);
    assert_eq!(report.stats.occupied_tiles, 2);
    assert_eq!(report.kept, 2);

    match report.points_output {
        ExportOutcome::Primary(ref path) => {
            assert_eq!(path, &config.points_output_path());
            assert!(path.exists());
        }
        ref other => panic!("expected FlatGeobuf output, got {:?}", other),
    }

    assert_eq!(report.csv_output, config.csv_output_path().unwrap());
    assert!(report.csv_output.ends_with("panorama_id_2021-2023.csv"));
    let csv = fs_err::read_to_string(&report.csv_output).unwrap();
    assert_eq!(
        csv,
        "pano_id,lon,lat,year,coord_X_projected,coord_Y_projected\n\
         p1,52,75,2022,52,75\n\
         p4,130,70,2023,130,70\n"
    );
}

#[test]
fn geographic_inputs_are_projected() {
    let dir = scratch_dir("utm");
    fs_err::write(
        dir.join("boundary.geojson"),
        rectangle(-122.43, 37.77, -122.41, 37.78),
    )
    .unwrap();
    fs_err::write(
        dir.join("points.csv"),
        "pano_id,lon,lat,year\nsf,-122.4194,37.7749,2022\nfar,-122.0,37.0,2022\n",
    )
    .unwrap();
    let config = Config {
        points_path: dir.join("points.csv").display().to_string(),
        boundary_path: dir.join("boundary.geojson").display().to_string(),
        output_dir: dir.join("out").display().to_string(),
        ..Default::default()
    };

    let report = completed(run(&config, &mut Timer::throwaway()).unwrap());
    assert_eq!(report.samples_in_study_area, 1);
    // Rows of hexagons overlap, so the one point may win more than one of them
    assert!(report.kept >= 1);
    assert_eq!(report.kept, report.stats.occupied_tiles);
    assert_eq!(report.stats.unmatched_samples, 0);
    let csv = fs_err::read_to_string(&report.csv_output).unwrap();
    assert_eq!(csv.lines().count(), 1 + report.kept);
    let row = csv.lines().nth(1).unwrap();
    let fields: Vec<&str> = row.split(',').collect();
    assert_eq!(&fields[0..4], &["sf", "-122.4194", "37.7749", "2022"]);
    let x: f64 = fields[4].parse().unwrap();
    let y: f64 = fields[5].parse().unwrap();
    assert!((x - 551_130.768).abs() < 0.01, "{}", x);
    assert!((y - 4_180_998.882).abs() < 0.01, "{}", y);
}

#[test]
fn empty_stages_stop_early() {
    let mut config = local_setup("empty_years");
    config.min_year = 1990;
    config.max_year = 1999;
    match run(&config, &mut Timer::throwaway()).unwrap() {
        PipelineOutcome::NoResults(stage) => assert_eq!(stage, Stage::YearFilter),
        other => panic!("expected no results, got {:?}", other),
    }
    assert!(!config.csv_output_path().unwrap().exists());

    let config = local_setup("outside");
    fs_err::write(
        &config.points_path,
        "pano_id,lon,lat,year\na,500,500,2021\nb,-10,0,2022\n",
    )
    .unwrap();
    match run(&config, &mut Timer::throwaway()).unwrap() {
        PipelineOutcome::NoResults(stage) => assert_eq!(stage, Stage::StudyArea),
        other => panic!("expected no results, got {:?}", other),
    }

    let config = local_setup("no_coordinates");
    fs_err::write(&config.points_path, "pano_id,lon,lat,year\na,,,2021\n").unwrap();
    match run(&config, &mut Timer::throwaway()).unwrap() {
        PipelineOutcome::NoResults(stage) => assert_eq!(stage, Stage::Coordinates),
        other => panic!("expected no results, got {:?}", other),
    }
}

#[test]
fn empty_study_area_stops_early() {
    let config = local_setup("empty_area");
    // Every vertex is on one line
    fs_err::write(
        &config.boundary_path,
        r#"{"type": "Polygon", "coordinates": [[[0, 0], [100, 0], [200, 0], [0, 0]]]}"#,
    )
    .unwrap();
    match run(&config, &mut Timer::throwaway()).unwrap() {
        PipelineOutcome::NoResults(stage) => assert_eq!(stage, Stage::EmptyStudyArea),
        other => panic!("expected no results, got {:?}", other),
    }
    assert!(!config.csv_output_path().unwrap().exists());
}

#[test]
fn fatal_inputs() {
    let mut config = local_setup("missing_points");
    config.points_path = "/definitely/not/here.csv".to_string();
    assert!(run(&config, &mut Timer::throwaway()).is_err());

    let mut config = local_setup("missing_column");
    config.year_column = "captured".to_string();
    assert!(run(&config, &mut Timer::throwaway()).is_err());

    let mut config = local_setup("bad_frame");
    config.target_frame = "EPSG:999999".to_string();
    assert!(run(&config, &mut Timer::throwaway()).is_err());

    // The points are in a frame that can't be related to the study area's
    let mut config = local_setup("mismatched_frames");
    config.points_frame = "EPSG:4326".to_string();
    assert!(run(&config, &mut Timer::throwaway()).is_err());
}
