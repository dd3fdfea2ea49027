//! Runs the whole sampling process: load the boundary and points, filter, reproject, clip,
//! generate the hex grid, reduce, and export.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};

use hexutil::{prettyprint_usize, Timer};

use crate::export::{self, ExportOutcome};
use crate::{build_samples, filter_by_year, reduce_with_stats, source, Config, HexGrid, ReduceStats};

/// The step that left nothing for the rest of the pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    EmptyStudyArea,
    YearFilter,
    Coordinates,
    StudyArea,
    HexGrid,
    Reduction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stage::EmptyStudyArea => write!(f, "the study area has no area"),
            Stage::YearFilter => write!(f, "no records within the year range"),
            Stage::Coordinates => write!(f, "no records with usable coordinates"),
            Stage::StudyArea => write!(f, "no points inside the study area"),
            Stage::HexGrid => write!(f, "no hexagons over the study area"),
            Stage::Reduction => write!(f, "no points inside any hexagon"),
        }
    }
}

#[derive(Debug)]
pub struct Report {
    pub records: usize,
    pub records_in_years: usize,
    pub samples: usize,
    pub samples_in_study_area: usize,
    pub tiles: usize,
    pub stats: ReduceStats,
    pub kept: usize,
    pub points_output: ExportOutcome,
    pub csv_output: PathBuf,
}

#[derive(Debug)]
pub enum PipelineOutcome {
    Completed(Report),
    /// Some stage came up empty. This isn't an error, but nothing was written.
    NoResults(Stage),
}

fn no_results(stage: Stage, timer: &mut Timer) -> Result<PipelineOutcome> {
    timer.warn(format!("Stopping early: {}", stage));
    Ok(PipelineOutcome::NoResults(stage))
}

/// Missing or unreadable inputs, missing columns, and unusable frames are errors. Stages that
/// come up empty, including a study area without any area, stop the run with `NoResults`.
pub fn run(config: &Config, timer: &mut Timer) -> Result<PipelineOutcome> {
    config.validate()?;
    let target = config.target_frame()?;
    let years = config.years()?;
    fs_err::create_dir_all(&config.output_dir)?;

    timer.start("prepare study area");
    let boundary = source::load_boundary(
        &config.boundary_path,
        config.boundary_frame()?.as_ref(),
        timer,
    )?;
    let area = boundary.into_study_area(&target)?;
    if area.is_empty() {
        timer.warn(format!(
            "The study area from {} is empty; check the boundary",
            config.boundary_path
        ));
        return no_results(Stage::EmptyStudyArea, timer);
    }
    timer.note(format!(
        "Study area covers {:.1} km^2 in {}",
        area.area() / 1_000_000.0,
        target
    ));
    timer.stop("prepare study area");

    timer.start("prepare points");
    let records = source::load_csv(&config.points_path, timer)?;
    let in_years = filter_by_year(&records, &config.year_column, years)?;
    if in_years.is_empty() {
        return no_results(Stage::YearFilter, timer);
    }
    let samples = build_samples(
        &in_years,
        &config.x_column,
        &config.y_column,
        Some(config.points_frame()?),
    )?;
    if samples.is_empty() {
        return no_results(Stage::Coordinates, timer);
    }
    let num_samples = samples.len();
    let samples = samples.reproject(&target)?.clip_to(&area)?;
    timer.note(format!(
        "{} of {} points are inside the study area",
        prettyprint_usize(samples.len()),
        prettyprint_usize(num_samples)
    ));
    if samples.is_empty() {
        return no_results(Stage::StudyArea, timer);
    }
    timer.stop("prepare points");

    timer.start("generate hex grid");
    let grid = HexGrid::generate_with_options(
        &area,
        config.hexagon_radius_meters,
        &target,
        config.grid,
    )?;
    timer.note(format!(
        "{} hexagons with radius {}m",
        prettyprint_usize(grid.len()),
        config.hexagon_radius_meters
    ));
    if grid.is_empty() {
        return no_results(Stage::HexGrid, timer);
    }
    timer.stop("generate hex grid");

    timer.start("reduce");
    let (kept, stats) = reduce_with_stats(&samples, &grid)?;
    timer.note(format!(
        "Kept {} of {} points, one per occupied hexagon",
        prettyprint_usize(kept.len()),
        prettyprint_usize(samples.len())
    ));
    if kept.is_empty() {
        return no_results(Stage::Reduction, timer);
    }
    timer.stop("reduce");

    timer.start("export");
    let points_output = export::export_points(&kept, &config.points_output_path());
    match points_output {
        ExportOutcome::Primary(_) => {}
        ExportOutcome::Fallback { ref path, .. } => {
            timer.warn(format!("Points were written as GeoJSON to {}", path.display()));
        }
        ExportOutcome::Failed { .. } => {
            timer.warn("Couldn't write the points as FlatGeobuf or GeoJSON");
        }
    }
    let csv_output = config.csv_output_path()?;
    export::write_csv(&kept, &csv_output)
        .with_context(|| format!("writing {}", csv_output.display()))?;
    timer.stop("export");

    Ok(PipelineOutcome::Completed(Report {
        records: records.len(),
        records_in_years: in_years.len(),
        samples: num_samples,
        samples_in_study_area: samples.len(),
        tiles: grid.len(),
        stats,
        kept: kept.len(),
        points_output,
        csv_output,
    }))
}
