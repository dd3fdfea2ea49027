use anyhow::Result;

use hexsample::export::ExportOutcome;
use hexsample::pipeline::{self, PipelineOutcome};
use hexsample::{Config, RowStep, TileShape};
use hexutil::{prettyprint_usize, Timer};

/// Flags that replace whatever the config file says
pub struct Overrides {
    pub points: Option<String>,
    pub boundary: Option<String>,
    pub output_dir: Option<String>,
    pub radius: Option<f64>,
    pub min_year: Option<i64>,
    pub max_year: Option<i64>,
    pub target_frame: Option<String>,
    pub clip_tiles: bool,
    pub standard_rows: bool,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(points) = self.points {
            config.points_path = points;
        }
        if let Some(boundary) = self.boundary {
            config.boundary_path = boundary;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(radius) = self.radius {
            config.hexagon_radius_meters = radius;
        }
        if let Some(year) = self.min_year {
            config.min_year = year;
        }
        if let Some(year) = self.max_year {
            config.max_year = year;
        }
        if let Some(frame) = self.target_frame {
            config.target_frame = frame;
        }
        if self.clip_tiles {
            config.grid.shape = TileShape::Clipped;
        }
        if self.standard_rows {
            config.grid.row_step = RowStep::Standard;
        }
    }
}

pub fn run(config_path: Option<String>, overrides: Overrides) -> Result<()> {
    let mut config = match config_path {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    overrides.apply(&mut config);

    let mut timer = Timer::new("sample points by hexagon");
    match pipeline::run(&config, &mut timer)? {
        PipelineOutcome::NoResults(stage) => {
            println!("Nothing to write: {}", stage);
        }
        PipelineOutcome::Completed(report) => {
            println!(
                "Kept {} of {} points across {} hexagons",
                prettyprint_usize(report.kept),
                prettyprint_usize(report.samples_in_study_area),
                prettyprint_usize(report.tiles)
            );
            println!("Wrote {}", report.csv_output.display());
            match report.points_output {
                ExportOutcome::Primary(path) => println!("Wrote {}", path.display()),
                ExportOutcome::Fallback {
                    path,
                    primary_error,
                } => {
                    println!(
                        "Wrote {} instead, because FlatGeobuf failed: {:#}",
                        path.display(),
                        primary_error
                    );
                }
                failed @ ExportOutcome::Failed { .. } => {
                    failed.into_result()?;
                }
            }
        }
    }
    Ok(())
}
