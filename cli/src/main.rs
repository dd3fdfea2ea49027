//! Command-line front-end for picking one street-view sample per hexagon over a study area.

#[macro_use]
extern crate log;

mod grid;
mod sample;

use anyhow::Result;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(
    name = "hexsample",
    about = "Picks spatially spread out sample points using a hexagon grid"
)]
enum Command {
    /// Runs the whole pipeline: filter the points by year, clip them to the study area, and keep
    /// the point nearest the center of every hexagon.
    Sample {
        /// A JSON config file. Anything missing uses the defaults from `default-config`. The
        /// other flags override the file.
        #[structopt(long)]
        config: Option<String>,
        /// The CSV file with candidate points
        #[structopt(long)]
        points: Option<String>,
        /// The GeoJSON file with the study area boundary
        #[structopt(long)]
        boundary: Option<String>,
        /// Where to write results
        #[structopt(long)]
        output_dir: Option<String>,
        /// The hexagon circumradius, in meters
        #[structopt(long)]
        radius: Option<f64>,
        /// Keep points from this year onwards
        #[structopt(long)]
        min_year: Option<i64>,
        /// Keep points up to and including this year
        #[structopt(long)]
        max_year: Option<i64>,
        /// The projected frame to work in, like EPSG:32610
        #[structopt(long)]
        target_frame: Option<String>,
        /// Cut boundary hexagons down to the study area, instead of keeping them whole
        #[structopt(long)]
        clip_tiles: bool,
        /// Space rows of hexagons a full hexagon apart. They don't overlap, but leave gaps where
        /// points are dropped.
        #[structopt(long)]
        standard_rows: bool,
    },
    /// Writes the hexagon grid over a study area as GeoJSON, for inspecting the tiling.
    Grid {
        /// The GeoJSON file with the study area boundary
        #[structopt(long)]
        boundary: String,
        /// The boundary's frame, if the file doesn't say
        #[structopt(long)]
        boundary_frame: Option<String>,
        /// The hexagon circumradius, in meters
        #[structopt(long, default_value = "50")]
        radius: f64,
        /// The projected frame to generate hexagons in
        #[structopt(long, default_value = "EPSG:32610")]
        target_frame: String,
        /// Cut boundary hexagons down to the study area
        #[structopt(long)]
        clip_tiles: bool,
        /// Space rows of hexagons a full hexagon apart. They don't overlap, but leave gaps where
        /// points are dropped.
        #[structopt(long)]
        standard_rows: bool,
        /// The GeoJSON file to write
        #[structopt(long)]
        output: String,
    },
    /// Prints the default config as JSON, as a starting point for a config file.
    DefaultConfig {
        /// Write the config to this file instead of STDOUT
        #[structopt(long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cmd = Command::from_args();

    // Keep stdout clean for JSON
    if !matches!(cmd, Command::DefaultConfig { output: None }) {
        hexutil::logger::setup();
    }

    match cmd {
        Command::Sample {
            config,
            points,
            boundary,
            output_dir,
            radius,
            min_year,
            max_year,
            target_frame,
            clip_tiles,
            standard_rows,
        } => {
            let overrides = sample::Overrides {
                points,
                boundary,
                output_dir,
                radius,
                min_year,
                max_year,
                target_frame,
                clip_tiles,
                standard_rows,
            };
            sample::run(config, overrides)?
        }
        Command::Grid {
            boundary,
            boundary_frame,
            radius,
            target_frame,
            clip_tiles,
            standard_rows,
            output,
        } => grid::run(
            boundary,
            boundary_frame,
            radius,
            target_frame,
            grid::options(clip_tiles, standard_rows),
            output,
        )?,
        Command::DefaultConfig { output } => {
            let config = hexsample::Config::default();
            match output {
                Some(path) => {
                    hexutil::write_json(&path, &config)?;
                    info!("Wrote {}", path);
                }
                None => {
                    println!("{}", hexutil::to_json(&config)?);
                }
            }
        }
    }
    Ok(())
}
