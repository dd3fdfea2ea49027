use std::path::Path;

use anyhow::Result;

use geom::Frame;
use hexsample::{export, source, GridOptions, HexGrid, RowStep, TileShape};
use hexutil::Timer;

pub fn options(clip_tiles: bool, standard_rows: bool) -> GridOptions {
    GridOptions {
        shape: if clip_tiles {
            TileShape::Clipped
        } else {
            TileShape::Whole
        },
        row_step: if standard_rows {
            RowStep::Standard
        } else {
            RowStep::Dense
        },
    }
}

pub fn run(
    boundary_path: String,
    boundary_frame: Option<String>,
    radius: f64,
    target_frame: String,
    opts: GridOptions,
    output: String,
) -> Result<()> {
    let mut timer = Timer::new("generate hex grid");
    let target = Frame::parse(&target_frame)?;
    let boundary_frame = boundary_frame.map(|x| Frame::parse(&x)).transpose()?;

    let boundary = source::load_boundary(&boundary_path, boundary_frame.as_ref(), &mut timer)?;
    let area = boundary.into_study_area(&target)?;
    let grid = HexGrid::generate_with_options(&area, radius, &target, opts)?;
    if grid.is_empty() {
        timer.warn("The grid is empty; writing an empty file anyway");
    }

    export::write_geojson(&grid.to_geojson(), Path::new(&output))?;
    info!("Wrote {} hexagons to {}", grid.len(), output);
    Ok(())
}
