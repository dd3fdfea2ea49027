//! Picks a spatially de-duplicated subset of geotagged sample points, like street-view panorama
//! locations. A hexagon grid is laid over a study area, and within every hexagon only the sample
//! nearest to the hexagon's centroid survives.
//!
//! The pieces, leaf-first:
//! - `StudyArea` is the union of boundary polygons, in one projected frame
//! - `HexGrid::generate` tiles the study area with hexagons and clips them
//! - `reduce` spatially joins samples to hexagons and keeps one per hexagon
//! - `pipeline::run` sequences loading, filtering, reprojecting, reducing, and exporting

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod config;
pub mod export;
mod filter;
mod grid;
pub mod pipeline;
mod reduce;
mod sample;
pub mod source;
mod study_area;

pub use crate::config::Config;
pub use crate::filter::{build_samples, filter_by_year, Records, YearRange};
pub use crate::grid::{GridOptions, HexGrid, HexTile, RowStep, TileShape};
pub use crate::reduce::{
    join_exhaustive, reduce, reduce_with_stats, spatial_join, JoinedSample, ReduceStats, TileIndex,
};
pub use crate::sample::{Sample, SampleSet};
pub use crate::study_area::StudyArea;
