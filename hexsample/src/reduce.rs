use std::borrow::Cow;
use std::collections::BTreeMap;

use anyhow::Result;
use rstar::{RTree, RTreeObject, AABB};

use geom::Pt2D;
use hexutil::prettyprint_usize;

use crate::{HexGrid, HexTile, Sample, SampleSet};

/// One sample matched against one tile it intersects. The sample itself isn't copied or changed;
/// it's referred to by its position in the input.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinedSample {
    /// Index into the joined samples
    pub sample: usize,
    pub tile_id: usize,
    pub centroid: Pt2D,
    pub distance_to_centroid: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReduceStats {
    pub candidates: usize,
    pub joined_pairs: usize,
    pub occupied_tiles: usize,
    /// Samples outside every tile
    pub unmatched_samples: usize,
}

struct TileEntry {
    // Index into HexGrid::tiles, not the tile's ID
    idx: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for TileEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Finds the tiles covering a point without scanning the whole grid. The R-tree holds bounding
/// boxes; candidates are confirmed with an exact test that counts the boundary as inside.
pub struct TileIndex<'a> {
    grid: &'a HexGrid,
    tree: RTree<TileEntry>,
}

impl<'a> TileIndex<'a> {
    pub fn new(grid: &'a HexGrid) -> TileIndex<'a> {
        let entries = grid
            .tiles
            .iter()
            .enumerate()
            .map(|(idx, tile)| TileEntry {
                idx,
                envelope: tile.geometry.get_bounds().as_aabb(),
            })
            .collect();
        TileIndex {
            grid,
            tree: RTree::bulk_load(entries),
        }
    }

    /// Every tile containing the point or touching it with an edge or vertex, in ID order.
    pub fn tiles_intersecting(&self, pt: Pt2D) -> Vec<&'a HexTile> {
        let grid = self.grid;
        let mut tiles: Vec<(usize, &'a HexTile)> = self
            .tree
            .locate_in_envelope_intersecting(&AABB::from_point([pt.x(), pt.y()]))
            .map(|entry| (entry.idx, &grid.tiles[entry.idx]))
            .filter(|(_, tile)| tile.intersects_pt(pt))
            .collect();
        tiles.sort_by_key(|(idx, tile)| (tile.id, *idx));
        tiles.into_iter().map(|(_, tile)| tile).collect()
    }
}

/// Pairs every sample with every tile it intersects, using an R-tree. Pairs are ordered by
/// sample, then by tile ID.
pub fn spatial_join(samples: &[Sample], grid: &HexGrid) -> Vec<JoinedSample> {
    let index = TileIndex::new(grid);
    let mut pairs = Vec::new();
    for (idx, sample) in samples.iter().enumerate() {
        for tile in index.tiles_intersecting(sample.pt) {
            pairs.push(join(idx, sample, tile));
        }
    }
    pairs
}

/// Same result as `spatial_join`, comparing every sample against every tile. Fine for small
/// inputs.
pub fn join_exhaustive(samples: &[Sample], grid: &HexGrid) -> Vec<JoinedSample> {
    let mut ordered: Vec<(usize, &HexTile)> = grid.tiles.iter().enumerate().collect();
    ordered.sort_by_key(|(idx, tile)| (tile.id, *idx));

    let mut pairs = Vec::new();
    for (idx, sample) in samples.iter().enumerate() {
        for (_, tile) in &ordered {
            if tile.intersects_pt(sample.pt) {
                pairs.push(join(idx, sample, tile));
            }
        }
    }
    pairs
}

fn join(idx: usize, sample: &Sample, tile: &HexTile) -> JoinedSample {
    JoinedSample {
        sample: idx,
        tile_id: tile.id,
        centroid: tile.centroid,
        distance_to_centroid: sample.pt.raw_dist_to(tile.centroid),
    }
}

/// Keeps one sample per occupied tile: whichever is nearest to the tile's centroid. On a tie, the
/// sample appearing first wins. See `reduce_with_stats`.
pub fn reduce(samples: &SampleSet, grid: &HexGrid) -> Result<SampleSet> {
    reduce_with_stats(samples, grid).map(|(result, _)| result)
}

/// The result is in the grid's frame, with one sample per occupied tile in tile ID order.
/// Samples keep their original position and attributes. A sample on the edge between two tiles
/// is a candidate for both, so it may be chosen twice. Samples outside every tile are dropped.
///
/// Samples in another frame are reprojected first. A grid with repeated IDs is renumbered with a
/// warning.
pub fn reduce_with_stats(samples: &SampleSet, grid: &HexGrid) -> Result<(SampleSet, ReduceStats)> {
    if samples.is_empty() || grid.is_empty() {
        warn!(
            "Nothing to reduce: {} samples, {} tiles",
            prettyprint_usize(samples.len()),
            prettyprint_usize(grid.len())
        );
        return Ok((
            samples.empty_like(Some(grid.frame.clone())),
            ReduceStats {
                candidates: samples.len(),
                unmatched_samples: samples.len(),
                ..Default::default()
            },
        ));
    }

    let grid = if grid.has_unique_ids() {
        Cow::Borrowed(grid)
    } else {
        warn!("Hex grid has repeated tile IDs; renumbering them");
        Cow::Owned(grid.clone().with_dense_ids())
    };
    let samples = if samples.frame.as_ref() == Some(&grid.frame) {
        Cow::Borrowed(samples)
    } else {
        info!(
            "Reprojecting {} samples into {}",
            prettyprint_usize(samples.len()),
            grid.frame
        );
        Cow::Owned(samples.reproject(&grid.frame)?)
    };

    let pairs = spatial_join(&samples.samples, &grid);

    let mut best: BTreeMap<usize, &JoinedSample> = BTreeMap::new();
    let mut matched = vec![false; samples.len()];
    for pair in &pairs {
        matched[pair.sample] = true;
        let replace = match best.get(&pair.tile_id) {
            Some(current) => pair.distance_to_centroid < current.distance_to_centroid,
            None => true,
        };
        if replace {
            best.insert(pair.tile_id, pair);
        }
    }

    let stats = ReduceStats {
        candidates: samples.len(),
        joined_pairs: pairs.len(),
        occupied_tiles: best.len(),
        unmatched_samples: matched.iter().filter(|x| !**x).count(),
    };
    debug!("Reduction: {:?}", stats);
    if best.is_empty() {
        warn!("None of the samples are inside a hexagon");
    }

    let kept = best
        .values()
        .map(|pair| samples.samples[pair.sample].clone())
        .collect();
    let result = SampleSet {
        frame: Some(grid.frame.clone()),
        columns: samples.columns.clone(),
        samples: kept,
    };
    Ok((result, stats))
}
