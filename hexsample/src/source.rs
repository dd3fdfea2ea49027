//! Reads the study area boundary and the candidate points from disk.

use std::collections::BTreeMap;
use std::io::Read;

use anyhow::{Context, Result};
use geojson::{GeoJson, JsonObject, Value};

use geom::{Frame, Polygon};
use hexutil::{prettyprint_usize, Timer};

use crate::{Records, StudyArea};

/// Polygons read from a boundary file, still in the file's own frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Boundary {
    pub frame: Frame,
    pub polygons: Vec<Polygon>,
}

impl Boundary {
    /// Reprojects every polygon into `frame`, then dissolves them into one study area.
    pub fn into_study_area(self, frame: &Frame) -> Result<StudyArea> {
        let from = self.frame;
        let polygons = self
            .polygons
            .into_iter()
            .map(|p| p.try_map_pts(|pt| from.transform(pt, frame)))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("reprojecting the boundary from {} to {}", from, frame))?;
        Ok(StudyArea::new(polygons, Some(frame.clone())))
    }
}

/// Reads `Polygon` and `MultiPolygon` geometry from a GeoJSON file, which may hold a
/// FeatureCollection, one Feature, or a bare geometry. The frame comes from the legacy `crs`
/// member if there is one, then `default_frame`, and otherwise is WGS84.
pub fn load_boundary(path: &str, default_frame: Option<&Frame>, timer: &mut Timer) -> Result<Boundary> {
    timer.start(format!("read {}", path));
    let raw = fs_err::read_to_string(path)?;
    let result = parse_boundary(&raw, default_frame).with_context(|| format!("parsing {}", path));
    timer.stop(format!("read {}", path));
    result
}

pub fn parse_boundary(raw: &str, default_frame: Option<&Frame>) -> Result<Boundary> {
    let geojson = raw.parse::<GeoJson>()?;

    let mut polygons = Vec::new();
    let crs = match geojson {
        GeoJson::FeatureCollection(collection) => {
            for feature in collection.features {
                if let Some(geometry) = feature.geometry {
                    extract_polygons(geometry.value, &mut polygons)?;
                }
            }
            crs_member(collection.foreign_members.as_ref())?
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = feature.geometry {
                extract_polygons(geometry.value, &mut polygons)?;
            }
            crs_member(feature.foreign_members.as_ref())?
        }
        GeoJson::Geometry(geometry) => {
            let crs = crs_member(geometry.foreign_members.as_ref())?;
            extract_polygons(geometry.value, &mut polygons)?;
            crs
        }
    };
    if polygons.is_empty() {
        bail!("The boundary doesn't have any polygons");
    }

    let frame = crs
        .or_else(|| default_frame.cloned())
        .unwrap_or(Frame::Wgs84);
    info!(
        "Boundary has {} polygons in {}",
        prettyprint_usize(polygons.len()),
        frame
    );
    Ok(Boundary { frame, polygons })
}

fn extract_polygons(value: Value, polygons: &mut Vec<Polygon>) -> Result<()> {
    match value {
        Value::Polygon(rings) => {
            polygons.push(Polygon::from_geojson(&rings)?);
        }
        Value::MultiPolygon(list) => {
            for rings in list {
                polygons.push(Polygon::from_geojson(&rings)?);
            }
        }
        Value::GeometryCollection(list) => {
            for geometry in list {
                extract_polygons(geometry.value, polygons)?;
            }
        }
        _ => {
            warn!("Skipping a geometry in the boundary that isn't a polygon");
        }
    }
    Ok(())
}

/// Understands `{"type": "name", "properties": {"name": "EPSG:32610"}}`.
fn crs_member(foreign_members: Option<&JsonObject>) -> Result<Option<Frame>> {
    let crs = match foreign_members.and_then(|m| m.get("crs")) {
        Some(crs) if !crs.is_null() => crs,
        _ => return Ok(None),
    };
    let name = crs
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .ok_or_else(|| anyhow!("Don't understand the crs member {}", crs))?;
    Ok(Some(Frame::parse(name)?))
}

/// Reads a CSV file with a header row. Every column is kept as text.
pub fn load_csv(path: &str, timer: &mut Timer) -> Result<Records> {
    timer.start(format!("read {}", path));
    let file = fs_err::File::open(path)?;
    let result = read_csv(file).with_context(|| format!("reading {}", path));
    timer.stop(format!("read {}", path));
    result
}

pub fn read_csv<R: Read>(reader: R) -> Result<Records> {
    let mut reader = csv::Reader::from_reader(reader);
    let columns: Vec<String> = reader.headers()?.iter().map(|x| x.to_string()).collect();
    for (idx, col) in columns.iter().enumerate() {
        if columns[..idx].contains(col) {
            bail!("Column {} appears twice", col);
        }
    }

    let mut rows = Vec::new();
    for rec in reader.deserialize() {
        let rec: BTreeMap<String, String> = rec?;
        rows.push(rec);
    }
    info!(
        "Read {} records with {} columns",
        prettyprint_usize(rows.len()),
        columns.len()
    );
    Ok(Records::new(columns, rows))
}
