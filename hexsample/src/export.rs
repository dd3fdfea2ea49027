//! Writes results. Points go to FlatGeobuf, or GeoJSON if that fails, and to CSV with their
//! projected coordinates flattened into two columns.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flatgeobuf::geozero::error::GeozeroError;
use flatgeobuf::geozero::{ColumnValue, GeomProcessor, GeozeroGeometry, PropertyProcessor};
use flatgeobuf::{ColumnType, FgbCrs, FgbWriter, FgbWriterOptions, GeometryType};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use serde_json::json;

use geom::{Frame, Pt2D};
use hexutil::prettyprint_usize;

use crate::{SampleSet, YearRange};

pub const PROJECTED_X_COLUMN: &str = "coord_X_projected";
pub const PROJECTED_Y_COLUMN: &str = "coord_Y_projected";

/// How the geometry export went. There are no retries.
#[derive(Debug)]
pub enum ExportOutcome {
    /// FlatGeobuf worked
    Primary(PathBuf),
    /// FlatGeobuf failed, but GeoJSON worked
    Fallback {
        path: PathBuf,
        primary_error: anyhow::Error,
    },
    Failed {
        primary_error: anyhow::Error,
        fallback_error: anyhow::Error,
    },
}

impl ExportOutcome {
    /// Where the points were written, if anywhere
    pub fn path(&self) -> Option<&Path> {
        match self {
            ExportOutcome::Primary(path) => Some(path),
            ExportOutcome::Fallback { path, .. } => Some(path),
            ExportOutcome::Failed { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<PathBuf> {
        match self {
            ExportOutcome::Primary(path) | ExportOutcome::Fallback { path, .. } => Ok(path),
            ExportOutcome::Failed {
                primary_error,
                fallback_error,
            } => bail!(
                "Writing FlatGeobuf failed ({:#}), and so did GeoJSON ({:#})",
                primary_error,
                fallback_error
            ),
        }
    }
}

/// Tries FlatGeobuf at `path`, then GeoJSON next to it.
pub fn export_points(samples: &SampleSet, path: &Path) -> ExportOutcome {
    let primary_error = match write_flatgeobuf(samples, path) {
        Ok(()) => {
            info!(
                "Wrote {} points to {}",
                prettyprint_usize(samples.len()),
                path.display()
            );
            return ExportOutcome::Primary(path.to_path_buf());
        }
        Err(err) => err,
    };
    warn!(
        "Couldn't write {}: {:#}. Trying GeoJSON instead.",
        path.display(),
        primary_error
    );

    let fallback = path.with_extension("geojson");
    match write_geojson(&points_to_geojson(samples), &fallback) {
        Ok(()) => {
            info!(
                "Wrote {} points to {}",
                prettyprint_usize(samples.len()),
                fallback.display()
            );
            ExportOutcome::Fallback {
                path: fallback,
                primary_error,
            }
        }
        Err(fallback_error) => {
            error!(
                "Couldn't write {} either: {:#}",
                fallback.display(),
                fallback_error
            );
            ExportOutcome::Failed {
                primary_error,
                fallback_error,
            }
        }
    }
}

struct PointGeometry(Pt2D);

impl GeozeroGeometry for PointGeometry {
    fn process_geom<P: GeomProcessor>(&self, processor: &mut P) -> Result<(), GeozeroError> {
        processor.point_begin(0)?;
        processor.xy(self.0.x(), self.0.y(), 0)?;
        processor.point_end(0)
    }
}

/// A point layer with every attribute column stored as a string.
pub fn write_flatgeobuf(samples: &SampleSet, path: &Path) -> Result<()> {
    let mut name = hexutil::basename(path.to_string_lossy());
    if name.is_empty() {
        name = "points".to_string();
    }
    let code = samples.frame.as_ref().and_then(|f| f.epsg()).unwrap_or(0);
    let options = FgbWriterOptions {
        crs: FgbCrs {
            code: code as i32,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut fgb = FgbWriter::create_with_options(&name, GeometryType::Point, options)?;
    for column in &samples.columns {
        fgb.add_column(column, ColumnType::String, |_, col| {
            col.nullable = true;
        });
    }

    for sample in &samples.samples {
        let mut failure = None;
        fgb.add_feature_geom(PointGeometry(sample.pt), |feature| {
            for (idx, column) in samples.columns.iter().enumerate() {
                if let Some(value) = sample.get(column) {
                    if let Err(err) = feature.property(idx, column, &ColumnValue::String(value)) {
                        failure = Some(err);
                    }
                }
            }
        })?;
        if let Some(err) = failure {
            return Err(err).context("writing attributes");
        }
    }

    let mut file = BufWriter::new(fs_err::File::create(path)?);
    fgb.write(&mut file)?;
    file.flush()?;
    Ok(())
}

/// Names the frame with the legacy `crs` member, since RFC 7946 otherwise assumes WGS84.
pub fn feature_collection(features: Vec<Feature>, frame: Option<&Frame>) -> FeatureCollection {
    let foreign_members = frame.map(|frame| {
        let mut members = JsonObject::new();
        members.insert(
            "crs".to_string(),
            json!({
                "type": "name",
                "properties": { "name": frame.to_string() },
            }),
        );
        members
    });
    FeatureCollection {
        bbox: None,
        features,
        foreign_members,
    }
}

pub fn points_to_geojson(samples: &SampleSet) -> FeatureCollection {
    let features = samples
        .samples
        .iter()
        .map(|sample| {
            let mut feature = Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                    sample.pt.x(),
                    sample.pt.y(),
                ]))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            for column in &samples.columns {
                if let Some(value) = sample.get(column) {
                    feature.set_property(column.clone(), value);
                }
            }
            feature
        })
        .collect();
    feature_collection(features, samples.frame.as_ref())
}

pub fn write_geojson(collection: &FeatureCollection, path: &Path) -> Result<()> {
    let contents = GeoJson::FeatureCollection(collection.clone()).to_string();
    let mut file = fs_err::File::create(path)?;
    write!(file, "{}", contents)?;
    Ok(())
}

/// `<prefix>_<min>-<max>.csv`
pub fn csv_file_name(prefix: &str, years: YearRange) -> String {
    format!("{}_{}.csv", prefix, years)
}

/// The original columns in order, then the projected coordinates.
pub fn write_csv(samples: &SampleSet, path: &Path) -> Result<()> {
    let columns: Vec<&String> = samples
        .columns
        .iter()
        .filter(|c| *c != PROJECTED_X_COLUMN && *c != PROJECTED_Y_COLUMN)
        .collect();

    let mut writer = csv::Writer::from_writer(BufWriter::new(fs_err::File::create(path)?));
    let mut header: Vec<&str> = columns.iter().map(|c| c.as_str()).collect();
    header.push(PROJECTED_X_COLUMN);
    header.push(PROJECTED_Y_COLUMN);
    writer.write_record(&header)?;

    for sample in &samples.samples {
        let mut row: Vec<String> = columns
            .iter()
            .map(|c| sample.get(c).unwrap_or("").to_string())
            .collect();
        row.push(sample.pt.x().to_string());
        row.push(sample.pt.y().to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    info!(
        "Wrote {} rows to {}",
        prettyprint_usize(samples.len()),
        path.display()
    );
    Ok(())
}
