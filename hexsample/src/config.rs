use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use geom::Frame;

use crate::{GridOptions, YearRange};

/// Everything a sampling run needs. Every field has a default, so a config file only has to
/// mention what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV with one row per candidate point
    pub points_path: String,
    /// GeoJSON with the study area's polygons
    pub boundary_path: String,
    /// The boundary's frame, if the file doesn't say. GeoJSON is WGS84 otherwise.
    pub boundary_frame: Option<String>,

    pub output_dir: String,
    /// The FlatGeobuf file, within `output_dir`. If that fails, a `.geojson` file with the same
    /// name is written instead.
    pub output_points_name: String,
    /// The CSV is called `<prefix>_<min_year>-<max_year>.csv`
    pub output_csv_prefix: String,

    pub year_column: String,
    pub x_column: String,
    pub y_column: String,
    pub points_frame: String,
    /// All geometry is reprojected here before any work. Must be measured in meters.
    pub target_frame: String,

    pub min_year: i64,
    pub max_year: i64,
    pub hexagon_radius_meters: f64,
    pub grid: GridOptions,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            points_path: "points_data.csv".to_string(),
            boundary_path: "study_area_boundary.geojson".to_string(),
            boundary_frame: None,
            output_dir: "output_results".to_string(),
            output_points_name: "sampled_points.fgb".to_string(),
            output_csv_prefix: "panorama_id".to_string(),
            year_column: "year".to_string(),
            x_column: "lon".to_string(),
            y_column: "lat".to_string(),
            points_frame: "EPSG:4326".to_string(),
            target_frame: "EPSG:32610".to_string(),
            min_year: 2021,
            max_year: 2023,
            hexagon_radius_meters: 50.0,
            grid: GridOptions::default(),
        }
    }
}

impl Config {
    /// Reads and validates a JSON config.
    pub fn load(path: &str) -> Result<Config> {
        let config: Config = hexutil::read_json(path)?;
        config
            .validate()
            .with_context(|| format!("checking config {}", path))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.hexagon_radius_meters.is_finite() || self.hexagon_radius_meters <= 0.0 {
            bail!(
                "The hexagon radius must be positive, not {}",
                self.hexagon_radius_meters
            );
        }
        self.years()?;
        let target = self.target_frame()?;
        if !target.is_projected() {
            bail!(
                "The target frame {} isn't measured in meters; pick a projected frame",
                target
            );
        }
        self.points_frame()?;
        self.boundary_frame()?;
        Ok(())
    }

    pub fn years(&self) -> Result<YearRange> {
        YearRange::new(self.min_year, self.max_year)
    }

    pub fn target_frame(&self) -> Result<Frame> {
        Frame::parse(&self.target_frame).context("target_frame")
    }

    pub fn points_frame(&self) -> Result<Frame> {
        Frame::parse(&self.points_frame).context("points_frame")
    }

    pub fn boundary_frame(&self) -> Result<Option<Frame>> {
        match self.boundary_frame {
            Some(ref raw) => Ok(Some(Frame::parse(raw).context("boundary_frame")?)),
            None => Ok(None),
        }
    }

    pub fn points_output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir).join(&self.output_points_name)
    }

    pub fn csv_output_path(&self) -> Result<PathBuf> {
        let name = crate::export::csv_file_name(&self.output_csv_prefix, self.years()?);
        Ok(PathBuf::from(&self.output_dir).join(name))
    }
}

#[cfg(test)]
mod tests {
    use crate::{RowStep, TileShape};

    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.target_frame().unwrap(), Frame::parse("32610").unwrap());
        assert_eq!(config.points_frame().unwrap(), Frame::Wgs84);
        assert_eq!(config.boundary_frame().unwrap(), None);
        assert_eq!(
            config.csv_output_path().unwrap(),
            PathBuf::from("output_results/panorama_id_2021-2023.csv")
        );
        assert_eq!(
            config.points_output_path(),
            PathBuf::from("output_results/sampled_points.fgb")
        );
    }

    #[test]
    fn partial_json() {
        let config: Config = serde_json::from_str(
            r#"{
                "hexagon_radius_meters": 25,
                "min_year": 2019,
                "grid": {"shape": "clipped"},
                "boundary_frame": "EPSG:3857"
            }"#,
        )
        .unwrap();
        assert_eq!(config.hexagon_radius_meters, 25.0);
        assert_eq!(config.years().unwrap(), YearRange::new(2019, 2023).unwrap());
        assert_eq!(config.grid.shape, TileShape::Clipped);
        assert_eq!(config.grid.row_step, RowStep::Dense);
        assert_eq!(config.boundary_frame().unwrap(), Some(Frame::WebMercator));
        assert_eq!(config.x_column, "lon");
        config.validate().unwrap();

        let back: Config = serde_json::from_str(&hexutil::to_json(&config).unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn invalid() {
        let mut config = Config::default();
        config.hexagon_radius_meters = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.min_year = 2024;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.target_frame = "EPSG:4326".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.target_frame = "somewhere".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.boundary_frame = Some("EPSG:1".to_string());
        assert!(config.validate().is_err());

        assert!(Config::load("/definitely/not/a/config.json").is_err());
    }
}
