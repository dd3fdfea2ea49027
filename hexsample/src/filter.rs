use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use geom::{Frame, Pt2D};
use hexutil::prettyprint_usize;

use crate::{Sample, SampleSet};

/// Raw tabular records, before any geometry is attached. Every value is kept as text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Records {
    /// In the order the source listed them
    pub columns: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

impl Records {
    pub fn new(columns: Vec<String>, rows: Vec<BTreeMap<String, String>>) -> Records {
        Records { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    fn require_column(&self, name: &str) -> Result<()> {
        if !self.has_column(name) {
            bail!(
                "There's no {} column; the columns are {}",
                name,
                self.columns.join(", ")
            );
        }
        Ok(())
    }
}

/// An inclusive range of years.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i64,
    pub max: i64,
}

impl YearRange {
    pub fn new(min: i64, max: i64) -> Result<YearRange> {
        if min > max {
            bail!("Year range {}-{} is backwards", min, max);
        }
        Ok(YearRange { min, max })
    }

    pub fn contains(self, year: i64) -> bool {
        year >= self.min && year <= self.max
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Parses a year written like "2021" or "2021.0", truncating any fraction.
fn parse_year(raw: &str) -> Option<i64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.trunc() as i64)
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Keeps the records whose year falls within the range. Records with a missing or non-numeric
/// year are dropped. The kept records have their year rewritten as a plain integer. A missing
/// column is an error.
pub fn filter_by_year(records: &Records, column: &str, range: YearRange) -> Result<Records> {
    records.require_column(column)?;

    let mut unparseable = 0;
    let mut rows = Vec::new();
    for row in &records.rows {
        let year = match row.get(column).and_then(|x| parse_year(x)) {
            Some(year) => year,
            None => {
                unparseable += 1;
                continue;
            }
        };
        if range.contains(year) {
            let mut row = row.clone();
            row.insert(column.to_string(), year.to_string());
            rows.push(row);
        }
    }
    if unparseable > 0 {
        debug!(
            "Dropped {} records without a usable {}",
            prettyprint_usize(unparseable),
            column
        );
    }
    info!(
        "{} of {} records are from {}",
        prettyprint_usize(rows.len()),
        prettyprint_usize(records.len()),
        range
    );
    Ok(Records {
        columns: records.columns.clone(),
        rows,
    })
}

/// Turns records into samples positioned by two coordinate columns. Rows with an empty or
/// non-numeric coordinate are dropped. Missing columns are an error. Every column, including
/// the coordinates, is kept as an attribute.
pub fn build_samples(
    records: &Records,
    x_column: &str,
    y_column: &str,
    frame: Option<Frame>,
) -> Result<SampleSet> {
    records.require_column(x_column)?;
    records.require_column(y_column)?;

    let mut samples = Vec::new();
    for row in &records.rows {
        let x = row.get(x_column).and_then(|x| parse_coordinate(x));
        let y = row.get(y_column).and_then(|y| parse_coordinate(y));
        if let (Some(x), Some(y)) = (x, y) {
            samples.push(Sample {
                pt: Pt2D::new(x, y),
                attributes: row.clone(),
            });
        }
    }
    if samples.len() < records.len() {
        debug!(
            "Dropped {} records without usable coordinates",
            prettyprint_usize(records.len() - samples.len())
        );
    }
    Ok(SampleSet::new(frame, records.columns.clone(), samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: Vec<Vec<&str>>) -> Records {
        let columns = vec!["pano_id".to_string(), "lon".to_string(), "lat".to_string(), "year".to_string()];
        let rows = rows
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .cloned()
                    .zip(row.into_iter().map(|x| x.to_string()))
                    .collect()
            })
            .collect();
        Records::new(columns, rows)
    }

    fn ids(records: &Records) -> Vec<&str> {
        records.rows.iter().map(|r| r["pano_id"].as_str()).collect()
    }

    #[test]
    fn years() {
        let input = records(vec![
            vec!["a", "1", "1", "2020"],
            vec!["b", "1", "1", "2021"],
            vec!["c", "1", "1", "2022.0"],
            vec!["d", "1", "1", "2023.9"],
            vec!["e", "1", "1", "2024"],
            vec!["f", "1", "1", ""],
            vec!["g", "1", "1", "recent"],
            vec!["h", "1", "1", " 2023 "],
            vec!["i", "1", "1", "NaN"],
        ]);
        let range = YearRange::new(2021, 2023).unwrap();
        let kept = filter_by_year(&input, "year", range).unwrap();
        assert_eq!(ids(&kept), vec!["b", "c", "d", "h"]);
        assert_eq!(kept.rows[1]["year"], "2022");
        assert_eq!(kept.rows[2]["year"], "2023");
        assert_eq!(kept.columns, input.columns);

        assert!(filter_by_year(&input, "date", range).is_err());
        assert!(YearRange::new(2023, 2021).is_err());
        assert!(YearRange::new(2021, 2021).unwrap().contains(2021));
    }

    #[test]
    fn coordinates() {
        let input = records(vec![
            vec!["a", "-122.4", "37.7", "2021"],
            vec!["b", "", "37.7", "2021"],
            vec!["c", "-122.4", "north", "2021"],
            vec!["d", "inf", "37.7", "2021"],
            vec!["e", " -122.5 ", "37.8", "2021"],
        ]);
        let set = build_samples(&input, "lon", "lat", Some(Frame::Wgs84)).unwrap();
        assert_eq!(set.frame, Some(Frame::Wgs84));
        assert_eq!(set.len(), 2);
        assert_eq!(set.samples[0].pt, Pt2D::new(-122.4, 37.7));
        assert_eq!(set.samples[1].pt, Pt2D::new(-122.5, 37.8));
        assert_eq!(set.samples[1].get("pano_id"), Some("e"));
        assert_eq!(set.columns, input.columns);

        assert!(build_samples(&input, "x", "lat", None).is_err());
        assert!(build_samples(&input, "lon", "y", None).is_err());
    }
}
