use std::collections::BTreeMap;

use anyhow::{Context, Result};

use geom::{Frame, Pt2D};

use crate::StudyArea;

/// One candidate point plus whatever attributes its source record had. Attributes are carried
/// through every stage untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub pt: Pt2D,
    pub attributes: BTreeMap<String, String>,
}

impl Sample {
    pub fn new(pt: Pt2D) -> Sample {
        Sample {
            pt,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Sample {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|x| x.as_str())
    }
}

/// A collection of samples in one frame. Order is preserved by every stage, and it's the only
/// identity samples have.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSet {
    /// `None` when the source never said what frame it's in. Such a set can't be reprojected.
    pub frame: Option<Frame>,
    /// Attribute names in the order the source listed them, for tabular export
    pub columns: Vec<String>,
    pub samples: Vec<Sample>,
}

impl SampleSet {
    pub fn new(frame: Option<Frame>, columns: Vec<String>, samples: Vec<Sample>) -> SampleSet {
        SampleSet {
            frame,
            columns,
            samples,
        }
    }

    /// No samples, but otherwise compatible with `self`, in the given frame.
    pub fn empty_like(&self, frame: Option<Frame>) -> SampleSet {
        SampleSet {
            frame,
            columns: self.columns.clone(),
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Copies the samples into another frame. Attributes are untouched; only positions change.
    pub fn reproject(&self, to: &Frame) -> Result<SampleSet> {
        let from = self
            .frame
            .as_ref()
            .ok_or_else(|| anyhow!("Samples don't have a coordinate frame, can't reproject"))?;
        if from == to {
            return Ok(self.clone());
        }

        let pts: Vec<Pt2D> = self.samples.iter().map(|s| s.pt).collect();
        let moved = geom::reproject_all(&pts, from, to)
            .with_context(|| format!("reprojecting samples from {} to {}", from, to))?;
        let samples = self
            .samples
            .iter()
            .zip(moved)
            .map(|(sample, pt)| Sample {
                pt,
                attributes: sample.attributes.clone(),
            })
            .collect();
        Ok(SampleSet {
            frame: Some(to.clone()),
            columns: self.columns.clone(),
            samples,
        })
    }

    /// Keeps samples inside the study area or on its boundary.
    pub fn clip_to(&self, area: &StudyArea) -> Result<SampleSet> {
        if self.frame != area.frame {
            bail!(
                "Can't clip samples in {:?} to a study area in {:?}",
                self.frame,
                area.frame
            );
        }
        let samples = self
            .samples
            .iter()
            .filter(|s| area.intersects_pt(s.pt))
            .cloned()
            .collect();
        Ok(SampleSet {
            frame: self.frame.clone(),
            columns: self.columns.clone(),
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use geom::Polygon;

    use super::*;

    fn local() -> Frame {
        Frame::Local("test".to_string())
    }

    #[test]
    fn reproject_keeps_attributes() {
        let set = SampleSet::new(
            Some(Frame::Wgs84),
            vec!["pano_id".to_string()],
            vec![Sample::new(Pt2D::new(-122.4194, 37.7749)).with_attribute("pano_id", "abc")],
        );
        let utm = Frame::parse("EPSG:32610").unwrap();
        let moved = set.reproject(&utm).unwrap();
        assert_eq!(moved.frame, Some(utm));
        assert_eq!(moved.samples[0].get("pano_id"), Some("abc"));
        assert!(moved.samples[0]
            .pt
            .approx_eq(Pt2D::new(551_130.768, 4_180_998.882), 0.01));
        // The original is untouched
        assert_eq!(set.samples[0].pt, Pt2D::new(-122.4194, 37.7749));
    }

    #[test]
    fn reproject_needs_a_frame() {
        let set = SampleSet::new(None, Vec::new(), vec![Sample::new(Pt2D::new(1.0, 2.0))]);
        assert!(set.reproject(&Frame::Wgs84).is_err());

        let set = SampleSet::new(Some(local()), Vec::new(), Vec::new());
        assert_eq!(set.reproject(&local()).unwrap(), set);
        assert!(set.reproject(&Frame::Wgs84).is_err());
    }

    #[test]
    fn clip_includes_the_boundary() {
        let area = StudyArea::new(
            vec![Polygon::rectangle_two_corners(Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 10.0)).unwrap()],
            Some(local()),
        );
        let set = SampleSet::new(
            Some(local()),
            Vec::new(),
            vec![
                Sample::new(Pt2D::new(5.0, 5.0)),
                Sample::new(Pt2D::new(10.0, 5.0)),
                Sample::new(Pt2D::new(11.0, 5.0)),
            ],
        );
        let clipped = set.clip_to(&area).unwrap();
        assert_eq!(
            clipped.samples.iter().map(|s| s.pt.x()).collect::<Vec<_>>(),
            vec![5.0, 10.0]
        );

        let elsewhere = SampleSet::new(Some(Frame::WebMercator), Vec::new(), Vec::new());
        assert!(elsewhere.clip_to(&area).is_err());
    }
}
