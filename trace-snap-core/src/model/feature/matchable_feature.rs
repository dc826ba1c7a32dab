use super::FeatureGeometry;
use geo::Point;
use serde_json::{Map, Value};

/// An immutable road-network element or source trace. Road features carry
/// connector ids naming the junctions they share with other features;
/// traces carry an optional list of per-vertex timestamps.
#[derive(Debug, Clone)]
pub struct MatchableFeature {
    pub id: String,
    pub geometry: FeatureGeometry,
    pub connector_ids: Vec<String>,
    /// RFC 3339 timestamps aligned 1:1 with the geometry vertices
    pub times: Option<Vec<String>>,
    /// remaining input properties, retained verbatim for output writers
    pub properties: Option<Map<String, Value>>,
}

impl MatchableFeature {
    pub fn new(id: String, geometry: FeatureGeometry) -> Self {
        Self {
            id,
            geometry,
            connector_ids: Vec::new(),
            times: None,
            properties: None,
        }
    }

    pub fn length_meters(&self) -> f64 {
        self.geometry.length_meters()
    }

    /// The position of the `index`-th connector on this feature's geometry
    /// as (coordinate, arc position in meters). Connectors are laid out at
    /// even arc-length fractions with the first and last at the geometry
    /// endpoints; a lone connector sits at the start.
    pub fn connector_position(&self, index: usize) -> Option<(Point<f64>, f64)> {
        let n = self.connector_ids.len();
        if index >= n {
            return None;
        }
        let total = self.length_meters();
        let fraction = if n <= 1 {
            0.0
        } else {
            index as f64 / (n - 1) as f64
        };
        let arc = fraction * total;
        let point = self.geometry.point_at_arc(arc)?;
        Some((point, arc))
    }
}
