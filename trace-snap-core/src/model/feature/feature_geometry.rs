use crate::util::geo::linestring_ops::{
    arc_length_meters, nearest_position, point_at_arc_position, SnappedPosition,
};
use geo::{Coord, LineString, MultiLineString, Point};
use itertools::Either;
use wkt::ToWkt;

/// Geometry of a matchable feature: a single polyline or a multi-part
/// polyline. Length and arc positions treat a multi-part geometry as the
/// concatenation of its parts; nearest-point lookup considers all parts.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    LineString(LineString<f64>),
    MultiLineString(MultiLineString<f64>),
}

impl FeatureGeometry {
    pub fn parts(&self) -> impl Iterator<Item = &LineString<f64>> {
        match self {
            FeatureGeometry::LineString(ls) => Either::Left(std::iter::once(ls)),
            FeatureGeometry::MultiLineString(mls) => Either::Right(mls.0.iter()),
        }
    }

    /// all vertices across parts, in order.
    pub fn vertices(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        self.parts().flat_map(|part| part.coords().copied())
    }

    pub fn vertex_count(&self) -> usize {
        self.parts().map(|part| part.0.len()).sum()
    }

    pub fn length_meters(&self) -> f64 {
        arc_length_meters(self.parts())
    }

    /// the closest position on this geometry to the query point, or None
    /// for an empty geometry.
    pub fn nearest(&self, query: &Point<f64>) -> Option<SnappedPosition> {
        nearest_position(query, self.parts())
    }

    /// arc distance in meters along the geometry between the projections
    /// of two points. zero for empty geometry.
    pub fn distance_along(&self, a: &Point<f64>, b: &Point<f64>) -> f64 {
        match (self.nearest(a), self.nearest(b)) {
            (Some(pa), Some(pb)) => (pa.arc_position_meters - pb.arc_position_meters).abs(),
            _ => 0.0,
        }
    }

    /// the coordinate at an arc position measured from the start of the
    /// geometry, clamped to its end.
    pub fn point_at_arc(&self, arc_meters: f64) -> Option<Point<f64>> {
        point_at_arc_position(arc_meters, self.parts())
    }

    pub fn wkt_string(&self) -> String {
        match self {
            FeatureGeometry::LineString(ls) => ls.wkt_string(),
            FeatureGeometry::MultiLineString(mls) => mls.wkt_string(),
        }
    }
}
