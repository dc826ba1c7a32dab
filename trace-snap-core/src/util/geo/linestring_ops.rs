use super::haversine::point_distance_meters;
use geo::{Coord, LineString, Point};
use itertools::Itertools;

/// A position on a (multi-)linestring produced by projecting a query point
/// onto it: the geographic coordinate of the projection, its great-circle
/// distance to the query point, and its cumulative arc position measured
/// from the start of the first part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnappedPosition {
    pub point: Point<f64>,
    pub distance_meters: f64,
    pub arc_position_meters: f64,
}

/// total length in meters of a sequence of linestring parts, treating the
/// parts as a concatenation.
pub fn arc_length_meters<'a, I>(parts: I) -> f64
where
    I: IntoIterator<Item = &'a LineString<f64>>,
{
    let mut total = 0.0;
    for part in parts {
        for (a, b) in part.coords().tuple_windows() {
            total += point_distance_meters(&Point::from(*a), &Point::from(*b));
        }
    }
    total
}

/// projects a query point onto every segment of every part and returns the
/// closest position found. selection happens in planar (degree) space by
/// clamping the projection parameter to the segment, while the reported
/// distance and arc position are measured with the haversine formula.
/// returns None when the geometry has no coordinates.
pub fn nearest_position<'a, I>(query: &Point<f64>, parts: I) -> Option<SnappedPosition>
where
    I: IntoIterator<Item = &'a LineString<f64>>,
{
    let mut cumulative = 0.0;
    let mut best: Option<SnappedPosition> = None;

    for part in parts {
        if part.0.len() == 1 {
            let vertex = Point::from(part.0[0]);
            consider_at(query, vertex, cumulative, &mut best);
            continue;
        }
        for (a, b) in part.coords().tuple_windows() {
            let start = Point::from(*a);
            let end = Point::from(*b);
            let candidate = project_onto_segment(query, a, b);
            let arc = cumulative + point_distance_meters(&start, &candidate);
            consider_at(query, candidate, arc, &mut best);
            cumulative += point_distance_meters(&start, &end);
        }
    }
    best
}

/// the coordinate at a given arc position from the start of the
/// concatenated parts, interpolating linearly within a segment. positions
/// past the end clamp to the final vertex. None for empty geometry.
pub fn point_at_arc_position<'a, I>(target_meters: f64, parts: I) -> Option<Point<f64>>
where
    I: IntoIterator<Item = &'a LineString<f64>>,
{
    let mut cumulative = 0.0;
    let mut last_vertex: Option<Point<f64>> = None;

    for part in parts {
        for (a, b) in part.coords().tuple_windows() {
            let start = Point::from(*a);
            let end = Point::from(*b);
            let seg_len = point_distance_meters(&start, &end);
            if cumulative + seg_len >= target_meters && seg_len > 0.0 {
                let t = ((target_meters - cumulative) / seg_len).clamp(0.0, 1.0);
                return Some(Point::new(
                    start.x() + t * (end.x() - start.x()),
                    start.y() + t * (end.y() - start.y()),
                ));
            }
            cumulative += seg_len;
            last_vertex = Some(end);
        }
        if part.0.len() == 1 {
            last_vertex = Some(Point::from(part.0[0]));
        }
    }
    last_vertex
}

fn consider_at(
    query: &Point<f64>,
    candidate: Point<f64>,
    arc: f64,
    best: &mut Option<SnappedPosition>,
) {
    let distance = point_distance_meters(query, &candidate);
    let better = match best {
        None => true,
        Some(b) => distance < b.distance_meters,
    };
    if better {
        *best = Some(SnappedPosition {
            point: candidate,
            distance_meters: distance,
            arc_position_meters: arc,
        });
    }
}

/// projects a point onto a line segment in planar degree space, clamping
/// the projection parameter to [0, 1]. an approximation that works well
/// for short segments.
fn project_onto_segment(point: &Point<f64>, seg_start: &Coord<f64>, seg_end: &Coord<f64>) -> Point<f64> {
    let dx = seg_end.x - seg_start.x;
    let dy = seg_end.y - seg_start.y;

    if dx == 0.0 && dy == 0.0 {
        return Point::new(seg_start.x, seg_start.y);
    }

    let t = ((point.x() - seg_start.x) * dx + (point.y() - seg_start.y) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);

    Point::new(seg_start.x + t * dx, seg_start.y + t * dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::line_string;

    fn horizontal() -> LineString<f64> {
        line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0), (x: 0.002, y: 0.0)]
    }

    #[test]
    fn test_arc_length_sums_segments() {
        let ls = horizontal();
        let len = arc_length_meters([&ls]);
        // 0.002 degrees of longitude at the equator, ~222m
        assert_relative_eq!(len, 222.39, max_relative = 1e-2);
    }

    #[test]
    fn test_arc_length_concatenates_parts() {
        let a = line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)];
        let b = line_string![(x: 0.001, y: 0.0), (x: 0.002, y: 0.0)];
        assert_relative_eq!(
            arc_length_meters([&a, &b]),
            arc_length_meters([&horizontal()]),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_nearest_position_interior_projection() {
        let ls = horizontal();
        let query = Point::new(0.0005, 0.0001);
        let snapped = nearest_position(&query, [&ls]).unwrap();
        assert_relative_eq!(snapped.point.x(), 0.0005, epsilon = 1e-9);
        assert_relative_eq!(snapped.point.y(), 0.0, epsilon = 1e-9);
        // 0.0001 degrees of latitude, ~11.1m
        assert_relative_eq!(snapped.distance_meters, 11.12, max_relative = 1e-2);
    }

    #[test]
    fn test_nearest_position_clamps_to_endpoint() {
        let ls = horizontal();
        let query = Point::new(-0.001, 0.0);
        let snapped = nearest_position(&query, [&ls]).unwrap();
        assert_relative_eq!(snapped.point.x(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(snapped.arc_position_meters, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_nearest_position_empty_geometry() {
        let parts: [&LineString<f64>; 0] = [];
        let query = Point::new(0.0, 0.0);
        assert!(nearest_position(&query, parts).is_none());
    }

    #[test]
    fn test_point_at_arc_position_midpoint() {
        let ls = horizontal();
        let total = arc_length_meters([&ls]);
        let mid = point_at_arc_position(total / 2.0, [&ls]).unwrap();
        assert_relative_eq!(mid.x(), 0.001, epsilon = 1e-6);
        assert_relative_eq!(mid.y(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_point_at_arc_position_clamps_past_end() {
        let ls = horizontal();
        let p = point_at_arc_position(1.0e9, [&ls]).unwrap();
        assert_relative_eq!(p.x(), 0.002, epsilon = 1e-9);
    }
}
