use crate::model::feature::FeatureGeometry;
use crate::util::geo::haversine::point_distance_meters;
use geo::Point;
use geohash::Coord;
use std::collections::{HashMap, HashSet};

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// approximate north-south extent of a geohash cell at the given
/// precision. geohash alternates longitude and latitude bits, 5 bits per
/// character, so the latitude bit count is floor(5 * precision / 2).
pub fn cell_edge_meters(resolution: usize) -> f64 {
    let lat_bits = (5 * resolution) / 2;
    180.0 / 2f64.powi(lat_bits as i32) * METERS_PER_DEGREE_LAT
}

/// the set of geohash cells at `resolution` touched by a geometry,
/// including every touched cell's eight neighbors. polylines are densified
/// at half a cell edge so that no traversed cell is skipped between
/// vertices. two geometries that come within a cell edge of one another
/// are therefore guaranteed to share at least one cell. order is
/// deterministic (first-touch order, base cells before neighbor fill-in).
pub fn cell_cover(geometry: &FeatureGeometry, resolution: usize) -> Vec<String> {
    let step = cell_edge_meters(resolution) / 2.0;
    let mut base: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let visit = |x: f64, y: f64, base: &mut Vec<String>, seen: &mut HashSet<String>| {
        // encode fails on out-of-range coordinates; such vertices are
        // simply not indexed
        if let Ok(cell) = geohash::encode(Coord { x, y }, resolution) {
            if seen.insert(cell.clone()) {
                base.push(cell);
            }
        }
    };

    for part in geometry.parts() {
        if part.0.len() == 1 {
            visit(part.0[0].x, part.0[0].y, &mut base, &mut seen);
            continue;
        }
        for window in part.0.windows(2) {
            let (a, b) = (window[0], window[1]);
            let seg_len = point_distance_meters(&Point::from(a), &Point::from(b));
            let samples = if step > 0.0 && seg_len.is_finite() {
                (seg_len / step).ceil().max(1.0) as usize
            } else {
                1
            };
            for k in 0..=samples {
                let t = k as f64 / samples as f64;
                visit(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y), &mut base, &mut seen);
            }
        }
    }

    let mut cells = base.clone();
    for cell in &base {
        if let Ok(neighbors) = geohash::neighbors(cell) {
            for adjacent in [
                neighbors.n,
                neighbors.ne,
                neighbors.e,
                neighbors.se,
                neighbors.s,
                neighbors.sw,
                neighbors.w,
                neighbors.nw,
            ] {
                if seen.insert(adjacent.clone()) {
                    cells.push(adjacent);
                }
            }
        }
    }
    cells
}

/// deduplicated union of `by_cell[c]` over the given cells, preserving
/// first-seen order. unknown cells contribute nothing.
pub fn get_features_with_cells(
    by_cell: &HashMap<String, Vec<usize>>,
    cells: &[String],
) -> Vec<usize> {
    let mut result: Vec<usize> = Vec::new();
    let mut seen: HashSet<usize> = HashSet::new();
    for cell in cells {
        if let Some(features) = by_cell.get(cell) {
            for &feature in features {
                if seen.insert(feature) {
                    result.push(feature);
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(coords: &[(f64, f64)]) -> FeatureGeometry {
        FeatureGeometry::LineString(
            coords
                .iter()
                .map(|(x, y)| geo::coord! { x: *x, y: *y })
                .collect::<Vec<_>>()
                .into(),
        )
    }

    #[test]
    fn test_cell_edge_shrinks_with_resolution() {
        assert!(cell_edge_meters(7) < cell_edge_meters(6));
        // precision 7 geohash cells are roughly 150m tall
        let edge = cell_edge_meters(7);
        assert!((100.0..200.0).contains(&edge), "edge was {}", edge);
    }

    #[test]
    fn test_point_cover_contains_own_cell() {
        let geom = geometry(&[(13.361389, 38.115556)]);
        let cells = cell_cover(&geom, 7);
        let own = geohash::encode(Coord { x: 13.361389, y: 38.115556 }, 7).unwrap();
        assert!(cells.contains(&own));
        // a cell plus its eight neighbors
        assert_eq!(cells.len(), 9);
    }

    #[test]
    fn test_cover_is_deterministic() {
        let geom = geometry(&[(0.0, 0.0), (0.01, 0.0), (0.01, 0.01)]);
        assert_eq!(cell_cover(&geom, 7), cell_cover(&geom, 7));
    }

    #[test]
    fn test_nearby_geometries_share_a_cell() {
        // two parallel lines ~11m apart must overlap at precision 7
        let a = cell_cover(&geometry(&[(0.0, 0.0), (0.01, 0.0)]), 7);
        let b = cell_cover(&geometry(&[(0.0, 0.0001), (0.01, 0.0001)]), 7);
        let set: HashSet<&String> = a.iter().collect();
        assert!(b.iter().any(|c| set.contains(c)));
    }

    #[test]
    fn test_long_segment_is_densified() {
        // a single segment spanning ~1.1km at precision 7 touches
        // intermediate cells, not just the endpoint cells
        let cells = cell_cover(&geometry(&[(0.0, 0.0), (0.01, 0.0)]), 7);
        let start = geohash::encode(Coord { x: 0.0, y: 0.0 }, 7).unwrap();
        let end = geohash::encode(Coord { x: 0.01, y: 0.0 }, 7).unwrap();
        assert!(cells.contains(&start));
        assert!(cells.contains(&end));
        assert!(cells.len() > 18);
    }

    #[test]
    fn test_get_features_with_cells_union_dedup() {
        let mut by_cell: HashMap<String, Vec<usize>> = HashMap::new();
        by_cell.insert("aaa".to_string(), vec![0, 1]);
        by_cell.insert("bbb".to_string(), vec![1, 2]);
        let cells = vec!["aaa".to_string(), "bbb".to_string(), "ccc".to_string()];
        assert_eq!(get_features_with_cells(&by_cell, &cells), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_inputs() {
        let by_cell: HashMap<String, Vec<usize>> = HashMap::new();
        assert!(get_features_with_cells(&by_cell, &[]).is_empty());
    }
}
