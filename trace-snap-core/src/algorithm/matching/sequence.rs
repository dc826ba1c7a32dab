use super::prediction::{PredictionArena, PredictionId};
use crate::algorithm::route::RouteStep;
use crate::model::feature::MatchableFeature;
use std::collections::HashSet;
use wkt::ToWkt;

/// how many ancestor via points are collected before the revisit check
/// stops looking further back. keeps the ancestor walk bounded on very
/// long traces at the cost of missing revisits to very old via points.
const MAX_TRACKED_VIA_POINTS: usize = 100;

/// Result of extending a predecessor's traveled sequence with the steps
/// of a new route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceExtension {
    /// feature ids traversed from the chain start through the new route
    pub extended_sequence: Vec<String>,
    /// steps that re-entered a feature present earlier in the sequence
    pub revisited_segments: usize,
    /// route via points already crossed earlier in the chain
    pub revisited_via_points: usize,
}

/// extends the sequence of traveled segments up to the previous point
/// with the new route's steps, counting revisited segments and revisited
/// via points along the way.
pub fn extend_sequence(
    steps: &[RouteStep],
    candidates: &[&MatchableFeature],
    prev: PredictionId,
    arena: &PredictionArena,
) -> SequenceExtension {
    let mut extended_sequence = arena.get(prev).best_sequence.clone();
    let mut revisited_segments = 0;
    let mut added_via_points: Vec<String> = Vec::new();

    for step in steps {
        let feature_id = &candidates[step.candidate].id;
        let continues_last = extended_sequence
            .last()
            .map(|last| last == feature_id)
            .unwrap_or(false);
        if !continues_last {
            if extended_sequence.iter().any(|id| id == feature_id) {
                revisited_segments += 1;
            }
            extended_sequence.push(feature_id.clone());
        }
        if let Some(via) = &step.via_point {
            added_via_points.push(via.wkt_string());
        }
    }

    let mut revisited_via_points = 0;
    if !added_via_points.is_empty() {
        let mut prior_via_points: HashSet<String> = HashSet::new();
        let mut cursor = Some(prev);
        'ancestors: while let Some(id) = cursor {
            let prediction = arena.get(id);
            for via in &prediction.best_route_via_points {
                prior_via_points.insert(via.clone());
                if prior_via_points.len() > MAX_TRACKED_VIA_POINTS {
                    break 'ancestors;
                }
            }
            cursor = prediction.best_prev_prediction;
        }
        for via in &added_via_points {
            if prior_via_points.contains(via) {
                revisited_via_points += 1;
            }
        }
    }

    SequenceExtension {
        extended_sequence,
        revisited_segments,
        revisited_via_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::matching::prediction::SnappedPointPrediction;
    use crate::model::feature::FeatureGeometry;
    use geo::{line_string, Point};

    fn road(id: &str) -> MatchableFeature {
        MatchableFeature::new(
            id.to_string(),
            FeatureGeometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)]),
        )
    }

    fn seeded(
        arena: &mut PredictionArena,
        sequence: &[&str],
        via_points: &[&str],
    ) -> PredictionId {
        arena.alloc(SnappedPointPrediction {
            feature_id: sequence.last().unwrap_or(&"x").to_string(),
            candidate: 0,
            snapped_point: Point::new(0.0, 0.0),
            distance_to_snapped_road: 1.0,
            route_distance_to_prev_point: None,
            emission_prob: 0.5,
            best_transition_prob: 1.0,
            best_log_prob: -1.0,
            best_prev_prediction: None,
            best_sequence: sequence.iter().map(|s| s.to_string()).collect(),
            best_route_via_points: via_points.iter().map(|s| s.to_string()).collect(),
            best_revisited_via_points_count: 0,
            best_revisited_segments_count: 0,
        })
    }

    #[test]
    fn test_new_feature_is_appended() {
        let features = [road("a"), road("b")];
        let candidates: Vec<&MatchableFeature> = features.iter().collect();
        let mut arena = PredictionArena::new();
        let prev = seeded(&mut arena, &["a"], &[]);
        let steps = vec![
            RouteStep { candidate: 0, via_point: None },
            RouteStep { candidate: 1, via_point: Some(Point::new(0.001, 0.0)) },
        ];
        let ext = extend_sequence(&steps, &candidates, prev, &arena);
        assert_eq!(ext.extended_sequence, vec!["a", "b"]);
        assert_eq!(ext.revisited_segments, 0);
        assert_eq!(ext.revisited_via_points, 0);
    }

    #[test]
    fn test_continuation_is_not_duplicated() {
        let features = [road("a")];
        let candidates: Vec<&MatchableFeature> = features.iter().collect();
        let mut arena = PredictionArena::new();
        let prev = seeded(&mut arena, &["a"], &[]);
        let steps = vec![RouteStep { candidate: 0, via_point: None }];
        let ext = extend_sequence(&steps, &candidates, prev, &arena);
        assert_eq!(ext.extended_sequence, vec!["a"]);
        assert_eq!(ext.revisited_segments, 0);
    }

    #[test]
    fn test_reentry_counts_as_revisit() {
        let features = [road("a"), road("b")];
        let candidates: Vec<&MatchableFeature> = features.iter().collect();
        let mut arena = PredictionArena::new();
        let prev = seeded(&mut arena, &["a", "b"], &[]);
        // route returns onto a after having moved to b
        let steps = vec![
            RouteStep { candidate: 1, via_point: None },
            RouteStep { candidate: 0, via_point: Some(Point::new(0.0, 0.0)) },
        ];
        let ext = extend_sequence(&steps, &candidates, prev, &arena);
        assert_eq!(ext.extended_sequence, vec!["a", "b", "a"]);
        assert_eq!(ext.revisited_segments, 1);
    }

    #[test]
    fn test_via_point_revisit_detected_through_ancestors() {
        let features = [road("a"), road("b")];
        let candidates: Vec<&MatchableFeature> = features.iter().collect();
        let mut arena = PredictionArena::new();
        let via_wkt = Point::new(0.001, 0.0).wkt_string();
        let prev = seeded(&mut arena, &["a", "b"], &[via_wkt.as_str()]);
        let steps = vec![
            RouteStep { candidate: 1, via_point: None },
            RouteStep { candidate: 0, via_point: Some(Point::new(0.001, 0.0)) },
        ];
        let ext = extend_sequence(&steps, &candidates, prev, &arena);
        assert_eq!(ext.revisited_via_points, 1);
    }

    #[test]
    fn test_no_via_points_skips_ancestor_walk() {
        let features = [road("a"), road("b")];
        let candidates: Vec<&MatchableFeature> = features.iter().collect();
        let mut arena = PredictionArena::new();
        let prev = seeded(&mut arena, &["a"], &["POINT(9 9)"]);
        let steps = vec![RouteStep { candidate: 1, via_point: None }];
        let ext = extend_sequence(&steps, &candidates, prev, &arena);
        assert_eq!(ext.revisited_via_points, 0);
    }
}
