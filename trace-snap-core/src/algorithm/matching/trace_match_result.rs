use super::point_snap_info::PointSnapInfo;
use super::prediction::{PredictionArena, PredictionId, SnappedPointPrediction};

/// Aggregate result of matching one trace, owning every point and the
/// prediction arena the points index into.
#[derive(Debug, Clone)]
pub struct TraceMatchResult {
    pub id: String,
    pub source_wkt: String,
    /// length of the source trace geometry in meters
    pub source_length: f64,
    pub points: Vec<PointSnapInfo>,
    pub arena: PredictionArena,
    /// number of candidate road features considered for this trace
    pub target_candidates_count: usize,
    /// sum of best route distances, meters, rounded to centimeters
    pub route_length: f64,
    pub avg_dist_to_road: Option<f64>,
    /// distinct matched feature ids, in first-match order
    pub matched_target_ids: Vec<String>,
    pub points_with_matches: usize,
    pub sequence_breaks: usize,
    pub revisited_via_points: usize,
    pub revisited_segments: usize,
    /// wall-clock seconds spent matching
    pub elapsed: f64,
}

impl TraceMatchResult {
    pub fn prediction(&self, id: PredictionId) -> &SnappedPointPrediction {
        self.arena.get(id)
    }

    /// the chosen prediction of a point, if backtracking selected one.
    pub fn best_prediction(&self, point: &PointSnapInfo) -> Option<&SnappedPointPrediction> {
        point.best_prediction.map(|id| self.arena.get(id))
    }

    /// accumulates the per-trace counters from the chosen predictions.
    pub(crate) fn compute_metrics(&mut self) {
        let mut matched_target_ids: Vec<String> = Vec::new();
        let mut route_length = 0.0;
        let mut dist_to_road = 0.0;
        let mut revisited_via_points = 0;
        let mut revisited_segments = 0;
        let mut points_with_matches = 0;

        for point in &self.points {
            let Some(id) = point.best_prediction else {
                continue;
            };
            let prediction = self.arena.get(id);
            points_with_matches += 1;
            route_length += prediction.route_distance_to_prev_point.unwrap_or(0.0);
            dist_to_road += prediction.distance_to_snapped_road;
            revisited_via_points += prediction.best_revisited_via_points_count;
            revisited_segments += prediction.best_revisited_segments_count;
            if !matched_target_ids.contains(&prediction.feature_id) {
                matched_target_ids.push(prediction.feature_id.clone());
            }
        }

        self.matched_target_ids = matched_target_ids;
        self.points_with_matches = points_with_matches;
        self.route_length = round2(route_length);
        self.avg_dist_to_road = if points_with_matches > 0 {
            Some(round2(dist_to_road / points_with_matches as f64))
        } else {
            None
        };
        self.revisited_via_points = revisited_via_points;
        self.revisited_segments = revisited_segments;
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn empty_result() -> TraceMatchResult {
        TraceMatchResult {
            id: "t".to_string(),
            source_wkt: "LINESTRING(0 0,1 1)".to_string(),
            source_length: 10.0,
            points: vec![],
            arena: PredictionArena::new(),
            target_candidates_count: 0,
            route_length: 0.0,
            avg_dist_to_road: None,
            matched_target_ids: vec![],
            points_with_matches: 0,
            sequence_breaks: 0,
            revisited_via_points: 0,
            revisited_segments: 0,
            elapsed: 0.0,
        }
    }

    #[test]
    fn test_metrics_with_no_points() {
        let mut result = empty_result();
        result.compute_metrics();
        assert_eq!(result.points_with_matches, 0);
        assert_eq!(result.route_length, 0.0);
        assert_eq!(result.avg_dist_to_road, None);
        assert!(result.matched_target_ids.is_empty());
    }

    #[test]
    fn test_metrics_accumulate_chosen_predictions() {
        let mut result = empty_result();
        let first = result.arena.alloc(SnappedPointPrediction {
            feature_id: "a".to_string(),
            candidate: 0,
            snapped_point: Point::new(0.0, 0.0),
            distance_to_snapped_road: 4.0,
            route_distance_to_prev_point: None,
            emission_prob: 0.5,
            best_transition_prob: 1.0,
            best_log_prob: -1.0,
            best_prev_prediction: None,
            best_sequence: vec!["a".to_string()],
            best_route_via_points: vec![],
            best_revisited_via_points_count: 0,
            best_revisited_segments_count: 0,
        });
        let second = result.arena.alloc(SnappedPointPrediction {
            feature_id: "a".to_string(),
            candidate: 0,
            snapped_point: Point::new(0.0, 0.0),
            distance_to_snapped_road: 6.0,
            route_distance_to_prev_point: Some(25.125),
            emission_prob: 0.5,
            best_transition_prob: 0.2,
            best_log_prob: -2.0,
            best_prev_prediction: Some(first),
            best_sequence: vec!["a".to_string()],
            best_route_via_points: vec![],
            best_revisited_via_points_count: 1,
            best_revisited_segments_count: 2,
        });
        let mut p0 = PointSnapInfo::new(0, Point::new(0.0, 0.0));
        p0.best_prediction = Some(first);
        let mut p1 = PointSnapInfo::new(1, Point::new(0.001, 0.0));
        p1.best_prediction = Some(second);
        result.points = vec![p0, p1];

        result.compute_metrics();
        assert_eq!(result.points_with_matches, 2);
        assert_eq!(result.route_length, 25.13);
        assert_eq!(result.avg_dist_to_road, Some(5.0));
        assert_eq!(result.matched_target_ids, vec!["a".to_string()]);
        assert_eq!(result.revisited_via_points, 1);
        assert_eq!(result.revisited_segments, 2);
    }
}
