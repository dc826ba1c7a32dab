use super::point_snap_info::PointSnapInfo;
use super::prediction::{PredictionArena, PredictionId, SnappedPointPrediction};
use super::sequence::extend_sequence;
use super::trace_match_result::TraceMatchResult;
use super::trace_snap_options::TraceSnapOptions;
use crate::algorithm::route::shortest_route;
use crate::model::feature::MatchableFeature;
use crate::model::road_graph::RoadGraph;
use crate::util::geo::haversine::point_distance_meters;
use crate::util::geo::linestring_ops::SnappedPosition;
use crate::util::time::seconds_elapsed;
use geo::Point;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::f64::consts::PI;
use std::time::Instant;
use wkt::ToWkt;

/// Hidden Markov Model trace matcher.
///
/// Each trace vertex emits a set of candidate road features weighted by a
/// Gaussian of the point-to-road distance; transitions between candidates
/// of consecutive vertices are weighted by how closely the routed distance
/// through the road graph tracks the straight-line distance between the
/// vertices. The most probable path through the resulting lattice is
/// recovered by backtracking predecessor links from the last point.
///
/// Probabilities are accumulated in log space so long traces do not
/// underflow. Matching never fails: a vertex with no viable candidate is
/// flagged and the chain either heals around it or restarts.
#[derive(Debug, Clone, Default)]
pub struct HmmTraceMatcher {
    pub options: TraceSnapOptions,
}

impl HmmTraceMatcher {
    pub fn new(options: TraceSnapOptions) -> Self {
        Self { options }
    }

    /// measurement probability: if the traveler was on this road, how
    /// likely is a GPS fix at this distance from it.
    fn emission_probability(&self, distance_meters: f64) -> f64 {
        let sigma = self.options.sigma;
        (1.0 / ((2.0 * PI).sqrt() * sigma))
            * (-0.5 * (distance_meters / sigma).powi(2)).exp()
    }

    /// base transition probability from the difference between routed and
    /// straight-line distance.
    fn transition_probability(&self, distance_difference_meters: f64) -> f64 {
        let beta = self.options.beta;
        (1.0 / beta) * (-distance_difference_meters / beta).exp()
    }

    /// Matches a source trace to the most likely traveled candidate road
    /// features.
    pub fn match_trace(
        &self,
        source: &MatchableFeature,
        candidates: &[&MatchableFeature],
    ) -> TraceMatchResult {
        let start = Instant::now();

        let graph = RoadGraph::new(candidates);
        let times = source.times.as_deref();

        let mut arena = PredictionArena::new();
        let mut points: Vec<PointSnapInfo> = Vec::new();
        let mut prev_index: Option<usize> = None;
        let mut sequence_breaks = 0usize;

        let vertices: Vec<_> = source.geometry.vertices().collect();
        for (index, coord) in vertices.iter().enumerate() {
            let original_point = Point::from(*coord);
            let trace_dist_from_prev = prev_index
                .map(|p| point_distance_meters(&original_point, &points[p].original_point));

            let mut predictions: Vec<PredictionId> = Vec::new();
            for (candidate_index, target) in candidates.iter().enumerate() {
                let Some(snapped) = target.geometry.nearest(&original_point) else {
                    continue;
                };
                if snapped.distance_meters > self.options.max_point_to_road_distance {
                    continue;
                }
                let emission_prob = self.emission_probability(snapped.distance_meters);

                let prediction = match prev_index {
                    None => Some(self.chain_start(candidate_index, target, &snapped, emission_prob)),
                    Some(prev) => self.best_transition(
                        candidates,
                        &graph,
                        &arena,
                        &points[prev],
                        candidate_index,
                        target,
                        &snapped,
                        emission_prob,
                        trace_dist_from_prev.unwrap_or(0.0),
                    ),
                };
                if let Some(prediction) = prediction {
                    predictions.push(arena.alloc(prediction));
                }
            }

            predictions.sort_by_key(|&id| Reverse(OrderedFloat(arena.get(id).best_log_prob)));

            let time = times.and_then(|t| t.get(index)).cloned();
            let time_since_prev = match (times, prev_index) {
                (Some(t), Some(prev)) => match (t.get(points[prev].index), t.get(index)) {
                    (Some(a), Some(b)) => seconds_elapsed(a, b),
                    _ => None,
                },
                _ => None,
            };

            let has_predictions = !predictions.is_empty();
            let mut point = PointSnapInfo::new(index, original_point);
            point.time = time;
            point.time_since_prev = time_since_prev;
            point.predictions = predictions;
            points.push(point);

            if has_predictions {
                prev_index = Some(index);
            } else {
                // no candidates here: drop this point and the previous one
                // from the chain and try to heal by rewinding a step; a
                // real gap beyond the configured thresholds resets the
                // chain instead
                points[index].ignore = true;
                if let Some(prev) = prev_index {
                    points[prev].ignore = true;
                    if points[prev].index > 0 {
                        prev_index = Some(points[prev].index - 1);
                        let time_gap = time_since_prev
                            .map(|t| t > self.options.broken_time_gap_reset_sequence)
                            .unwrap_or(false);
                        let distance_gap = trace_dist_from_prev
                            .map(|d| d > self.options.broken_distance_gap_reset_sequence)
                            .unwrap_or(false);
                        if time_gap || distance_gap {
                            sequence_breaks += 1;
                            prev_index = None;
                        }
                    } else {
                        prev_index = None;
                    }
                }
            }
        }

        set_best_path_predictions(&mut points, &arena);

        let mut result = TraceMatchResult {
            id: source.id.clone(),
            source_wkt: source.geometry.wkt_string(),
            source_length: source.length_meters(),
            points,
            arena,
            target_candidates_count: candidates.len(),
            route_length: 0.0,
            avg_dist_to_road: None,
            matched_target_ids: Vec::new(),
            points_with_matches: 0,
            sequence_breaks,
            revisited_via_points: 0,
            revisited_segments: 0,
            elapsed: start.elapsed().as_secs_f64(),
        };
        result.compute_metrics();
        result
    }

    fn chain_start(
        &self,
        candidate_index: usize,
        target: &MatchableFeature,
        snapped: &SnappedPosition,
        emission_prob: f64,
    ) -> SnappedPointPrediction {
        SnappedPointPrediction {
            feature_id: target.id.clone(),
            candidate: candidate_index,
            snapped_point: snapped.point,
            distance_to_snapped_road: snapped.distance_meters,
            route_distance_to_prev_point: None,
            emission_prob,
            best_transition_prob: 1.0,
            best_log_prob: emission_prob.ln(),
            best_prev_prediction: None,
            best_sequence: vec![target.id.clone()],
            best_route_via_points: Vec::new(),
            best_revisited_via_points_count: 0,
            best_revisited_segments_count: 0,
        }
    }

    /// scores the transition from every prediction of the previous point
    /// to this candidate and keeps the most probable one. None when no
    /// predecessor admits a viable route.
    #[allow(clippy::too_many_arguments)]
    fn best_transition(
        &self,
        candidates: &[&MatchableFeature],
        graph: &RoadGraph,
        arena: &PredictionArena,
        prev_point: &PointSnapInfo,
        candidate_index: usize,
        target: &MatchableFeature,
        snapped: &SnappedPosition,
        emission_prob: f64,
        trace_dist_from_prev: f64,
    ) -> Option<SnappedPointPrediction> {
        let mut best: Option<SnappedPointPrediction> = None;
        let no_exclusions: [String; 0] = [];

        for &prev_id in &prev_point.predictions {
            let prev_prediction = arena.get(prev_id);

            if !self.options.allow_loops
                && prev_prediction.best_sequence.iter().any(|id| *id == target.id)
                && prev_prediction.feature_id != target.id
            {
                // the chain already left this feature once; coming back
                // would walk back on itself
                continue;
            }

            let excluded: &[String] = if self.options.allow_loops {
                &no_exclusions
            } else {
                &prev_prediction.best_sequence
            };
            let Some(route) = shortest_route(
                candidates,
                graph,
                prev_prediction.candidate,
                candidate_index,
                &prev_prediction.snapped_point,
                &snapped.point,
                excluded,
            ) else {
                continue;
            };
            if !route.is_reachable() {
                continue;
            }

            let dist_diff = (trace_dist_from_prev - route.distance).abs();
            if dist_diff > self.options.max_route_to_trace_distance_difference {
                continue;
            }

            let mut transition_prob = self.transition_probability(dist_diff);
            let extension = extend_sequence(&route.steps, candidates, prev_id, arena);
            transition_prob *= (-(extension.revisited_via_points as f64)
                * self.options.revisit_via_point_penalty_weight)
                .exp();
            transition_prob *= (-(extension.revisited_segments as f64)
                * self.options.revisit_segment_penalty_weight)
                .exp();
            if transition_prob <= 0.0 {
                continue;
            }

            // probabilities multiplied over many points underflow, so the
            // product is accumulated as a sum of logs
            let log_prob =
                prev_prediction.best_log_prob + emission_prob.ln() + transition_prob.ln();

            let is_better = best
                .as_ref()
                .map(|b| log_prob > b.best_log_prob)
                .unwrap_or(true);
            if is_better {
                let best_route_via_points = route
                    .steps
                    .iter()
                    .filter_map(|step| step.via_point.as_ref().map(|p| p.wkt_string()))
                    .collect();
                best = Some(SnappedPointPrediction {
                    feature_id: target.id.clone(),
                    candidate: candidate_index,
                    snapped_point: snapped.point,
                    distance_to_snapped_road: snapped.distance_meters,
                    route_distance_to_prev_point: Some(route.distance),
                    emission_prob,
                    best_transition_prob: transition_prob,
                    best_log_prob: log_prob,
                    best_prev_prediction: Some(prev_id),
                    best_sequence: extension.extended_sequence,
                    best_route_via_points,
                    best_revisited_via_points_count: extension.revisited_via_points,
                    best_revisited_segments_count: extension.revisited_segments,
                });
            }
        }
        best
    }
}

/// Sets the best prediction for each point, starting from the end and
/// walking the best_prev_prediction chain backwards. Points after a break
/// fall back to their locally best prediction.
fn set_best_path_predictions(points: &mut [PointSnapInfo], arena: &PredictionArena) {
    let Some(last) = points.last() else {
        return;
    };
    let never_scored = last
        .predictions
        .first()
        .map(|&id| arena.get(id).best_log_prob == 0.0)
        .unwrap_or(true);
    if last.predictions.is_empty() || never_scored {
        return; // no path found
    }

    let n = points.len();
    points[n - 1].best_prediction = Some(points[n - 1].predictions[0]);
    for index in (0..n - 1).rev() {
        match points[index + 1].best_prediction {
            Some(next_best) => {
                points[index].best_prediction = arena.get(next_best).best_prev_prediction;
            }
            None => {
                if !points[index].ignore && !points[index].predictions.is_empty() {
                    points[index].best_prediction = Some(points[index].predictions[0]);
                }
            }
        }
    }
}
