use serde::{Deserialize, Serialize};

/// Tuning parameters of the HMM trace matcher.
///
/// `sigma` is the standard deviation of GPS measurement error in meters
/// and controls the width of the emission probability; `beta` scales the
/// transition probability and controls how much a mismatch between route
/// length and straight-line trace length is tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSnapOptions {
    /// std. dev. of GPS measurement error (meters)
    pub sigma: f64,
    /// transition probability scale
    pub beta: f64,
    /// allow a best sequence to return to a feature it already left
    pub allow_loops: bool,
    /// candidates farther than this from the trace point are dropped (meters)
    pub max_point_to_road_distance: f64,
    /// transitions whose route length differs from the trace distance by
    /// more than this are rejected (meters)
    pub max_route_to_trace_distance_difference: f64,
    /// exponent weight applied per revisited segment
    pub revisit_segment_penalty_weight: f64,
    /// exponent weight applied per revisited via point
    pub revisit_via_point_penalty_weight: f64,
    /// time gap (seconds) that forces a sequence reset
    pub broken_time_gap_reset_sequence: f64,
    /// distance gap (meters) that forces a sequence reset
    pub broken_distance_gap_reset_sequence: f64,
}

impl Default for TraceSnapOptions {
    fn default() -> Self {
        Self {
            sigma: 10.0,
            beta: 5.0,
            allow_loops: false,
            max_point_to_road_distance: 100.0,
            max_route_to_trace_distance_difference: 300.0,
            revisit_segment_penalty_weight: 1.0,
            revisit_via_point_penalty_weight: 1.0,
            broken_time_gap_reset_sequence: 60.0,
            broken_distance_gap_reset_sequence: 200.0,
        }
    }
}
