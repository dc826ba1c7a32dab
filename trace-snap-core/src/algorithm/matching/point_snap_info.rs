use super::prediction::PredictionId;
use geo::Point;

/// Per-vertex matching state and output for a trace.
#[derive(Debug, Clone)]
pub struct PointSnapInfo {
    /// 0-based position in the trace
    pub index: usize,
    pub original_point: Point<f64>,
    /// timestamp of this vertex, when the trace carries times
    pub time: Option<String>,
    /// seconds since the previous chained point
    pub time_since_prev: Option<f64>,
    /// lattice nodes for this vertex, sorted descending by best_log_prob
    pub predictions: Vec<PredictionId>,
    /// chosen after backtracking; None when no path was found
    pub best_prediction: Option<PredictionId>,
    /// set when the point produced no candidates
    pub ignore: bool,
}

impl PointSnapInfo {
    pub fn new(index: usize, original_point: Point<f64>) -> Self {
        Self {
            index,
            original_point,
            time: None,
            time_since_prev: None,
            predictions: Vec::new(),
            best_prediction: None,
            ignore: false,
        }
    }
}
