use geo::Point;
use serde::Serialize;

/// Index of a prediction in its trace's [`PredictionArena`].
///
/// Predecessor links between predictions form a DAG over the lattice; the
/// arena keeps that DAG in a flat vector so nodes can reference their
/// predecessors without shared ownership, and the whole structure drops as
/// a unit with the trace result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PredictionId(pub u32);

/// One lattice node: a candidate feature considered for a trace point,
/// with the best path information accumulated up through it.
#[derive(Debug, Clone)]
pub struct SnappedPointPrediction {
    pub feature_id: String,
    /// index of the referenced feature in the trace's candidate slice
    pub candidate: usize,
    /// nearest point on the feature to the original trace point
    pub snapped_point: Point<f64>,
    pub distance_to_snapped_road: f64,
    /// route distance from the previous point's best predecessor, None
    /// for a chain start
    pub route_distance_to_prev_point: Option<f64>,
    pub emission_prob: f64,
    pub best_transition_prob: f64,
    /// accumulated log-probability of the best path through this node
    pub best_log_prob: f64,
    pub best_prev_prediction: Option<PredictionId>,
    /// feature ids traversed from the chain start through this node
    pub best_sequence: Vec<String>,
    /// WKT of junction points introduced by the route to this node
    pub best_route_via_points: Vec<String>,
    pub best_revisited_via_points_count: usize,
    pub best_revisited_segments_count: usize,
}

/// Per-trace arena owning every prediction created while matching.
#[derive(Debug, Clone, Default)]
pub struct PredictionArena {
    predictions: Vec<SnappedPointPrediction>,
}

impl PredictionArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, prediction: SnappedPointPrediction) -> PredictionId {
        let id = PredictionId(self.predictions.len() as u32);
        self.predictions.push(prediction);
        id
    }

    pub fn get(&self, id: PredictionId) -> &SnappedPointPrediction {
        &self.predictions[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}
