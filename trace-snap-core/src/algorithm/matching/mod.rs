mod hmm_trace_matcher;
mod point_snap_info;
mod prediction;
mod sequence;
mod trace_match_result;
mod trace_snap_options;

pub use hmm_trace_matcher::HmmTraceMatcher;
pub use point_snap_info::PointSnapInfo;
pub use prediction::{PredictionArena, PredictionId, SnappedPointPrediction};
pub use sequence::{extend_sequence, SequenceExtension};
pub use trace_match_result::TraceMatchResult;
pub use trace_snap_options::TraceSnapOptions;
