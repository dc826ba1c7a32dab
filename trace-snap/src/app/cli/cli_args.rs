use clap::Parser;
use trace_snap_core::algorithm::matching::TraceSnapOptions;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Input file containing features to match, in GeoJSON format
    #[arg(long = "input-to-match", value_name = "*.geojson")]
    pub input_to_match: String,

    /// Input file containing the road network features, in GeoJSON format
    #[arg(long = "input-overture", value_name = "*.geojson")]
    pub input_overture: String,

    /// Output file receiving the match results
    #[arg(long)]
    pub output: String,

    /// Geohash cell resolution used to pre-filter candidates
    #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u8).range(1..=12))]
    pub resolution: u8,

    /// Sigma param - controlling tolerance to GPS noise (meters)
    #[arg(long, default_value_t = 10.0)]
    pub sigma: f64,

    /// Beta param - controlling confidence in route
    #[arg(long, default_value_t = 5.0)]
    pub beta: f64,

    /// Allow same sequence to revisit same segment with other segment(s) in between
    #[arg(long = "allow_loops", default_value_t = false)]
    pub allow_loops: bool,

    /// Maximum distance in meters between a trace point and a match candidate road
    #[arg(long = "max_point_to_road_distance", default_value_t = 100.0)]
    pub max_point_to_road_distance: f64,

    /// Maximum difference between route and trace lengths in meters
    #[arg(long = "max_route_to_trace_distance_difference", default_value_t = 300.0)]
    pub max_route_to_trace_distance_difference: f64,

    /// How much to penalize a route with one segment revisit
    #[arg(long = "revisit_segment_penalty_weight", default_value_t = 1.0)]
    pub revisit_segment_penalty_weight: f64,

    /// How much to penalize a route with one via-point revisit
    #[arg(long = "revisit_via_point_penalty_weight", default_value_t = 1.0)]
    pub revisit_via_point_penalty_weight: f64,

    /// How big the time gap in seconds between points without valid route
    /// options before we consider it a broken sequence
    #[arg(long = "broken_time_gap_reset_sequence", default_value_t = 60.0)]
    pub broken_time_gap_reset_sequence: f64,

    /// How big the distance gap in meters between points without valid
    /// route options before we consider it a broken sequence
    #[arg(long = "broken_distance_gap_reset_sequence", default_value_t = 200.0)]
    pub broken_distance_gap_reset_sequence: f64,

    /// Also output the matches as a 'pre-labeled' file for judgment
    #[arg(long = "j", default_value_t = false)]
    pub judgment: bool,
}

impl CliArgs {
    pub fn trace_snap_options(&self) -> TraceSnapOptions {
        TraceSnapOptions {
            sigma: self.sigma,
            beta: self.beta,
            allow_loops: self.allow_loops,
            max_point_to_road_distance: self.max_point_to_road_distance,
            max_route_to_trace_distance_difference: self.max_route_to_trace_distance_difference,
            revisit_segment_penalty_weight: self.revisit_segment_penalty_weight,
            revisit_via_point_penalty_weight: self.revisit_via_point_penalty_weight,
            broken_time_gap_reset_sequence: self.broken_time_gap_reset_sequence,
            broken_distance_gap_reset_sequence: self.broken_distance_gap_reset_sequence,
        }
    }
}
