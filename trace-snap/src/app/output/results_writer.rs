use super::suffixed;
use crate::app::TraceSnapAppError;
use serde_json::{json, Value};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use trace_snap_core::algorithm::matching::{SnappedPointPrediction, TraceMatchResult};
use wkt::ToWkt;

/// Writes the JSON result files: the plain results, a variant with
/// diagnostic fields, and a variant that additionally includes every
/// prediction per point.
pub fn write_trace_snap_results(
    results: &[TraceMatchResult],
    output: &Path,
) -> Result<(), TraceSnapAppError> {
    write_results_json(results, output, false, false)?;
    write_results_json(results, &suffixed(output, ".with_diagnostics.json"), true, false)?;
    write_results_json(
        results,
        &suffixed(output, ".with_diagnostics-all-predictions.json"),
        true,
        true,
    )?;
    Ok(())
}

fn write_results_json(
    results: &[TraceMatchResult],
    path: &Path,
    diagnostic_mode: bool,
    include_all_predictions: bool,
) -> Result<(), TraceSnapAppError> {
    let json: Vec<Value> = results
        .iter()
        .map(|r| result_to_json(r, diagnostic_mode, include_all_predictions))
        .collect();
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &json)?;
    Ok(())
}

pub fn result_to_json(
    result: &TraceMatchResult,
    diagnostic_mode: bool,
    include_all_predictions: bool,
) -> Value {
    let points: Vec<Value> = result
        .points
        .iter()
        .map(|point| {
            let mut value = json!({
                "index": point.index,
                "original_point": point.original_point.wkt_string(),
                "time": point.time,
                "time_since_prev_point": point.time_since_prev,
                "best_prediction": result
                    .best_prediction(point)
                    .map(|best| prediction_to_json(best, diagnostic_mode)),
            });
            if diagnostic_mode {
                value["ignore"] = json!(point.ignore);
            }
            if include_all_predictions {
                value["predictions"] = Value::Array(
                    point
                        .predictions
                        .iter()
                        .map(|&id| prediction_to_json(result.prediction(id), diagnostic_mode))
                        .collect(),
                );
            }
            value
        })
        .collect();

    let mut value = json!({
        "id": result.id,
        "source_wkt": result.source_wkt,
        "source_length": result.source_length,
        "route_length": result.route_length,
        "points": points,
        "points_with_matches": result.points_with_matches,
        "sequence_breaks": result.sequence_breaks,
        "elapsed": result.elapsed,
    });
    if diagnostic_mode {
        value["target_candidates_count"] = json!(result.target_candidates_count);
        value["matched_target_ids"] = json!(result.matched_target_ids);
        value["avg_dist_to_road"] = json!(result.avg_dist_to_road);
        value["revisited_via_points"] = json!(result.revisited_via_points);
        value["revisited_segments"] = json!(result.revisited_segments);
    }
    value
}

fn prediction_to_json(prediction: &SnappedPointPrediction, diagnostic_mode: bool) -> Value {
    let mut value = json!({
        "id": prediction.feature_id,
        "snapped_point": prediction.snapped_point.wkt_string(),
        "distance_to_snapped_road": prediction.distance_to_snapped_road,
        "route_distance_to_prev_point": prediction.route_distance_to_prev_point,
        "emission_prob": prediction.emission_prob,
        "best_transition_prob": prediction.best_transition_prob,
        "best_log_prob": prediction.best_log_prob,
    });
    if diagnostic_mode {
        value["best_sequence"] = json!(prediction.best_sequence);
        value["best_route_via_points"] = json!(prediction.best_route_via_points);
        value["best_revisited_via_points_count"] =
            json!(prediction.best_revisited_via_points_count);
        value["best_revisited_segments_count"] = json!(prediction.best_revisited_segments_count);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;
    use trace_snap_core::algorithm::matching::{HmmTraceMatcher, TraceSnapOptions};
    use trace_snap_core::model::feature::{FeatureGeometry, MatchableFeature};

    fn matched_result() -> TraceMatchResult {
        let road = MatchableFeature::new(
            "road".to_string(),
            FeatureGeometry::LineString(geo::line_string![
                (x: 0.0, y: 0.0), (x: 0.002, y: 0.0)
            ]),
        );
        let trace = MatchableFeature::new(
            "trace".to_string(),
            FeatureGeometry::LineString(geo::line_string![
                (x: 0.0, y: 0.0), (x: 0.001, y: 0.0)
            ]),
        );
        let matcher = HmmTraceMatcher::new(TraceSnapOptions::default());
        matcher.match_trace(&trace, &[&road])
    }

    #[test]
    fn test_plain_json_shape() {
        let result = matched_result();
        let value = result_to_json(&result, false, false);
        assert_eq!(value["id"], "trace");
        assert_eq!(value["points"].as_array().unwrap().len(), 2);
        let best = &value["points"][0]["best_prediction"];
        assert_eq!(best["id"], "road");
        assert!(best["snapped_point"].as_str().unwrap().starts_with("POINT"));
        assert!(best.get("best_sequence").is_none());
        assert!(value["points"][0].get("predictions").is_none());
        assert!(value.get("avg_dist_to_road").is_none());
    }

    #[test]
    fn test_diagnostic_json_adds_fields() {
        let result = matched_result();
        let value = result_to_json(&result, true, false);
        assert!(value.get("avg_dist_to_road").is_some());
        assert_eq!(value["target_candidates_count"], 1);
        let best = &value["points"][1]["best_prediction"];
        assert_eq!(best["best_sequence"][0], "road");
    }

    #[test]
    fn test_all_predictions_included() {
        let result = matched_result();
        let value = result_to_json(&result, true, true);
        let predictions = value["points"][0]["predictions"].as_array().unwrap();
        assert_eq!(predictions.len(), 1);
    }

    #[test]
    fn test_files_written() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");
        let results = vec![matched_result()];
        write_trace_snap_results(&results, &output).unwrap();
        assert!(output.exists());
        assert!(suffixed(&output, ".with_diagnostics.json").exists());
        assert!(suffixed(&output, ".with_diagnostics-all-predictions.json").exists());
        let raw = std::fs::read_to_string(&output).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
