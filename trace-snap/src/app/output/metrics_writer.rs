use super::suffixed;
use crate::app::TraceSnapAppError;
use std::path::Path;
use trace_snap_core::algorithm::matching::TraceMatchResult;
use wkt::ToWkt;

/// Writes the per-trace auto metrics as a tab separated file next to the
/// main output.
pub fn write_auto_metrics(
    results: &[TraceMatchResult],
    output: &Path,
) -> Result<(), TraceSnapAppError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(suffixed(output, ".auto_metrics.txt"))?;
    writer.write_record([
        "id",
        "source_length",
        "route_length",
        "points",
        "points_with_match",
        "percent_points_with_match",
        "target_candidates_count",
        "matched_target_ids_count",
        "avg_dist_to_road",
        "sequence_breaks",
        "revisited_via_points",
        "revisited_segments",
        "elapsed",
        "source_wkt",
    ])?;
    for result in results {
        let percent = if result.points.is_empty() {
            "0.00".to_string()
        } else {
            format!(
                "{:.2}",
                100.0 * result.points_with_matches as f64 / result.points.len() as f64
            )
        };
        writer.write_record([
            result.id.clone(),
            result.source_length.to_string(),
            result.route_length.to_string(),
            result.points.len().to_string(),
            result.points_with_matches.to_string(),
            percent,
            result.target_candidates_count.to_string(),
            result.matched_target_ids.len().to_string(),
            result
                .avg_dist_to_road
                .map(|d| d.to_string())
                .unwrap_or_default(),
            result.sequence_breaks.to_string(),
            result.revisited_via_points.to_string(),
            result.revisited_segments.to_string(),
            result.elapsed.to_string(),
            result.source_wkt.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the two judgment files: one row per trace point with the point
/// WKT, and one with the snapped point WKT.
pub fn write_judgment_files(
    results: &[TraceMatchResult],
    output: &Path,
) -> Result<(), TraceSnapAppError> {
    let mut judgment = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(suffixed(output, ".for_judgment.txt"))?;
    judgment.write_record(["trace_id", "point_index", "trace_point_wkt", "gers_id"])?;
    for result in results {
        for point in &result.points {
            judgment.write_record([
                result.id.clone(),
                point.index.to_string(),
                point.original_point.wkt_string(),
                result
                    .best_prediction(point)
                    .map(|b| b.feature_id.clone())
                    .unwrap_or_default(),
            ])?;
        }
    }
    judgment.flush()?;

    let mut snapped = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(suffixed(output, ".snapped_points.txt"))?;
    snapped.write_record(["trace_id", "point_index", "gers_id", "snapped_point_wkt"])?;
    for result in results {
        for point in &result.points {
            let best = result.best_prediction(point);
            snapped.write_record([
                result.id.clone(),
                point.index.to_string(),
                best.map(|b| b.feature_id.clone()).unwrap_or_default(),
                best.map(|b| b.snapped_point.wkt_string()).unwrap_or_default(),
            ])?;
        }
    }
    snapped.flush()?;
    Ok(())
}
