use crate::app::input::load_matchable_set;
use crate::app::output::metrics_writer::{write_auto_metrics, write_judgment_files};
use crate::app::output::results_writer::write_trace_snap_results;
use crate::app::output::suffixed;
use crate::app::TraceSnapAppError;
use rayon::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;
use trace_snap_core::algorithm::matching::{
    HmmTraceMatcher, TraceMatchResult, TraceSnapOptions,
};
use trace_snap_core::model::feature::MatchableSet;

#[derive(Debug, Clone)]
pub struct SnapAppConfig {
    pub input_to_match: PathBuf,
    pub input_overture: PathBuf,
    pub output: PathBuf,
    pub resolution: usize,
    pub options: TraceSnapOptions,
    pub output_for_judgment: bool,
}

/// Matches every source trace against the road network and writes the
/// result files. Traces are independent, so they are matched in parallel
/// over the shared read-only road set.
pub fn snap_traces(config: &SnapAppConfig) -> Result<(), TraceSnapAppError> {
    // save the options used next to the output for debugging or
    // comparison with other runs
    let options_file = File::create(suffixed(&config.output, ".options.json"))?;
    serde_json::to_writer_pretty(BufWriter::new(options_file), &config.options)?;

    let load_start = Instant::now();
    log::info!("loading features...");
    let to_match = load_matchable_set(&config.input_to_match, false, None, config.resolution)?;
    let overture = load_matchable_set(
        &config.input_overture,
        true,
        Some(("type", "segment")),
        config.resolution,
    )?;
    log::info!("features to match: {}", to_match.len());
    log::info!("road features: {}", overture.len());
    log::info!("loading time: {:.2}s", load_start.elapsed().as_secs_f64());

    let matcher = HmmTraceMatcher::new(config.options.clone());
    let results: Vec<TraceMatchResult> = to_match
        .features
        .par_iter()
        .map(|source| {
            let cells = to_match.cells_of(&source.id).unwrap_or(&[]);
            let candidates = overture.features_with_cells(cells);
            let result = matcher.match_trace(source, &candidates);
            log::info!(
                "trace {} length={:.0}m route_length={:.0}m points={} points_with_matches={} \
                 candidates={} matched_target_ids={} elapsed={:.2}s",
                result.id,
                result.source_length,
                result.route_length,
                result.points.len(),
                result.points_with_matches,
                result.target_candidates_count,
                result.matched_target_ids.len(),
                result.elapsed,
            );
            result
        })
        .collect();

    log_stats(&to_match, &overture, &results);

    log::info!("writing results...");
    let write_start = Instant::now();
    write_trace_snap_results(&results, &config.output)?;
    write_auto_metrics(&results, &config.output)?;
    if config.output_for_judgment {
        write_judgment_files(&results, &config.output)?;
    }
    log::info!("writing time: {:.2}s", write_start.elapsed().as_secs_f64());
    Ok(())
}

/// the aggregate totals block logged after all traces are matched.
fn log_stats(to_match: &MatchableSet, overture: &MatchableSet, results: &[TraceMatchResult]) {
    let num_traces = results.len();
    if num_traces == 0 {
        return;
    }
    let total_elapsed: f64 = results.iter().map(|r| r.elapsed).sum();
    let total_route_length_km: f64 = results.iter().map(|r| r.route_length).sum::<f64>() / 1000.0;
    let total_traces_length_km: f64 =
        results.iter().map(|r| r.source_length).sum::<f64>() / 1000.0;
    let total_candidates: usize = results.iter().map(|r| r.target_candidates_count).sum();
    let total_matches: usize = results.iter().map(|r| r.matched_target_ids.len()).sum();
    let total_sequence_breaks: usize = results.iter().map(|r| r.sequence_breaks).sum();
    let total_revisited_via_points: usize = results.iter().map(|r| r.revisited_via_points).sum();
    let total_revisited_segments: usize = results.iter().map(|r| r.revisited_segments).sum();
    let traces_with_matches = results.iter().filter(|r| r.points_with_matches > 0).count();
    let sum_avg_dist_to_road: f64 = results.iter().filter_map(|r| r.avg_dist_to_road).sum();

    let per_trace = |value: f64| value / num_traces as f64;
    let per_km = |value: f64| {
        if total_traces_length_km > 0.0 {
            value / total_traces_length_km
        } else {
            0.0
        }
    };

    log::info!("==================================================================");
    log::info!("traces.............................{}", num_traces);
    log::info!("features to match..................{}", to_match.len());
    log::info!("target features....................{}", overture.len());
    log::info!(
        "elapsed............................{}min {:.3}s",
        (total_elapsed / 60.0).floor(),
        total_elapsed % 60.0
    );
    log::info!("avg runtime/trace..................{:.3}s", per_trace(total_elapsed));
    log::info!("avg runtime/km.....................{:.3}s", per_km(total_elapsed));
    if traces_with_matches > 0 {
        log::info!(
            "avg distance to snapped road.......{:.2}m",
            sum_avg_dist_to_road / traces_with_matches as f64
        );
    }
    log::info!("snapped route length...............{:.2}km", total_route_length_km);
    log::info!("gps traces length..................{:.2}km", total_traces_length_km);
    if total_traces_length_km > 0.0 {
        log::info!(
            "snapped route len/gps len..........{:.2}",
            total_route_length_km / total_traces_length_km
        );
    }
    log::info!(
        "avg candidate segments.............{:.2}/trace, {:.2}/km",
        per_trace(total_candidates as f64),
        per_km(total_candidates as f64)
    );
    log::info!(
        "avg matched segments...............{:.2}/trace, {:.2}/km",
        per_trace(total_matches as f64),
        per_km(total_matches as f64)
    );
    log::info!(
        "avg sequence breaks................{:.2}/trace, {:.2}/km",
        per_trace(total_sequence_breaks as f64),
        per_km(total_sequence_breaks as f64)
    );
    log::info!(
        "avg revisited via points...........{:.2}/trace, {:.2}/km",
        per_trace(total_revisited_via_points as f64),
        per_km(total_revisited_via_points as f64)
    );
    log::info!(
        "avg revisited segments.............{:.2}/trace, {:.2}/km",
        per_trace(total_revisited_segments as f64),
        per_km(total_revisited_segments as f64)
    );
    log::info!("==================================================================");
}
