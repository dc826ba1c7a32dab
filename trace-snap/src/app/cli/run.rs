use super::cli_args::CliArgs;
use crate::app::snap::{snap_traces, SnapAppConfig};
use crate::app::TraceSnapAppError;
use std::path::PathBuf;

/// runs the trace snapping pipeline from the command line.
pub fn command_line_runner(args: &CliArgs) -> Result<(), TraceSnapAppError> {
    let config = SnapAppConfig {
        input_to_match: PathBuf::from(&args.input_to_match),
        input_overture: PathBuf::from(&args.input_overture),
        output: PathBuf::from(&args.output),
        resolution: args.resolution as usize,
        options: args.trace_snap_options(),
        output_for_judgment: args.judgment,
    };
    snap_traces(&config)
}
