pub mod metrics_writer;
pub mod results_writer;

use std::path::{Path, PathBuf};

/// companion files sit next to the main output with a suffix appended to
/// its full name, e.g. `out.json.auto_metrics.txt`.
pub(crate) fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", path.display(), suffix))
}
