pub mod snap_app;

pub use snap_app::{snap_traces, SnapAppConfig};
