#[derive(thiserror::Error, Debug)]
pub enum TraceSnapAppError {
    #[error("input file {0} does not exist")]
    InputMissing(String),
    #[error("no features loaded from {0}")]
    EmptyFeatureSet(String),
    #[error("failure reading GeoJSON from {path}: {message}")]
    InvalidGeoJson { path: String, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
