use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },
    #[error("malformed input {}: {reason}", path.display())]
    InputMalformed { path: PathBuf, reason: String },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write chart to {}: {reason}", path.display())]
    OutputWrite { path: PathBuf, reason: String },
}

impl PlotError {
    /// Sorts a csv error into the not-found / malformed / io buckets.
    pub fn from_csv(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let path = path.into();
        let reason = match err.position() {
            Some(pos) => format!("line {}: {}", pos.line(), err),
            None => err.to_string(),
        };

        match err.into_kind() {
            csv::ErrorKind::Io(source) if source.kind() == std::io::ErrorKind::NotFound => {
                PlotError::InputNotFound { path }
            }
            csv::ErrorKind::Io(source) => PlotError::Io { path, source },
            _ => PlotError::InputMalformed { path, reason },
        }
    }
}
