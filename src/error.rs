/// Error types.
///
/// `SimError` is the only error the simulation core raises. It marks a
/// programmer error at the call site (bad numbers handed to a constructor,
/// a malformed actor legend) and is never caught inside the core.
///
/// `LoadError` belongs to the level-pack loader, which logs and skips
/// sources that fail instead of aborting.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SimError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidArgument(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} contains no levels")]
    Empty { path: PathBuf },
}
