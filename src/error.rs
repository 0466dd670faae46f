use std::path::PathBuf;
use thiserror::Error;

/// Failures the driver needs to tell apart. Everything else travels as a
/// plain `anyhow::Error`.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error(
        "could not remove previous output {}; close any program holding it open and retry",
        .path.display()
    )]
    OutputLocked {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unparseable date {value:?}")]
    MalformedDate { value: String },

    #[error("response is not a JSON array of records")]
    MalformedBatch(#[source] serde_json::Error),
}
