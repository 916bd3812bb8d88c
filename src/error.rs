use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline errors. A stage that hits one of these halts the run;
/// output from earlier stages stays on disk.
#[derive(Debug, Error)]
pub enum CurationError {
    #[error("could not open video source: {0}")]
    SourceUnavailable(String),

    #[error("stage I/O failure: {0}")]
    StageIo(#[from] std::io::Error),

    #[error("image encode/decode failure: {0}")]
    Image(#[from] image::ImageError),

    #[error("run state file is corrupt: {0}")]
    RunState(#[from] serde_json::Error),

    #[error("missing input artifact: {0}")]
    MissingArtifact(PathBuf),

    #[error("invalid frame buffer for {0}x{1} frame")]
    InvalidFrame(u32, u32),

    #[error("oracle failure: {0}")]
    Oracle(#[from] OracleError),
}

/// Local failures from the external classifier/comparator/text collaborator.
/// These never halt the pipeline; they are converted per-stage policy
/// (removal for classification, "not a duplicate" for comparison) and counted.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed oracle response: {0}")]
    Malformed(String),

    #[error("I/O error reading oracle input: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing configuration: {0}")]
    Config(String),
}
