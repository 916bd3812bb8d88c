pub mod config;
pub mod curation;
pub mod error;
pub mod notes;
pub mod oracle;
pub mod prompts;

pub use config::CurationConfig;
pub use curation::{CurationPipeline, PipelineRun, RetryPolicy, RunStatus};
pub use error::{CurationError, OracleError};

pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();
}
