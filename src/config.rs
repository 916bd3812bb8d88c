use std::path::PathBuf;

use crate::curation::detector::DetectorConfig;
use crate::prompts;

/// Everything one curation run needs besides the collaborators themselves.
#[derive(Debug, Clone)]
pub struct CurationConfig {
    pub output_folder: PathBuf,
    pub detector: DetectorConfig,
    pub meaningful_prompt: String,
    pub duplicate_prompt: String,
}

impl CurationConfig {
    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self {
            output_folder: output_folder.into(),
            detector: DetectorConfig::default(),
            meaningful_prompt: prompts::MEANINGFUL_CONTENT.to_string(),
            duplicate_prompt: prompts::DUPLICATE_DETECTION.to_string(),
        }
    }

    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }
}
