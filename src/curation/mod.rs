//! Scene segmentation and content curation for lecture video.
//!
//! Core flow:
//! 1. Scene change detection - SSIM against the last kept baseline, with
//!    frame skipping and a time debounce
//! 2. Content classification - an external vision model drops frames
//!    without teachable content
//! 3. Duplicate elimination - pairwise comparison keeps the earliest
//!    occurrence of each repeated slide

pub mod classifier;
pub mod dedup;
pub mod detector;
pub mod frame;
pub mod pipeline;
pub mod retry;
pub mod scene;
pub mod ssim;

pub use classifier::{ClassifyOutcome, ContentClassifierGate};
pub use dedup::{DedupOutcome, DuplicateEliminator};
pub use detector::{DetectorConfig, SceneChangeDetector, SceneEmit};
pub use frame::{Frame, FrameSource, SourceOpener};
pub use pipeline::{CurationPipeline, PipelineRun, RunStatus, StageCounts, StageId};
pub use retry::RetryPolicy;
pub use scene::{Scene, SceneState};
pub use ssim::{FrameSimilarity, Ssim};
