use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::config::CurationConfig;
use crate::curation::classifier::ContentClassifierGate;
use crate::curation::dedup::DuplicateEliminator;
use crate::curation::detector::SceneChangeDetector;
use crate::curation::frame::{Frame, SourceOpener};
use crate::curation::retry::RetryPolicy;
use crate::curation::scene::{scan_scenes, scene_image_path};
use crate::curation::ssim::FrameSimilarity;
use crate::error::CurationError;
use crate::oracle::VisionOracle;

pub const RUN_STATE_FILE: &str = "curation_run.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StageId {
    Detecting,
    Classifying,
    Deduplicating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Started,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub detected: u32,
    pub meaningful: u32,
    pub unique: u32,
}

/// Per-run record, persisted to `curation_run.json` in the output folder
/// after every completed stage. A later invocation against the same folder
/// loads it and resumes from the first incomplete stage, reporting the
/// recorded counts for everything it skips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub output_folder: PathBuf,
    pub stages_completed: BTreeSet<StageId>,
    pub counts: StageCounts,
    pub status: RunStatus,
    pub error: Option<String>,
    pub classification_failures: u32,
    pub comparison_failures: u32,
}

impl PipelineRun {
    fn new(output_folder: &Path) -> Self {
        Self {
            output_folder: output_folder.to_path_buf(),
            stages_completed: BTreeSet::new(),
            counts: StageCounts::default(),
            status: RunStatus::Started,
            error: None,
            classification_failures: 0,
            comparison_failures: 0,
        }
    }

    /// Resumes from the persisted record if one exists. A resumed run
    /// starts over as `Started` with a clean error slot; completed-stage
    /// evidence and counts carry forward.
    pub fn load_or_new(output_folder: &Path) -> Result<Self, CurationError> {
        let state_path = output_folder.join(RUN_STATE_FILE);
        if !state_path.exists() {
            return Ok(Self::new(output_folder));
        }
        let mut run: PipelineRun = serde_json::from_str(&fs::read_to_string(state_path)?)?;
        run.output_folder = output_folder.to_path_buf();
        run.status = RunStatus::Started;
        run.error = None;
        Ok(run)
    }

    pub fn stage_done(&self, stage: StageId) -> bool {
        self.stages_completed.contains(&stage)
    }

    fn save(&self) -> Result<(), CurationError> {
        let state_path = self.output_folder.join(RUN_STATE_FILE);
        fs::write(state_path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Sequences Detecting → Classifying → Deduplicating over one output
/// folder. Every stage is idempotent; a failed or cancelled run can be
/// re-invoked and picks up where it stopped.
///
/// The output folder follows single-writer-per-run discipline: running two
/// pipelines against the same folder concurrently is a caller error the
/// orchestrator does not arbitrate.
pub struct CurationPipeline<'a> {
    config: CurationConfig,
    oracle: &'a dyn VisionOracle,
    similarity: &'a dyn FrameSimilarity,
    retry: RetryPolicy,
}

impl<'a> CurationPipeline<'a> {
    pub fn new(
        config: CurationConfig,
        oracle: &'a dyn VisionOracle,
        similarity: &'a dyn FrameSimilarity,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            config,
            oracle,
            similarity,
            retry,
        }
    }

    /// Runs the pipeline to completion or first fatal error. The source is
    /// opened lazily, only if the detection stage actually has to run.
    /// Fatal errors are recorded on the returned run (`Failed` status plus
    /// the error text); earlier stage output stays on disk.
    pub fn run(&self, opener: &mut SourceOpener) -> PipelineRun {
        let mut run = match self.prepare(&self.config.output_folder) {
            Ok(run) => run,
            Err(err) => {
                error!("could not prepare output folder: {}", err);
                let mut run = PipelineRun::new(&self.config.output_folder);
                run.status = RunStatus::Failed;
                run.error = Some(err.to_string());
                return run;
            }
        };

        match self.execute(&mut run, opener) {
            Ok(()) => {
                run.status = RunStatus::Completed;
                info!(
                    "curation complete: {} detected, {} meaningful, {} unique",
                    run.counts.detected, run.counts.meaningful, run.counts.unique
                );
            }
            Err(err) => {
                error!("pipeline failed: {}", err);
                run.status = RunStatus::Failed;
                run.error = Some(err.to_string());
            }
        }

        if let Err(err) = run.save() {
            error!("could not persist run state: {}", err);
        }
        run
    }

    fn prepare(&self, folder: &Path) -> Result<PipelineRun, CurationError> {
        fs::create_dir_all(folder)?;
        PipelineRun::load_or_new(folder)
    }

    fn execute(&self, run: &mut PipelineRun, opener: &mut SourceOpener) -> Result<(), CurationError> {
        self.detect_stage(run, opener)?;
        self.classify_stage(run)?;
        self.dedup_stage(run)?;
        Ok(())
    }

    fn detect_stage(
        &self,
        run: &mut PipelineRun,
        opener: &mut SourceOpener,
    ) -> Result<(), CurationError> {
        if run.stage_done(StageId::Detecting) {
            info!(
                "detection already complete ({} scenes), skipping",
                run.counts.detected
            );
            return Ok(());
        }

        // scene images already on disk count as detection evidence, even
        // without a state file from a previous invocation
        let existing = scan_scenes(&run.output_folder)?;
        if !existing.is_empty() {
            info!(
                "found {} existing scene images, adopting as detection output",
                existing.len()
            );
            run.counts.detected = existing.len() as u32;
            run.stages_completed.insert(StageId::Detecting);
            run.save()?;
            return Ok(());
        }

        let mut source = opener()?;
        info!(
            "detecting scenes: {} frames at {:.2} fps",
            source.frame_count(),
            source.fps()
        );

        let mut detector = SceneChangeDetector::new(self.config.detector.clone());
        while let Some(frame) = source.read_frame() {
            if let Some(emit) = detector.observe(&frame, self.similarity) {
                self.persist_frame(&frame, emit.number)?;
            }
        }

        run.counts.detected = detector.emitted_count();
        run.stages_completed.insert(StageId::Detecting);
        run.save()?;
        info!("detected {} scenes", run.counts.detected);
        Ok(())
    }

    fn persist_frame(&self, frame: &Frame, scene_number: u32) -> Result<(), CurationError> {
        let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or(CurationError::InvalidFrame(frame.width, frame.height))?;
        img.save(scene_image_path(&self.config.output_folder, scene_number))?;
        Ok(())
    }

    fn classify_stage(&self, run: &mut PipelineRun) -> Result<(), CurationError> {
        if run.stage_done(StageId::Classifying) {
            info!(
                "classification already complete ({} meaningful), skipping",
                run.counts.meaningful
            );
            return Ok(());
        }

        let scenes = scan_scenes(&run.output_folder)?;
        let gate = ContentClassifierGate::new(self.oracle, self.retry.clone());
        let outcome = gate.classify(scenes, &self.config.meaningful_prompt)?;

        run.counts.meaningful = outcome.kept.len() as u32;
        run.classification_failures += outcome.failures;
        run.stages_completed.insert(StageId::Classifying);
        run.save()?;
        info!("{} meaningful scenes kept", run.counts.meaningful);
        Ok(())
    }

    fn dedup_stage(&self, run: &mut PipelineRun) -> Result<(), CurationError> {
        if run.stage_done(StageId::Deduplicating) {
            info!(
                "deduplication already complete ({} unique), skipping",
                run.counts.unique
            );
            return Ok(());
        }

        let scenes = scan_scenes(&run.output_folder)?;
        let eliminator = DuplicateEliminator::new(self.oracle, self.retry.clone());
        let outcome = eliminator.deduplicate(scenes, &self.config.duplicate_prompt)?;

        run.counts.unique = outcome.kept.len() as u32;
        run.comparison_failures += outcome.failures;
        run.stages_completed.insert(StageId::Deduplicating);
        run.save()?;
        info!("{} unique scenes remain", run.counts.unique);
        Ok(())
    }
}
