//! Downstream notes synthesis: turns the curated scene set plus a
//! transcript artifact into per-scene study notes. Transcription itself and
//! document rendering stay outside this crate; this module only produces
//! the text artifacts they consume.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::curation::retry::RetryPolicy;
use crate::curation::scene::scan_scenes;
use crate::error::CurationError;
use crate::oracle::TextOracle;
use crate::prompts;

pub const TRANSCRIPT_FILE: &str = "transcript.txt";
pub const TRANSCRIPT_SUMMARY_FILE: &str = "transcript_summary.txt";
pub const SUMMARIES_INDEX_FILE: &str = "summaries_index.txt";

pub fn scene_summary_path(folder: &Path, scene_number: u32) -> PathBuf {
    folder.join(format!("scene_{}_summary.txt", scene_number))
}

pub struct NotesSynthesizer<'a> {
    oracle: &'a dyn TextOracle,
    retry: RetryPolicy,
}

impl<'a> NotesSynthesizer<'a> {
    pub fn new(oracle: &'a dyn TextOracle, retry: RetryPolicy) -> Self {
        Self { oracle, retry }
    }

    /// Summarizes `transcript.txt` into `transcript_summary.txt`. An
    /// existing summary is reused without calling the oracle, so a resumed
    /// run never pays for this twice.
    pub fn summarize_transcript(&self, folder: &Path) -> Result<String, CurationError> {
        let summary_path = folder.join(TRANSCRIPT_SUMMARY_FILE);
        if summary_path.exists() {
            info!("transcript summary already present, reusing");
            return Ok(fs::read_to_string(summary_path)?);
        }

        let transcript_path = folder.join(TRANSCRIPT_FILE);
        if !transcript_path.exists() {
            return Err(CurationError::MissingArtifact(transcript_path));
        }
        let transcript = fs::read_to_string(transcript_path)?;

        let prompt = format!("{}\n\n{}", prompts::TRANSCRIPT_SUMMARY, transcript);
        let summary = self
            .retry
            .run("transcript summary", || self.oracle.complete(&prompt))?;

        fs::write(&summary_path, &summary)?;
        info!("transcript summary written to {}", summary_path.display());
        Ok(summary)
    }

    /// One summary per surviving scene, ascending, written to
    /// `scene_<N>_summary.txt`, plus a `summaries_index.txt` manifest.
    /// Scenes with an existing summary are skipped; per-scene oracle
    /// failures are logged and skipped, never fatal.
    pub fn scene_summaries(
        &self,
        folder: &Path,
        transcript_summary: &str,
    ) -> Result<Vec<(u32, String)>, CurationError> {
        let scenes = scan_scenes(folder)?;
        let mut summaries = Vec::new();

        for scene in &scenes {
            let summary_path = scene_summary_path(folder, scene.number);
            if summary_path.exists() {
                info!("summary for scene {} already present, skipping", scene.number);
                summaries.push((scene.number, fs::read_to_string(summary_path)?));
                continue;
            }

            let image_name = format!("scene_{}.png", scene.number);
            let prompt = prompts::SCENE_SUMMARY
                .replace("{transcript}", transcript_summary)
                .replace("{image}", &image_name);

            let summary = match self
                .retry
                .run("scene summary", || self.oracle.complete(&prompt))
            {
                Ok(summary) => summary,
                Err(err) => {
                    warn!("summary for scene {} failed: {}; skipping", scene.number, err);
                    continue;
                }
            };

            let body = format!(
                "Image: {}\nScene Number: {}\n{}\nSummary:\n{}",
                image_name,
                scene.number,
                "-".repeat(50),
                summary
            );
            fs::write(&summary_path, body)?;
            info!("wrote summary for scene {}", scene.number);
            summaries.push((scene.number, summary));
        }

        let mut index = String::from("Image Summaries Index\n====================\n\n");
        for (number, _) in &summaries {
            index.push_str(&format!(
                "- scene_{}.png -> scene_{}_summary.txt\n",
                number, number
            ));
        }
        fs::write(folder.join(SUMMARIES_INDEX_FILE), index)?;

        Ok(summaries)
    }
}
