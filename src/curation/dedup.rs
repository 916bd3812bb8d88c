use log::{info, warn};

use crate::curation::retry::RetryPolicy;
use crate::curation::scene::{Scene, SceneState};
use crate::error::CurationError;
use crate::oracle::{is_affirmative, VisionOracle};

#[derive(Debug)]
pub struct DedupOutcome {
    /// Surviving scenes, ascending by number, state `Kept`.
    pub kept: Vec<Scene>,
    /// Comparator failures converted to "not a duplicate".
    pub failures: u32,
}

/// Collapses near-duplicate scenes to a single representative.
///
/// Scenes are walked most-recent-first; each one is compared against every
/// smaller-numbered scene and yields to the first affirmative match. The
/// net effect is that the earliest occurrence of a repeated slide always
/// survives. Comparator ambiguity (errors after retries) keeps content:
/// a pair that cannot be compared is treated as distinct.
pub struct DuplicateEliminator<'a> {
    oracle: &'a dyn VisionOracle,
    retry: RetryPolicy,
}

impl<'a> DuplicateEliminator<'a> {
    pub fn new(oracle: &'a dyn VisionOracle, retry: RetryPolicy) -> Self {
        Self { oracle, retry }
    }

    pub fn deduplicate(
        &self,
        mut scenes: Vec<Scene>,
        prompt: &str,
    ) -> Result<DedupOutcome, CurationError> {
        scenes.sort_by(|a, b| b.number.cmp(&a.number));

        let mut failures = 0u32;
        let mut duplicate = vec![false; scenes.len()];

        for i in 0..scenes.len() {
            for j in i + 1..scenes.len() {
                let verdict = self.retry.run("duplicate comparison", || {
                    self.oracle.compare_images(
                        &scenes[i].image_path,
                        &scenes[j].image_path,
                        prompt,
                    )
                });

                match verdict {
                    Ok(v) if is_affirmative(&v) => {
                        // first match wins; no need to scan further back
                        info!(
                            "scene {} duplicates earlier scene {}",
                            scenes[i].number, scenes[j].number
                        );
                        duplicate[i] = true;
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(
                            "comparison of scenes {} and {} failed: {}; treating as distinct",
                            scenes[i].number, scenes[j].number, err
                        );
                        failures += 1;
                    }
                }
            }
        }

        let mut kept = Vec::new();
        for (i, mut scene) in scenes.into_iter().enumerate() {
            if duplicate[i] {
                scene.destroy()?;
            } else {
                scene.state = SceneState::Kept;
                kept.push(scene);
            }
        }
        kept.sort_by_key(|s| s.number);

        Ok(DedupOutcome { kept, failures })
    }
}
