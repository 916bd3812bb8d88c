use log::{info, warn};

use crate::curation::retry::RetryPolicy;
use crate::curation::scene::{Scene, SceneState};
use crate::error::CurationError;
use crate::oracle::{is_affirmative, VisionOracle};

#[derive(Debug)]
pub struct ClassifyOutcome {
    /// Surviving scenes, ascending by number, state `Classified`.
    pub kept: Vec<Scene>,
    /// Oracle failures converted to removal (fail-open-to-deletion).
    pub failures: u32,
}

/// Drops scenes without teachable content. Pruning is in-place: a rejected
/// scene's image is deleted immediately, not merely tagged.
///
/// Ambiguity favors deletion here — downstream note generation is hurt more
/// by noise than by an occasional false negative — so an oracle error after
/// retries removes the scene, but is counted so the loss stays visible.
pub struct ContentClassifierGate<'a> {
    oracle: &'a dyn VisionOracle,
    retry: RetryPolicy,
}

impl<'a> ContentClassifierGate<'a> {
    pub fn new(oracle: &'a dyn VisionOracle, retry: RetryPolicy) -> Self {
        Self { oracle, retry }
    }

    pub fn classify(
        &self,
        mut scenes: Vec<Scene>,
        prompt: &str,
    ) -> Result<ClassifyOutcome, CurationError> {
        scenes.sort_by_key(|s| s.number);

        let mut kept = Vec::new();
        let mut failures = 0u32;

        for mut scene in scenes {
            let verdict = self.retry.run("content classification", || {
                self.oracle.classify_image(&scene.image_path, prompt)
            });

            match verdict {
                Ok(v) if is_affirmative(&v) => {
                    info!("scene {} has meaningful content", scene.number);
                    scene.state = SceneState::Classified;
                    kept.push(scene);
                }
                Ok(v) => {
                    info!("scene {} rejected (verdict {:?})", scene.number, v.trim());
                    scene.destroy()?;
                }
                Err(err) => {
                    warn!(
                        "classification of scene {} failed: {}; treating as non-meaningful",
                        scene.number, err
                    );
                    failures += 1;
                    scene.destroy()?;
                }
            }
        }

        Ok(ClassifyOutcome { kept, failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curation::scene::scene_image_path;
    use crate::error::OracleError;
    use crate::oracle::{ScriptedOracle, AFFIRMATIVE};
    use std::fs;
    use std::path::Path;

    fn seed_scenes(folder: &Path, numbers: &[u32]) -> Vec<Scene> {
        numbers
            .iter()
            .map(|&n| {
                fs::write(scene_image_path(folder, n), b"png").unwrap();
                Scene::candidate(folder, n)
            })
            .collect()
    }

    #[test]
    fn test_rejected_scene_is_destroyed() {
        let dir = tempfile::tempdir().unwrap();
        let scenes = seed_scenes(dir.path(), &[1, 4, 8]);

        let oracle = ScriptedOracle::keep_all().classify_with(|n| {
            Ok(if n == 4 { "FALSE" } else { AFFIRMATIVE }.to_string())
        });
        let gate = ContentClassifierGate::new(&oracle, RetryPolicy::immediate(1));

        let outcome = gate.classify(scenes, "prompt").unwrap();
        let kept: Vec<u32> = outcome.kept.iter().map(|s| s.number).collect();
        assert_eq!(kept, vec![1, 8]);
        assert_eq!(outcome.failures, 0);
        assert!(!scene_image_path(dir.path(), 4).exists());
        assert!(scene_image_path(dir.path(), 1).exists());
    }

    #[test]
    fn test_oracle_error_removes_scene_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let scenes = seed_scenes(dir.path(), &[1, 2]);

        let oracle = ScriptedOracle::keep_all().classify_with(|n| {
            if n == 2 {
                Err(OracleError::Malformed("no verdict".into()))
            } else {
                Ok(AFFIRMATIVE.to_string())
            }
        });
        let gate = ContentClassifierGate::new(&oracle, RetryPolicy::immediate(2));

        let outcome = gate.classify(scenes, "prompt").unwrap();
        let kept: Vec<u32> = outcome.kept.iter().map(|s| s.number).collect();
        assert_eq!(kept, vec![1]);
        assert_eq!(outcome.failures, 1);
        assert!(!scene_image_path(dir.path(), 2).exists());
    }

    #[test]
    fn test_non_literal_affirmative_rejects() {
        let dir = tempfile::tempdir().unwrap();
        let scenes = seed_scenes(dir.path(), &[1]);

        let oracle = ScriptedOracle::keep_all()
            .classify_with(|_| Ok("TRUE, this slide has content".to_string()));
        let gate = ContentClassifierGate::new(&oracle, RetryPolicy::immediate(1));

        let outcome = gate.classify(scenes, "prompt").unwrap();
        assert!(outcome.kept.is_empty());
    }

    #[test]
    fn test_processes_ascending_order() {
        let dir = tempfile::tempdir().unwrap();
        // seeded out of order on purpose
        let scenes = seed_scenes(dir.path(), &[8, 1, 4]);

        let oracle = ScriptedOracle::keep_all();
        let gate = ContentClassifierGate::new(&oracle, RetryPolicy::immediate(1));

        let outcome = gate.classify(scenes, "prompt").unwrap();
        let kept: Vec<u32> = outcome.kept.iter().map(|s| s.number).collect();
        assert_eq!(kept, vec![1, 4, 8]);
        assert!(outcome.kept.iter().all(|s| s.state == SceneState::Classified));
    }
}
