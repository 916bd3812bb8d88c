use std::time::Duration;

use log::{debug, info};

use crate::curation::frame::Frame;
use crate::curation::ssim::FrameSimilarity;

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Only every `frame_skip`-th frame is evaluated at all.
    pub frame_skip: u64,
    /// A new scene requires similarity below this value.
    pub change_threshold: f32,
    /// Debounce: minimum seconds between two emitted scenes. Both this and
    /// the similarity condition must hold on the same frame.
    pub min_scene_duration: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            frame_skip: 30,
            change_threshold: 0.8,
            min_scene_duration: 1.0,
        }
    }
}

/// Emitted when an evaluated frame starts a new scene. `score` is `None`
/// only for the first scene, which has no baseline to compare against.
#[derive(Debug, Clone)]
pub struct SceneEmit {
    pub number: u32,
    pub score: Option<f32>,
}

struct Baseline {
    luma: Vec<u8>,
    width: u32,
    height: u32,
    timestamp: Duration,
}

/// Streaming scene-change detector.
///
/// Similarity is always computed against the last *kept* baseline, not the
/// previously evaluated frame, so slow drift cannot accumulate into a missed
/// change. The first evaluated frame is always emitted unconditionally.
pub struct SceneChangeDetector {
    config: DetectorConfig,
    observed: u64,
    baseline: Option<Baseline>,
    next_number: u32,
}

impl SceneChangeDetector {
    pub fn new(config: DetectorConfig) -> Self {
        let config = DetectorConfig {
            frame_skip: config.frame_skip.max(1),
            ..config
        };
        Self {
            config,
            observed: 0,
            baseline: None,
            next_number: 1,
        }
    }

    /// Feed one frame. Returns the scene assignment if this frame starts a
    /// new scene; the caller is responsible for persisting the image.
    pub fn observe(&mut self, frame: &Frame, similarity: &dyn FrameSimilarity) -> Option<SceneEmit> {
        self.observed += 1;
        if self.observed % self.config.frame_skip != 0 {
            return None;
        }

        let luma = frame.luminance();

        let emit = match &self.baseline {
            None => {
                info!("first scene established at frame {}", frame.frame_number);
                Some(SceneEmit {
                    number: self.next_number,
                    score: None,
                })
            }
            Some(base) => {
                // source resolution is constant in practice; a mismatch
                // counts as a full change
                let score = if base.width == frame.width && base.height == frame.height {
                    similarity.score(&base.luma, &luma, frame.width, frame.height)
                } else {
                    0.0
                };
                let elapsed = frame.timestamp_secs() - base.timestamp.as_secs_f64();

                if score < self.config.change_threshold
                    && elapsed >= self.config.min_scene_duration
                {
                    info!(
                        "new scene {} at frame {} (score={:.2})",
                        self.next_number, frame.frame_number, score
                    );
                    Some(SceneEmit {
                        number: self.next_number,
                        score: Some(score),
                    })
                } else {
                    debug!(
                        "frame {} discarded (score={:.2}, elapsed={:.2}s)",
                        frame.frame_number, score, elapsed
                    );
                    None
                }
            }
        };

        if emit.is_some() {
            self.baseline = Some(Baseline {
                luma,
                width: frame.width,
                height: frame.height,
                timestamp: frame.timestamp,
            });
            self.next_number += 1;
        }

        emit
    }

    pub fn emitted_count(&self) -> u32 {
        self.next_number - 1
    }

    pub fn observed_count(&self) -> u64 {
        self.observed
    }

    pub fn reset(&mut self) {
        self.observed = 0;
        self.baseline = None;
        self.next_number = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curation::ssim::Ssim;

    fn frame(fill: u8, frame_number: u64, timestamp_ms: u64) -> Frame {
        let data = vec![fill; 32 * 32 * 4];
        Frame::new(32, 32, data, timestamp_ms, frame_number)
    }

    /// Scores 0.0 whenever the candidate plane's fill value is in the
    /// "changed" set, 1.0 otherwise. Keeps the scripted scenarios readable.
    struct FillSimilarity {
        changed_fills: Vec<u8>,
    }

    impl FrameSimilarity for FillSimilarity {
        fn score(&self, _a: &[u8], b: &[u8], _w: u32, _h: u32) -> f32 {
            if self.changed_fills.contains(&b[0]) {
                0.0
            } else {
                1.0
            }
        }
    }

    #[test]
    fn test_first_evaluated_frame_is_scene_one() {
        let mut det = SceneChangeDetector::new(DetectorConfig {
            frame_skip: 3,
            ..Default::default()
        });
        let sim = Ssim::new();

        assert!(det.observe(&frame(10, 1, 0), &sim).is_none());
        assert!(det.observe(&frame(10, 2, 33), &sim).is_none());
        let emit = det.observe(&frame(10, 3, 66), &sim).unwrap();
        assert_eq!(emit.number, 1);
        assert!(emit.score.is_none());
    }

    #[test]
    fn test_identical_frames_never_emit_twice() {
        let mut det = SceneChangeDetector::new(DetectorConfig {
            frame_skip: 1,
            change_threshold: 0.9,
            min_scene_duration: 0.0,
        });
        let sim = Ssim::new();

        assert!(det.observe(&frame(128, 1, 0), &sim).is_some());
        assert!(det.observe(&frame(128, 2, 33), &sim).is_none());
        assert_eq!(det.emitted_count(), 1);
    }

    #[test]
    fn test_debounce_blocks_rapid_emission() {
        let mut det = SceneChangeDetector::new(DetectorConfig {
            frame_skip: 1,
            change_threshold: 0.9,
            min_scene_duration: 2.0,
        });
        let sim = FillSimilarity {
            changed_fills: vec![10, 20, 30, 40, 50],
        };

        // dissimilar frames 0.5 s apart; only the baseline and the first
        // frame past the 2 s debounce may emit
        assert!(det.observe(&frame(10, 1, 0), &sim).is_some());
        assert!(det.observe(&frame(20, 2, 500), &sim).is_none());
        assert!(det.observe(&frame(30, 3, 1000), &sim).is_none());
        assert!(det.observe(&frame(40, 4, 1500), &sim).is_none());
        let emit = det.observe(&frame(50, 5, 2000), &sim).unwrap();
        assert_eq!(emit.number, 2);
        assert_eq!(det.emitted_count(), 2);
    }

    #[test]
    fn test_changed_frames_emit_in_order() {
        let mut det = SceneChangeDetector::new(DetectorConfig {
            frame_skip: 1,
            change_threshold: 0.9,
            min_scene_duration: 0.0,
        });
        // frames 4 and 8 differ from the running baseline
        let sim = FillSimilarity {
            changed_fills: vec![40, 80],
        };

        let mut emitted = Vec::new();
        for n in 1..=10u64 {
            let fill = (n * 10) as u8;
            if let Some(emit) = det.observe(&frame(fill, n, n * 1000), &sim) {
                emitted.push((emit.number, n));
            }
        }

        assert_eq!(emitted, vec![(1, 1), (2, 4), (3, 8)]);
    }

    #[test]
    fn test_scene_numbers_strictly_increase_without_gaps() {
        let mut det = SceneChangeDetector::new(DetectorConfig {
            frame_skip: 1,
            change_threshold: 0.9,
            min_scene_duration: 0.0,
        });
        let sim = FillSimilarity {
            changed_fills: (1..=20u8).map(|n| n * 10).collect(),
        };

        let mut numbers = Vec::new();
        for n in 1..=20u64 {
            if let Some(emit) = det.observe(&frame((n * 10) as u8, n, n * 1000), &sim) {
                numbers.push(emit.number);
            }
        }

        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        assert_eq!(numbers, expected);
    }

    #[test]
    fn test_short_source_yields_no_scenes() {
        let mut det = SceneChangeDetector::new(DetectorConfig {
            frame_skip: 30,
            ..Default::default()
        });
        let sim = Ssim::new();

        for n in 1..=5u64 {
            assert!(det.observe(&frame(128, n, n * 33), &sim).is_none());
        }
        assert_eq!(det.emitted_count(), 0);
    }
}
