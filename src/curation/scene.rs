use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::CurationError;

/// Lifecycle of a detected scene. `Removed` is terminal: the image file is
/// gone and the number is never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Candidate,
    Classified,
    Kept,
    Removed,
}

/// One representative frame standing in for a span of visually similar
/// video. Owns exactly one image file on disk.
#[derive(Debug, Clone)]
pub struct Scene {
    pub number: u32,
    pub image_path: PathBuf,
    pub state: SceneState,
}

impl Scene {
    pub fn candidate(folder: &Path, number: u32) -> Self {
        Self {
            number,
            image_path: scene_image_path(folder, number),
            state: SceneState::Candidate,
        }
    }

    /// Deletes the backing image. Irreversible within a run.
    pub fn destroy(&mut self) -> Result<(), CurationError> {
        fs::remove_file(&self.image_path)?;
        self.state = SceneState::Removed;
        debug!("destroyed scene {} ({})", self.number, self.image_path.display());
        Ok(())
    }
}

/// Deterministic per-number naming so that numeric sort recovers emission
/// order even after removals leave gaps.
pub fn scene_image_path(folder: &Path, number: u32) -> PathBuf {
    folder.join(format!("scene_{}.png", number))
}

pub fn parse_scene_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("scene_")?
        .strip_suffix(".png")?
        .parse()
        .ok()
}

/// Scenes currently on disk, ascending by scene number. The number itself
/// is the sort key; lexicographic filename order would put scene_10 before
/// scene_2.
pub fn scan_scenes(folder: &Path) -> Result<Vec<Scene>, CurationError> {
    let mut scenes = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(number) = parse_scene_number(name) {
            scenes.push(Scene {
                number,
                image_path: entry.path(),
                state: SceneState::Candidate,
            });
        }
    }
    scenes.sort_by_key(|s| s.number);
    Ok(scenes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scene_number() {
        assert_eq!(parse_scene_number("scene_1.png"), Some(1));
        assert_eq!(parse_scene_number("scene_42.png"), Some(42));
        assert_eq!(parse_scene_number("scene_.png"), None);
        assert_eq!(parse_scene_number("scene_1.jpg"), None);
        assert_eq!(parse_scene_number("transcript.txt"), None);
        assert_eq!(parse_scene_number("scene_1_summary.txt"), None);
    }

    #[test]
    fn test_scan_orders_numerically_with_gaps() {
        let dir = tempfile::tempdir().unwrap();
        for n in [10u32, 2, 1, 30] {
            fs::write(scene_image_path(dir.path(), n), b"png").unwrap();
        }
        fs::write(dir.path().join("transcript.txt"), b"x").unwrap();

        let scenes = scan_scenes(dir.path()).unwrap();
        let numbers: Vec<u32> = scenes.iter().map(|s| s.number).collect();
        assert_eq!(numbers, vec![1, 2, 10, 30]);
    }

    #[test]
    fn test_destroy_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = scene_image_path(dir.path(), 3);
        fs::write(&path, b"png").unwrap();

        let mut scene = Scene::candidate(dir.path(), 3);
        scene.destroy().unwrap();

        assert_eq!(scene.state, SceneState::Removed);
        assert!(!path.exists());
        // irreversible: a second destroy has nothing to delete
        assert!(scene.destroy().is_err());
    }
}
