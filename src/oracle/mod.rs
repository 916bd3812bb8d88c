//! External model collaborators behind trait seams, so the pipeline can be
//! exercised with scripted fakes.

pub mod openai;

use std::cell::RefCell;
use std::path::Path;

use crate::curation::scene::parse_scene_number;
use crate::error::OracleError;

/// The single literal token treated as an affirmative verdict. Case
/// sensitive; every other response (and every error) is negative.
pub const AFFIRMATIVE: &str = "TRUE";

pub fn is_affirmative(verdict: &str) -> bool {
    verdict.trim() == AFFIRMATIVE
}

/// Vision-capable collaborator: one image plus a prompt, or an image pair
/// plus a prompt, answered with a verdict string.
pub trait VisionOracle {
    fn classify_image(&self, image: &Path, prompt: &str) -> Result<String, OracleError>;
    fn compare_images(
        &self,
        first: &Path,
        second: &Path,
        prompt: &str,
    ) -> Result<String, OracleError>;
}

/// Text-only collaborator used by notes synthesis.
pub trait TextOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

type ClassifyFn = dyn Fn(u32) -> Result<String, OracleError>;
type CompareFn = dyn Fn(u32, u32) -> Result<String, OracleError>;

/// Scripted oracle keyed by scene number, for tests. Records every
/// comparison so ordering and early-exit behavior can be asserted.
pub struct ScriptedOracle {
    classify: Box<ClassifyFn>,
    compare: Box<CompareFn>,
    pub comparisons: RefCell<Vec<(u32, u32)>>,
}

impl ScriptedOracle {
    /// Classifies everything meaningful, compares everything distinct.
    pub fn keep_all() -> Self {
        Self {
            classify: Box::new(|_| Ok(AFFIRMATIVE.to_string())),
            compare: Box::new(|_, _| Ok("FALSE".to_string())),
            comparisons: RefCell::new(Vec::new()),
        }
    }

    pub fn classify_with(mut self, f: impl Fn(u32) -> Result<String, OracleError> + 'static) -> Self {
        self.classify = Box::new(f);
        self
    }

    pub fn compare_with(
        mut self,
        f: impl Fn(u32, u32) -> Result<String, OracleError> + 'static,
    ) -> Self {
        self.compare = Box::new(f);
        self
    }

    fn scene_of(path: &Path) -> Result<u32, OracleError> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_scene_number)
            .ok_or_else(|| OracleError::Malformed(format!("not a scene image: {}", path.display())))
    }
}

impl VisionOracle for ScriptedOracle {
    fn classify_image(&self, image: &Path, _prompt: &str) -> Result<String, OracleError> {
        (self.classify)(Self::scene_of(image)?)
    }

    fn compare_images(
        &self,
        first: &Path,
        second: &Path,
        _prompt: &str,
    ) -> Result<String, OracleError> {
        let a = Self::scene_of(first)?;
        let b = Self::scene_of(second)?;
        self.comparisons.borrow_mut().push((a, b));
        (self.compare)(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_token_is_exact() {
        assert!(is_affirmative("TRUE"));
        assert!(is_affirmative("  TRUE\n"));
        assert!(!is_affirmative("true"));
        assert!(!is_affirmative("TRUE."));
        assert!(!is_affirmative("FALSE"));
        assert!(!is_affirmative(""));
    }
}
