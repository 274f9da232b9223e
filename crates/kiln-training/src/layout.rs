use crate::error::TrainingResult;
use std::path::{Path, PathBuf};

/// Filesystem layout for per-job training artifacts.
///
/// Default layout is `.kiln/artifacts/<job_id>/...` under the service's
/// working directory.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn for_workspace_root(workspace_root: &Path) -> Self {
        Self::new(workspace_root.join(".kiln").join("artifacts"))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn job_dir(&self, job_id: &str) -> PathBuf {
        self.root.join(job_id)
    }

    #[must_use]
    pub fn checkpoint_path(&self, job_id: &str) -> PathBuf {
        self.job_dir(job_id).join("checkpoint.json")
    }

    #[must_use]
    pub fn config_path(&self, job_id: &str) -> PathBuf {
        self.job_dir(job_id).join("config.json")
    }

    #[must_use]
    pub fn model_card_path(&self, job_id: &str) -> PathBuf {
        self.job_dir(job_id).join("README.md")
    }

    pub fn ensure_job_dir(&self, job_id: &str) -> TrainingResult<PathBuf> {
        let dir = self.job_dir(job_id);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths_are_rooted_per_job() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::for_workspace_root(tmp.path());

        let dir = layout.ensure_job_dir("m1").unwrap();
        assert!(dir.ends_with(".kiln/artifacts/m1"));
        assert!(dir.is_dir());
        assert_eq!(layout.checkpoint_path("m1"), dir.join("checkpoint.json"));
        assert_eq!(layout.model_card_path("m1"), dir.join("README.md"));
    }
}
