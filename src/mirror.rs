//! Best Artifact Mirror - keeps a stable `best.ckpt` next to the host's best checkpoint

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::callback::Callback;
use crate::error::{Error, Result};
use crate::host::TrainerState;

/// Stable file name the best checkpoint is mirrored to.
pub const BEST_CHECKPOINT_NAME: &str = "best.ckpt";

/// Record of one mirror copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirroredArtifact {
    source: PathBuf,
    target: PathBuf,
    size_bytes: u64,
    copied_at: DateTime<Utc>,
}

impl MirroredArtifact {
    /// Checkpoint the host reported as best.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The `best.ckpt` sibling that was written.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Bytes copied.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// When the copy finished.
    #[must_use]
    pub const fn copied_at(&self) -> DateTime<Utc> {
        self.copied_at
    }
}

/// Path of the `best.ckpt` sibling of `best_path`.
#[must_use]
pub fn mirror_target(best_path: &Path) -> PathBuf {
    best_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(BEST_CHECKPOINT_NAME)
}

/// Copy `best_path` over its `best.ckpt` sibling.
///
/// Returns `None` for an empty path, or when `best_path` already is the
/// stable file.
///
/// # Errors
///
/// Returns [`Error::Copy`] if the source is missing or the target cannot be
/// written. The source is never modified.
pub fn mirror_best(best_path: &Path) -> Result<Option<MirroredArtifact>> {
    if best_path.as_os_str().is_empty() {
        return Ok(None);
    }
    let target = mirror_target(best_path);
    if best_path == target {
        return Ok(None);
    }

    let size_bytes = std::fs::copy(best_path, &target).map_err(|source| Error::Copy {
        from: best_path.to_path_buf(),
        to: target.clone(),
        source,
    })?;
    tracing::info!(
        "Saved best checkpoint {} -> {} ({size_bytes} bytes)",
        best_path.display(),
        target.display()
    );

    Ok(Some(MirroredArtifact {
        source: best_path.to_path_buf(),
        target,
        size_bytes,
        copied_at: Utc::now(),
    }))
}

/// Wraps the host's checkpoint callback and mirrors its best checkpoint.
///
/// The inner callback always runs first, so the best path read afterwards
/// reflects any checkpoint it just saved.
#[derive(Debug, Clone)]
pub struct BestArtifactMirror<C> {
    inner: C,
    name: String,
    last: Option<MirroredArtifact>,
}

impl<C: Callback> BestArtifactMirror<C> {
    /// Wrap the host's checkpoint callback.
    ///
    /// The mirror reports itself as `BestArtifactMirror(<inner name>)`.
    #[must_use]
    pub fn new(inner: C) -> Self {
        let name = format!("BestArtifactMirror({})", inner.name());
        Self {
            inner,
            name,
            last: None,
        }
    }

    /// Borrow the wrapped callback.
    #[must_use]
    pub const fn inner(&self) -> &C {
        &self.inner
    }

    /// The most recent copy made by this mirror.
    #[must_use]
    pub const fn last_mirrored(&self) -> Option<&MirroredArtifact> {
        self.last.as_ref()
    }

    /// Mirror the host's current best checkpoint, on the coordinator only.
    ///
    /// # Errors
    ///
    /// Propagates copy failures from [`mirror_best`].
    pub fn sync(&mut self, trainer: &dyn TrainerState) -> Result<Option<&MirroredArtifact>> {
        if !trainer.is_coordinator() {
            return Ok(None);
        }
        let Some(best_path) = trainer.best_model_path() else {
            return Ok(None);
        };
        match mirror_best(best_path)? {
            Some(artifact) => Ok(Some(&*self.last.insert(artifact))),
            None => Ok(None),
        }
    }

    /// Unwrap into the host's checkpoint callback.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Callback> Callback for BestArtifactMirror<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_fit_start(&mut self, trainer: &dyn TrainerState) -> Result<()> {
        self.inner.on_fit_start(trainer)
    }

    fn on_train_epoch_end(&mut self, trainer: &dyn TrainerState) -> Result<()> {
        self.inner.on_train_epoch_end(trainer)
    }

    fn on_validation_epoch_end(&mut self, trainer: &dyn TrainerState) -> Result<()> {
        self.inner.on_validation_epoch_end(trainer)?;
        self.sync(trainer).map(|_| ())
    }

    fn on_test_end(&mut self, trainer: &dyn TrainerState) -> Result<()> {
        self.inner.on_test_end(trainer)?;
        self.sync(trainer).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mirror_target_is_sibling() {
        assert_eq!(
            mirror_target(Path::new("/x/y/epoch=5.ckpt")),
            PathBuf::from("/x/y/best.ckpt")
        );
        assert_eq!(mirror_target(Path::new("epoch=5.ckpt")), PathBuf::from("best.ckpt"));
    }

    #[test]
    fn test_empty_path_is_noop() {
        assert!(mirror_best(Path::new("")).unwrap().is_none());
    }

    #[test]
    fn test_best_ckpt_is_not_copied_onto_itself() {
        let temp = TempDir::new().unwrap();
        let best = temp.path().join(BEST_CHECKPOINT_NAME);
        std::fs::write(&best, b"weights").unwrap();

        assert!(mirror_best(&best).unwrap().is_none());
        assert_eq!(std::fs::read(&best).unwrap(), b"weights");
    }

    #[test]
    fn test_missing_source_is_copy_error() {
        let temp = TempDir::new().unwrap();
        let err = mirror_best(&temp.path().join("epoch=1.ckpt")).unwrap_err();
        assert!(matches!(err, Error::Copy { .. }));
    }

    #[test]
    fn test_copy_reports_size() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("epoch=2.ckpt");
        std::fs::write(&src, b"0123456789").unwrap();

        let artifact = mirror_best(&src).unwrap().unwrap();
        assert_eq!(artifact.size_bytes(), 10);
        assert_eq!(artifact.source(), src.as_path());
        assert_eq!(artifact.target(), temp.path().join(BEST_CHECKPOINT_NAME));
    }
}
