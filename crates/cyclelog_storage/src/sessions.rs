//! The derived `machine_sessions.json` file.

use crate::json_file::{JsonRead, read_json_vec, write_json_atomic};
use cyclelog_core::OperatorSession;
use cyclelog_error::CyclelogResult;
use std::path::{Path, PathBuf};

/// Handle on the operator sessions file.
///
/// The file is owned by the session generator; everything else only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Handle on the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored sessions. Missing or corrupt reads as empty.
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn read(&self) -> CyclelogResult<Vec<OperatorSession>> {
        Ok(match read_json_vec(&self.path).await? {
            JsonRead::Loaded(sessions) => sessions,
            JsonRead::Missing => Vec::new(),
            JsonRead::Corrupt(reason) => {
                tracing::warn!(reason = %reason, "Sessions file unreadable, treating as empty");
                Vec::new()
            }
        })
    }

    /// Overwrite the file with `sessions`.
    #[tracing::instrument(skip(self, sessions), fields(path = %self.path.display(), count = sessions.len()))]
    pub async fn replace(&self, sessions: &[OperatorSession]) -> CyclelogResult<()> {
        write_json_atomic(&self.path, sessions).await?;
        tracing::info!("Wrote sessions file");
        Ok(())
    }
}
