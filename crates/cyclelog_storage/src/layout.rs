//! On-disk naming conventions.

use cyclelog_core::{DayFile, MachineId};
use cyclelog_error::{CyclelogResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};

const MACHINE_DIR_PREFIX: &str = "machine_";

/// Paths under a data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/machines.json`
    pub fn machines_file(&self) -> PathBuf {
        self.root.join("machines.json")
    }

    /// `<root>/operators.json`
    pub fn operators_file(&self) -> PathBuf {
        self.root.join("operators.json")
    }

    /// `<root>/supervisors.json`
    pub fn supervisors_file(&self) -> PathBuf {
        self.root.join("supervisors.json")
    }

    /// `<root>/machine_sessions.json`
    pub fn sessions_file(&self) -> PathBuf {
        self.root.join("machine_sessions.json")
    }

    /// `<root>/machine_<id>`
    pub fn machine_dir(&self, machine: MachineId) -> PathBuf {
        self.root.join(format!("{}{}", MACHINE_DIR_PREFIX, machine))
    }

    /// `<root>/machine_<id>/<YYYY-MM-DD>.json`
    pub fn day_file(&self, machine: MachineId, day: DayFile) -> PathBuf {
        self.machine_dir(machine).join(day.file_name())
    }

    /// Parse a `machine_<id>` directory name.
    pub fn parse_machine_dir(name: &str) -> Option<MachineId> {
        name.strip_prefix(MACHINE_DIR_PREFIX)?.parse().ok()
    }

    /// Every `machine_<id>` directory under the root, sorted by id.
    ///
    /// A missing root yields an empty list.
    pub async fn machine_dirs(&self) -> CyclelogResult<Vec<(MachineId, PathBuf)>> {
        let mut found = Vec::new();
        for (name, path, is_dir) in list_dir(&self.root).await? {
            if !is_dir {
                continue;
            }
            if let Some(id) = Self::parse_machine_dir(&name) {
                found.push((id, path));
            }
        }
        found.sort_by_key(|(id, _)| *id);
        Ok(found)
    }

    /// Every `*.json` file in `dir`, sorted by name.
    pub async fn json_files(dir: &Path) -> CyclelogResult<Vec<(String, PathBuf)>> {
        let mut files: Vec<(String, PathBuf)> = list_dir(dir)
            .await?
            .into_iter()
            .filter(|(name, _, is_dir)| !is_dir && name.ends_with(".json"))
            .map(|(name, path, _)| (name, path))
            .collect();
        files.sort();
        Ok(files)
    }
}

async fn list_dir(dir: &Path) -> CyclelogResult<Vec<(String, PathBuf, bool)>> {
    let read_err = |e: std::io::Error| {
        StorageError::new(StorageErrorKind::DirectoryRead(format!("{}: {}", dir.display(), e)))
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(read_err(e).into()),
    };

    let mut out = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let is_dir = entry.file_type().await.map_err(read_err)?.is_dir();
        out.push((entry.file_name().to_string_lossy().into_owned(), entry.path(), is_dir));
    }
    Ok(out)
}
