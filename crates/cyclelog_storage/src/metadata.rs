//! Reference tables: machines, operators, supervisors.

use crate::DataLayout;
use crate::json_file::{JsonRead, read_json_vec, write_json_atomic};
use cyclelog_cache::MetadataSource;
use cyclelog_core::{Machine, MetadataSnapshot, Operator, Supervisor};
use cyclelog_error::{
    CyclelogResult, StorageError, StorageErrorKind, ValidationError, ValidationErrorKind,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A row of one of the reference tables.
pub trait MetadataRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table name used in errors and logs.
    const TABLE: &'static str;

    /// File holding the table.
    fn path(layout: &DataLayout) -> PathBuf;

    /// Primary key.
    fn id(&self) -> i64;
}

impl MetadataRecord for Machine {
    const TABLE: &'static str = "machines";

    fn path(layout: &DataLayout) -> PathBuf {
        layout.machines_file()
    }

    fn id(&self) -> i64 {
        self.machine_id
    }
}

impl MetadataRecord for Operator {
    const TABLE: &'static str = "operators";

    fn path(layout: &DataLayout) -> PathBuf {
        layout.operators_file()
    }

    fn id(&self) -> i64 {
        self.operator_id
    }
}

impl MetadataRecord for Supervisor {
    const TABLE: &'static str = "supervisors";

    fn path(layout: &DataLayout) -> PathBuf {
        layout.supervisors_file()
    }

    fn id(&self) -> i64 {
        self.supervisor_id
    }
}

/// CRUD over the reference table files.
///
/// A missing table file reads as empty. A table file that exists but does not
/// parse is an error, so that a broken edit never gets silently overwritten
/// and the metadata cache keeps its last good snapshot.
#[derive(Debug)]
pub struct MetadataStore {
    layout: DataLayout,
    write_lock: Mutex<()>,
}

impl MetadataStore {
    /// Store over the tables under `layout`.
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            write_lock: Mutex::new(()),
        }
    }

    /// Paths used by this store.
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Every row of table `R`.
    #[tracing::instrument(skip(self), fields(table = R::TABLE))]
    pub async fn list<R: MetadataRecord>(&self) -> CyclelogResult<Vec<R>> {
        read_table(&R::path(&self.layout)).await
    }

    /// Insert a row, rejecting a duplicate id.
    #[tracing::instrument(skip(self, record), fields(table = R::TABLE, id = record.id()))]
    pub async fn add<R: MetadataRecord>(&self, record: R) -> CyclelogResult<()> {
        let _guard = self.write_lock.lock().await;
        let path = R::path(&self.layout);
        let mut rows: Vec<R> = read_table(&path).await?;

        if rows.iter().any(|r| r.id() == record.id()) {
            return Err(ValidationError::new(ValidationErrorKind::DuplicateId {
                table: R::TABLE.to_string(),
                id: record.id(),
            })
            .into());
        }

        rows.push(record);
        write_json_atomic(&path, &rows).await?;
        tracing::info!(rows = rows.len(), "Added metadata row");
        Ok(())
    }

    /// Modify the row with `id` in place and return the new value.
    #[tracing::instrument(skip(self, edit), fields(table = R::TABLE))]
    pub async fn update<R, F>(&self, id: i64, edit: F) -> CyclelogResult<R>
    where
        R: MetadataRecord,
        F: FnOnce(&mut R) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let path = R::path(&self.layout);
        let mut rows: Vec<R> = read_table(&path).await?;

        let row = rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| not_found::<R>(id))?;
        edit(row);
        let updated = row.clone();

        write_json_atomic(&path, &rows).await?;
        tracing::info!("Updated metadata row");
        Ok(updated)
    }

    /// Remove the row with `id` and return it.
    #[tracing::instrument(skip(self), fields(table = R::TABLE))]
    pub async fn delete<R: MetadataRecord>(&self, id: i64) -> CyclelogResult<R> {
        let _guard = self.write_lock.lock().await;
        let path = R::path(&self.layout);
        let mut rows: Vec<R> = read_table(&path).await?;

        let index = rows
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| not_found::<R>(id))?;
        let removed = rows.remove(index);

        write_json_atomic(&path, &rows).await?;
        tracing::info!(rows = rows.len(), "Deleted metadata row");
        Ok(removed)
    }

    /// Read all three tables.
    #[tracing::instrument(skip(self))]
    pub async fn snapshot(&self) -> CyclelogResult<MetadataSnapshot> {
        let (machines, operators, supervisors) = tokio::try_join!(
            self.list::<Machine>(),
            self.list::<Operator>(),
            self.list::<Supervisor>(),
        )?;
        Ok(MetadataSnapshot {
            machines,
            operators,
            supervisors,
        })
    }
}

#[async_trait::async_trait]
impl MetadataSource for MetadataStore {
    async fn load(&self) -> CyclelogResult<MetadataSnapshot> {
        self.snapshot().await
    }
}

async fn read_table<R: MetadataRecord>(path: &Path) -> CyclelogResult<Vec<R>> {
    match read_json_vec(path).await? {
        JsonRead::Loaded(rows) => Ok(rows),
        JsonRead::Missing => Ok(Vec::new()),
        JsonRead::Corrupt(reason) => Err(StorageError::new(StorageErrorKind::Parse(format!(
            "{}: {}",
            path.display(),
            reason
        )))
        .into()),
    }
}

#[track_caller]
fn not_found<R: MetadataRecord>(id: i64) -> ValidationError {
    ValidationError::new(ValidationErrorKind::NotFound {
        table: R::TABLE.to_string(),
        id,
    })
}
