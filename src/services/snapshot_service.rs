use serde::Serialize;
use serde_json::Value as JsonValue;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::info;

use crate::dto::hh_dto::{normalize, RawVacancy};
use crate::error::{Error, Result};
use crate::models::vacancy::Vacancy;

/// Per-employer raw listing files, `<dir>/<employer_id>.json`.
#[derive(Debug, Clone)]
pub struct SnapshotService {
    dir: PathBuf,
}

impl SnapshotService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, employer_id: u32) -> PathBuf {
        self.dir.join(format!("{}.json", employer_id))
    }

    /// Replaces the employer's snapshot with `records`.
    pub async fn write(&self, employer_id: u32, records: &[JsonValue]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(employer_id);
        tokio::fs::write(&path, to_pretty_json(records)?).await?;
        info!(employer_id, records = records.len(), path = %path.display(), "Snapshot written");
        Ok(path)
    }

    pub async fn read_raw(&self, employer_id: u32) -> Result<Vec<JsonValue>> {
        let bytes = self.read_bytes(employer_id).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Reads the snapshot back and normalizes every record, keeping order.
    pub async fn read(&self, employer_id: u32) -> Result<Vec<Vacancy>> {
        let bytes = self.read_bytes(employer_id).await?;
        let records: Vec<RawVacancy> = serde_json::from_slice(&bytes)?;
        Ok(records.into_iter().map(normalize).collect())
    }

    async fn read_bytes(&self, employer_id: u32) -> Result<Vec<u8>> {
        let path = self.path_for(employer_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(format!(
                "no snapshot for employer {} at {}",
                employer_id,
                path.display()
            ))),
            Err(e) => Err(e.into()),
        }
    }
}

// serde_json's pretty printer defaults to two spaces.
fn to_pretty_json(records: &[JsonValue]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    Ok(buf)
}
