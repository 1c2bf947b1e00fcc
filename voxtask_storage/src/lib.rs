#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! On-disk persistence of finished task records.
//!
//! One pretty-printed JSON file per record, named `task_<uuid>.json`.
//! Listing returns records newest first.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use voxtask_core::ExtractionResult;

/// A fully processed task: the transcription, the extraction, and the
/// originating audio filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub audio_filename: String,
    pub transcription: String,
    pub task: ExtractionResult,
    pub status: String,
}

impl TaskRecord {
    /// Record a freshly processed extraction.
    #[must_use]
    pub fn new(audio_filename: String, transcription: String, task: ExtractionResult) -> Self {
        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            audio_filename,
            transcription,
            task,
            status: "processed".to_string(),
        }
    }
}

/// File-backed task record store.
pub struct TaskStore {
    dir: PathBuf,
}

impl TaskStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("task_{id}.json"))
    }

    /// Persist a record; returns the path it was written to.
    pub fn save(&self, record: &TaskRecord) -> anyhow::Result<PathBuf> {
        let path = self.record_path(record.id);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)?;
        info!(id = %record.id, path = %path.display(), "task record saved");
        Ok(path)
    }

    /// Load a single record by id, or `None` when it does not exist.
    pub fn get(&self, id: Uuid) -> anyhow::Result<Option<TaskRecord>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Load every record, newest first. Unreadable files are skipped with
    /// a warning rather than failing the listing.
    pub fn list(&self) -> anyhow::Result<Vec<TaskRecord>> {
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Self::read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), %e, "skipping unreadable task record"),
            }
        }

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Delete a record; returns whether it existed.
    pub fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        info!(id = %id, "task record deleted");
        Ok(true)
    }

    fn read_record(path: &Path) -> anyhow::Result<TaskRecord> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn temp_store() -> (TaskStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("voxtask_store_{}", Uuid::now_v7()));
        let store = TaskStore::new(&dir).expect("temp store should open");
        (store, dir)
    }

    fn record(title: &str) -> TaskRecord {
        let task = ExtractionResult {
            title: Some(title.to_string()),
            assignee: Some("Bob".to_string()),
            success: true,
            ..ExtractionResult::default()
        };
        TaskRecord::new("cli".to_string(), format!("task {title} user Bob"), task)
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn save_then_get_round_trips() {
        let (store, dir) = temp_store();
        let rec = record("fix door");

        let path = store.save(&rec).expect("save should succeed");
        assert!(path.exists());

        let loaded = store
            .get(rec.id)
            .expect("get should succeed")
            .expect("record should exist");
        assert_eq!(loaded.id, rec.id);
        assert_eq!(loaded.task.title.as_deref(), Some("fix door"));
        assert_eq!(loaded.status, "processed");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn list_returns_newest_first() {
        let (store, dir) = temp_store();

        let mut older = record("first");
        older.created_at = Utc::now() - chrono::Duration::hours(1);
        let newer = record("second");

        store.save(&older).expect("save should succeed");
        store.save(&newer).expect("save should succeed");

        let listed = store.list().expect("list should succeed");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].task.title.as_deref(), Some("second"));
        assert_eq!(listed[1].task.title.as_deref(), Some("first"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn delete_reports_existence() {
        let (store, dir) = temp_store();
        let rec = record("gone soon");
        store.save(&rec).expect("save should succeed");

        assert!(store.delete(rec.id).expect("delete should succeed"));
        assert!(!store.delete(rec.id).expect("second delete should succeed"));
        assert!(store.get(rec.id).expect("get should succeed").is_none());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn missing_record_is_none() {
        let (store, dir) = temp_store();
        assert!(store.get(Uuid::now_v7()).expect("get should succeed").is_none());
        let _ = fs::remove_dir_all(dir);
    }
}
