//! Flat-file task and decision store.
//!
//! User-added tasks and decisions persist in a single pretty-printed JSON
//! document of shape `{ "tasks": [...], "decisions": [...], "lastUpdated" }`.
//! Every mutation is a read-modify-write of the whole file. Writes go
//! through a temp file + rename so a crash never leaves a torn document,
//! but there is no locking: concurrent writers race and the last one wins.
//! That is an accepted limitation, not something this module coordinates.
//!
//! Reads are fault-tolerant (a missing or corrupt file degrades to the
//! empty shape); creation is the one place strict validation applies, since
//! fabricating a missing title or owner would corrupt the data model.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::fields::{Priority, Status};
use crate::task::{Decision, DecisionOption, Task};

/// Store ids start above this floor so they never collide with the plan
/// parser's 1-based seed ids in merged listings.
const ID_FLOOR: u64 = 1000;

/// Errors surfaced by store mutations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("failed to persist store: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The on-disk document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreData {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl Default for StoreData {
    fn default() -> Self {
        StoreData {
            tasks: Vec::new(),
            decisions: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

/// Fields accepted when creating a task. `title`, `owner` and `due` are
/// required; the rest default.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub owner: String,
    pub due: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Fields accepted when creating a decision.
#[derive(Debug, Clone, Default)]
pub struct NewDecision {
    pub title: String,
    pub assigned_to: String,
    pub due: Option<NaiveDate>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub impact: Option<String>,
    pub options: Vec<DecisionOption>,
}

/// Partial update for a task; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub owner: Option<String>,
    pub due: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub category: Option<String>,
    pub progress: Option<u8>,
    pub notes: Option<String>,
}

/// Partial update for a decision.
#[derive(Debug, Clone, Default)]
pub struct DecisionPatch {
    pub title: Option<String>,
    pub assigned_to: Option<String>,
    pub due: Option<NaiveDate>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub impact: Option<String>,
}

/// Handle on the backing JSON file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file with the empty shape if absent. Idempotent.
    pub fn initialize(&self) -> Result<(), StoreError> {
        if !self.path.exists() {
            self.write(&mut StoreData::default())?;
        }
        Ok(())
    }

    /// Read the document, degrading to the empty shape on any I/O or parse
    /// error. Callers must not assume a prior write succeeded silently.
    pub fn read(&self) -> StoreData {
        if !self.path.exists() {
            return StoreData::default();
        }
        let mut buf = String::new();
        match File::open(&self.path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(data) => data,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "store unparseable, starting from empty shape");
                    StoreData::default()
                }
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "store unreadable, starting from empty shape");
                StoreData::default()
            }
        }
    }

    /// Stamp `lastUpdated` and overwrite the file via temp + rename.
    pub fn write(&self, data: &mut StoreData) -> Result<(), StoreError> {
        data.last_updated = Utc::now();
        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        f.write_all(json.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }

    /// Validate, append and persist a new task, returning the stored record.
    pub fn add_task(&self, input: NewTask) -> Result<Task, StoreError> {
        if input.title.trim().is_empty() {
            return Err(StoreError::MissingField("title"));
        }
        if input.owner.trim().is_empty() {
            return Err(StoreError::MissingField("owner"));
        }
        let Some(due) = input.due else {
            return Err(StoreError::MissingField("dueDate"));
        };

        let mut data = self.read();
        let now = Utc::now();
        let task = Task {
            id: next_id(data.tasks.iter().map(|t| t.id)),
            title: input.title,
            owner: input.owner,
            due_date: due,
            priority: input.priority.unwrap_or(Priority::Medium),
            status: input.status.unwrap_or(Status::NotStarted),
            category: input.category.unwrap_or_else(|| "general".to_string()),
            progress: 0,
            notes: input.notes.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        data.tasks.push(task.clone());
        self.write(&mut data)?;
        Ok(task)
    }

    /// Merge a patch over the task with the given id, refresh `updatedAt`
    /// and persist. `Ok(None)` when no task has that id.
    pub fn update_task(&self, id: u64, patch: TaskPatch) -> Result<Option<Task>, StoreError> {
        let mut data = self.read();
        let Some(task) = data.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if let Some(s) = patch.title {
            task.title = s;
        }
        if let Some(s) = patch.owner {
            task.owner = s;
        }
        if let Some(d) = patch.due {
            task.due_date = d;
        }
        if let Some(p) = patch.priority {
            task.priority = p;
        }
        if let Some(s) = patch.status {
            task.status = s;
        }
        if let Some(c) = patch.category {
            task.category = c;
        }
        if let Some(p) = patch.progress {
            task.progress = p.min(100);
        }
        if let Some(n) = patch.notes {
            task.notes = n;
        }
        task.updated_at = Utc::now();
        let updated = task.clone();
        self.write(&mut data)?;
        Ok(Some(updated))
    }

    /// Remove a task by id. Returns whether anything was deleted.
    pub fn delete_task(&self, id: u64) -> Result<bool, StoreError> {
        let mut data = self.read();
        let before = data.tasks.len();
        data.tasks.retain(|t| t.id != id);
        if data.tasks.len() == before {
            return Ok(false);
        }
        self.write(&mut data)?;
        Ok(true)
    }

    /// Validate, append and persist a new decision.
    pub fn add_decision(&self, input: NewDecision) -> Result<Decision, StoreError> {
        if input.title.trim().is_empty() {
            return Err(StoreError::MissingField("title"));
        }
        if input.assigned_to.trim().is_empty() {
            return Err(StoreError::MissingField("assignedTo"));
        }
        let Some(due) = input.due else {
            return Err(StoreError::MissingField("dueDate"));
        };

        let mut data = self.read();
        let now = Utc::now();
        let decision = Decision {
            id: next_id(data.decisions.iter().map(|d| d.id)),
            title: input.title,
            description: input.description.unwrap_or_default(),
            assigned_to: input.assigned_to,
            due_date: due,
            priority: input.priority.unwrap_or(Priority::Medium),
            status: Status::AwaitingDecision,
            options: input.options,
            impact: input.impact.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        data.decisions.push(decision.clone());
        self.write(&mut data)?;
        Ok(decision)
    }

    /// Merge a patch over the decision with the given id and persist.
    pub fn update_decision(
        &self,
        id: u64,
        patch: DecisionPatch,
    ) -> Result<Option<Decision>, StoreError> {
        let mut data = self.read();
        let Some(decision) = data.decisions.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if let Some(s) = patch.title {
            decision.title = s;
        }
        if let Some(s) = patch.assigned_to {
            decision.assigned_to = s;
        }
        if let Some(d) = patch.due {
            decision.due_date = d;
        }
        if let Some(s) = patch.description {
            decision.description = s;
        }
        if let Some(p) = patch.priority {
            decision.priority = p;
        }
        if let Some(s) = patch.status {
            decision.status = s;
        }
        if let Some(s) = patch.impact {
            decision.impact = s;
        }
        decision.updated_at = Utc::now();
        let updated = decision.clone();
        self.write(&mut data)?;
        Ok(Some(updated))
    }

    /// Remove a decision by id. Returns whether anything was deleted.
    pub fn delete_decision(&self, id: u64) -> Result<bool, StoreError> {
        let mut data = self.read();
        let before = data.decisions.len();
        data.decisions.retain(|d| d.id != id);
        if data.decisions.len() == before {
            return Ok(false);
        }
        self.write(&mut data)?;
        Ok(true)
    }
}

/// Next id for a collection: one past the highest existing id, never below
/// the floor that separates store ids from plan seed ids.
fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().unwrap_or(0).max(ID_FLOOR) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.into(),
            owner: "Vishal".into(),
            due: Some(d(2025, 10, 30)),
            ..NewTask::default()
        }
    }

    #[test]
    fn initialize_is_idempotent_and_creates_empty_shape() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("buildout.json"));
        store.initialize().unwrap();
        store.initialize().unwrap();
        let data = store.read();
        assert!(data.tasks.is_empty());
        assert!(data.decisions.is_empty());
    }

    #[test]
    fn read_degrades_to_empty_shape_on_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("buildout.json");
        fs::write(&path, "{ not json").unwrap();
        let data = Store::new(&path).read();
        assert!(data.tasks.is_empty());
        assert!(data.decisions.is_empty());
    }

    #[test]
    fn write_then_read_round_trips_except_last_updated() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("buildout.json"));
        let added = store.add_task(new_task("Install sink")).unwrap();
        let data = store.read();
        assert_eq!(data.tasks, vec![added]);
        assert!(data.last_updated <= Utc::now());
    }

    #[test]
    fn add_task_applies_defaults_and_floor_ids() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("buildout.json"));
        let a = store.add_task(new_task("Install sink")).unwrap();
        let b = store.add_task(new_task("Hang doors")).unwrap();
        assert_eq!(a.id, 1001);
        assert_eq!(b.id, 1002);
        assert_eq!(a.priority, Priority::Medium);
        assert_eq!(a.status, Status::NotStarted);
        assert_eq!(a.category, "general");
        assert_eq!(a.progress, 0);
        assert_eq!(a.notes, "");
    }

    #[test]
    fn add_task_rejects_missing_required_fields() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("buildout.json"));
        let err = store
            .add_task(NewTask {
                owner: "Vishal".into(),
                due: Some(d(2025, 10, 30)),
                ..NewTask::default()
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingField("title")));

        let err = store
            .add_task(NewTask {
                title: "Install sink".into(),
                due: Some(d(2025, 10, 30)),
                ..NewTask::default()
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingField("owner")));

        let err = store
            .add_task(NewTask {
                title: "Install sink".into(),
                owner: "Vishal".into(),
                ..NewTask::default()
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingField("dueDate")));
        assert!(store.read().tasks.is_empty());
    }

    #[test]
    fn update_task_merges_patch_and_refreshes_updated_at() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("buildout.json"));
        let added = store.add_task(new_task("Install sink")).unwrap();
        let updated = store
            .update_task(
                added.id,
                TaskPatch {
                    status: Some(Status::Completed),
                    progress: Some(100),
                    ..TaskPatch::default()
                },
            )
            .unwrap()
            .expect("task exists");
        assert_eq!(updated.status, Status::Completed);
        assert_eq!(updated.progress, 100);
        assert_eq!(updated.title, "Install sink");
        assert!(updated.updated_at > updated.created_at);
    }

    #[test]
    fn update_unknown_id_returns_none() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("buildout.json"));
        assert!(store.update_task(42, TaskPatch::default()).unwrap().is_none());
    }

    #[test]
    fn delete_task_reports_whether_anything_was_removed() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("buildout.json"));
        let added = store.add_task(new_task("Install sink")).unwrap();
        assert!(store.delete_task(added.id).unwrap());
        assert!(!store.delete_task(added.id).unwrap());
        assert!(store.read().tasks.is_empty());
    }

    #[test]
    fn decision_lifecycle_mirrors_tasks() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("buildout.json"));
        let added = store
            .add_decision(NewDecision {
                title: "Pick bar counter stone".into(),
                assigned_to: "Ayesha".into(),
                due: Some(d(2025, 11, 5)),
                impact: Some("Blocks bar fit-out".into()),
                ..NewDecision::default()
            })
            .unwrap();
        assert_eq!(added.id, 1001);
        assert_eq!(added.status, Status::AwaitingDecision);

        let updated = store
            .update_decision(
                added.id,
                DecisionPatch {
                    status: Some(Status::Completed),
                    ..DecisionPatch::default()
                },
            )
            .unwrap()
            .expect("decision exists");
        assert_eq!(updated.status, Status::Completed);
        assert!(updated.updated_at > updated.created_at);

        assert!(store.delete_decision(added.id).unwrap());
        assert!(!store.delete_decision(added.id).unwrap());
    }

    #[test]
    fn missing_decision_fields_are_rejected() {
        let dir = tempdir().unwrap();
        let store = Store::new(dir.path().join("buildout.json"));
        let err = store
            .add_decision(NewDecision {
                title: "Pick stone".into(),
                due: Some(d(2025, 11, 5)),
                ..NewDecision::default()
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingField("assignedTo")));
    }

    #[test]
    fn store_file_is_pretty_printed_with_expected_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("buildout.json");
        let store = Store::new(&path);
        store.add_task(new_task("Install sink")).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"tasks\""));
        assert!(raw.contains("\"lastUpdated\""));
        assert!(raw.contains("\"decisions\""));
    }
}
