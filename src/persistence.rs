//! Project files.
//!
//! A project is a name plus a snapshot of the session queue, written and
//! read whole as JSON:
//!
//! ```json
//! { "ProjectName": "thesis",
//!   "Queue": [ { "SessionName": "write", "NumberOfSessions": 2,
//!                "TimePerSession": 600, "Status": "PENDING",
//!                "CompletedSessions": 0 } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PersistenceError, Result, ValidationError};
use crate::queue::{ItemStatus, SessionItem};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum StoredStatus {
    Completed,
    InProgress,
    Pending,
}

impl From<ItemStatus> for StoredStatus {
    fn from(s: ItemStatus) -> Self {
        match s {
            ItemStatus::Completed => Self::Completed,
            ItemStatus::InProgress => Self::InProgress,
            ItemStatus::Pending => Self::Pending,
        }
    }
}

impl From<StoredStatus> for ItemStatus {
    fn from(s: StoredStatus) -> Self {
        match s {
            StoredStatus::Completed => Self::Completed,
            StoredStatus::InProgress => Self::InProgress,
            StoredStatus::Pending => Self::Pending,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct StoredItem {
    session_name: String,
    number_of_sessions: u32,
    time_per_session: u32,
    status: StoredStatus,
    completed_sessions: u32,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct ProjectFile {
    project_name: String,
    #[serde(default)]
    queue: Vec<StoredItem>,
}

/// In-memory form of a project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub items: Vec<SessionItem>,
}

/// Resolves project paths against an optional project directory and does
/// the file I/O.
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    project_dir: Option<PathBuf>,
}

impl ProjectStore {
    /// An empty directory string means "not configured".
    pub fn new(project_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    /// Picks the file for a `save`/`load` argument.
    ///
    /// Absolute paths are taken as is. Relative paths, and the default
    /// `<project>.json` used when no argument is given, need a project
    /// directory. A relative name without extension gets `.json`.
    pub fn resolve(&self, arg: Option<&str>, project_name: &str) -> Result<PathBuf> {
        let requested = match arg.map(str::trim).filter(|a| !a.is_empty()) {
            Some(a) => PathBuf::from(a),
            None => {
                let name = project_name.trim();
                if name.is_empty() {
                    return Err(ValidationError::MissingProjectName.into());
                }
                PathBuf::from(name)
            }
        };

        if requested.is_absolute() {
            return Ok(requested);
        }

        let mut path = match &self.project_dir {
            Some(dir) => dir.join(&requested),
            None => return Err(PersistenceError::PathResolution(requested).into()),
        };
        if path.extension().is_none() {
            path.set_extension("json");
        }
        Ok(path)
    }

    pub fn save(&self, path: &Path, project: &Project) -> Result<(), PersistenceError> {
        let file = ProjectFile {
            project_name: project.name.clone(),
            queue: project
                .items
                .iter()
                .map(|i| StoredItem {
                    session_name: i.name().into(),
                    number_of_sessions: i.total_repeats(),
                    time_per_session: i.secs_per_repeat(),
                    status: i.status().into(),
                    completed_sessions: i.completed_repeats(),
                })
                .collect(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&file).map_err(|source| PersistenceError::Format {
            path: path.into(),
            source,
        })?;
        fs::write(path, json).map_err(|e| PersistenceError::io(path, e))?;
        info!(path = %path.display(), items = file.queue.len(), "project saved");
        Ok(())
    }

    /// Reads a project. Entries that fail validation (blank name, zero
    /// repeats or duration) are skipped with a warning.
    pub fn load(&self, path: &Path) -> Result<Project, PersistenceError> {
        let raw = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
        let file: ProjectFile = serde_json::from_str(&raw).map_err(|source| PersistenceError::Format {
            path: path.into(),
            source,
        })?;

        let items = file
            .queue
            .into_iter()
            .filter_map(|s| {
                SessionItem::restore(
                    &s.session_name,
                    s.number_of_sessions,
                    s.time_per_session,
                    s.completed_sessions,
                    s.status.into(),
                )
                .inspect_err(|e| warn!(name = %s.session_name, error = %e, "skipping stored session"))
                .ok()
            })
            .collect::<Vec<_>>();

        info!(path = %path.display(), items = items.len(), "project loaded");
        Ok(Project {
            name: file.project_name,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    fn sample() -> Project {
        Project {
            name: "thesis".into(),
            items: vec![
                SessionItem::restore("write", 2, 600, 1, ItemStatus::InProgress).unwrap(),
                SessionItem::restore("read", 1, 300, 1, ItemStatus::Completed).unwrap(),
                SessionItem::new("edit", 3, 900).unwrap(),
            ],
        }
    }

    #[test]
    fn relative_path_without_dir_is_rejected() {
        let store = ProjectStore::new(None);
        let err = store.resolve(Some("relative.json"), "p").unwrap_err();
        assert!(matches!(err, Error::Persistence(PersistenceError::PathResolution(_))));
    }

    #[test]
    fn empty_dir_string_counts_as_unconfigured() {
        let store = ProjectStore::new(Some(PathBuf::new()));
        assert!(store.project_dir().is_none());
    }

    #[test]
    fn default_path_needs_a_project_name() {
        let store = ProjectStore::new(Some("/data".into()));
        let err = store.resolve(None, "  ").unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MissingProjectName)));
    }

    #[test]
    fn resolution_rules() {
        let dir = tempdir().unwrap();
        let store = ProjectStore::new(Some(dir.path().into()));

        assert_eq!(store.resolve(None, "thesis").unwrap(), dir.path().join("thesis.json"));
        assert_eq!(store.resolve(Some("notes.txt"), "x").unwrap(), dir.path().join("notes.txt"));
        assert_eq!(store.resolve(Some("sub/a"), "x").unwrap(), dir.path().join("sub/a.json"));

        let abs = dir.path().join("elsewhere");
        assert_eq!(store.resolve(Some(abs.to_str().unwrap()), "x").unwrap(), abs);
    }

    #[test]
    fn writes_the_documented_field_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.json");
        ProjectStore::default().save(&path, &sample()).unwrap();

        let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["ProjectName"], "thesis");
        assert_eq!(v["Queue"][0]["SessionName"], "write");
        assert_eq!(v["Queue"][0]["NumberOfSessions"], 2);
        assert_eq!(v["Queue"][0]["TimePerSession"], 600);
        assert_eq!(v["Queue"][0]["Status"], "IN_PROGRESS");
        assert_eq!(v["Queue"][0]["CompletedSessions"], 1);
        assert_eq!(v["Queue"][1]["Status"], "COMPLETED");
        assert_eq!(v["Queue"][2]["Status"], "PENDING");
    }

    #[test]
    fn save_then_load_keeps_every_field_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("p.json");
        let store = ProjectStore::default();
        store.save(&path, &sample()).unwrap();

        assert_eq!(store.load(&path).unwrap(), sample());
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = ProjectStore::default().load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(_)));
    }

    #[test]
    fn load_garbage_is_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = ProjectStore::default().load(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::Format { .. }));
    }

    #[test]
    fn load_skips_invalid_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.json");
        fs::write(
            &path,
            r#"{"ProjectName":"p","Queue":[
                {"SessionName":"","NumberOfSessions":1,"TimePerSession":60,"Status":"PENDING","CompletedSessions":0},
                {"SessionName":"ok","NumberOfSessions":1,"TimePerSession":60,"Status":"PENDING","CompletedSessions":0}
            ]}"#,
        )
        .unwrap();
        let project = ProjectStore::default().load(&path).unwrap();
        assert_eq!(project.items.len(), 1);
        assert_eq!(project.items[0].name(), "ok");
    }
}
