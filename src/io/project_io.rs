use std::fs;
use std::path::{Path, PathBuf};

use crate::io::schedule_io::{self, LoadError};
use crate::io::storage::{FileSink, KeyValueFile, load_preferences};
use crate::model::config::PlannerConfig;
use crate::model::project::{CONFIG_FILE, Project};
use crate::ops::store::ClassificationStore;

/// Error type for project I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not a planner project: no planner.toml found")]
    NotAProject,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse planner.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit planner.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("{0}")]
    Schedule(#[from] LoadError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Find the project root by walking up from `start` to the first directory
/// holding a `planner.toml`.
pub fn discover_project(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::NotAProject);
        }
    }
}

/// Parse the project config only.
pub fn load_config(root: &Path) -> Result<PlannerConfig, ProjectError> {
    let config_path = root.join(CONFIG_FILE);
    let text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Load config and schedule. A missing or malformed schedule is an error.
pub fn load_project(root: &Path) -> Result<Project, ProjectError> {
    let config = load_config(root)?;
    let schedule = schedule_io::load_schedule(&root.join(&config.paths.schedule))?;
    Ok(Project {
        root: root.to_path_buf(),
        config,
        schedule,
    })
}

/// The project's storage file
pub fn storage_file(project: &Project) -> KeyValueFile {
    KeyValueFile::new(project.storage_path())
}

/// A store seeded from saved preferences that writes back on every change.
pub fn open_store(project: &Project) -> ClassificationStore {
    let file = storage_file(project);
    let key = &project.config.festival.storage_key;
    let prefs = load_preferences(&file, key);
    let mut store = ClassificationStore::with_sink(Box::new(FileSink::new(file, key.clone())));
    store.load(prefs);
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::classification::Classification;
    use tempfile::TempDir;

    fn create_test_project(dir: &Path) {
        fs::write(dir.join(CONFIG_FILE), "[festival]\nname = \"Test\"\n").unwrap();
        fs::create_dir_all(dir.join("data")).unwrap();
        fs::write(
            dir.join("data/schedule.json"),
            r#"[{"event":"Film A","day":"Dilluns","date":12,"time":"10:00","duration":"90'","venue":"Hall 1"}]"#,
        )
        .unwrap();
    }

    #[test]
    fn discovers_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        create_test_project(tmp.path());
        assert_eq!(discover_project(tmp.path()).unwrap(), tmp.path());
        let sub = tmp.path().join("data");
        assert_eq!(discover_project(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn not_a_project() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(discover_project(tmp.path()), Err(ProjectError::NotAProject)));
    }

    #[test]
    fn loads_config_and_schedule() {
        let tmp = TempDir::new().unwrap();
        create_test_project(tmp.path());
        let project = load_project(tmp.path()).unwrap();
        assert_eq!(project.config.festival.name, "Test");
        assert_eq!(project.schedule.len(), 1);
        assert_eq!(project.schedule.events[0].duration_minutes, Some(90));
    }

    #[test]
    fn missing_schedule_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "").unwrap();
        let err = load_project(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::Schedule(LoadError::ReadError { .. })));
    }

    #[test]
    fn store_persists_between_opens() {
        let tmp = TempDir::new().unwrap();
        create_test_project(tmp.path());
        let project = load_project(tmp.path()).unwrap();
        let id = project.schedule.events[0].identity();

        let mut store = open_store(&project);
        store.set_selected(&id).unwrap();
        drop(store);

        let reopened = open_store(&project);
        assert_eq!(reopened.classification_of(&id), Some(Classification::Selected));
    }
}
