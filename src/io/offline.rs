//! On-disk offline cache with an install / activate / fetch lifecycle.
//!
//! Each cache generation is a directory named `<name>-v<version>` under the
//! cache root. `worker.json` records which generation is active and which,
//! if any, is installed and waiting to take over.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::io::storage::atomic_write;

const STATE_FILE: &str = "worker.json";

/// Stored name of the `/` request
const ROOT_ENTRY: &str = "__root__";

/// Error type for offline cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("could not fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
    #[error("refusing unsafe request path: {0}")]
    UnsafePath(String),
    #[error("{0} is not available offline")]
    NotCached(String),
    #[error("could not access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("corrupt worker state: {0}")]
    State(#[from] serde_json::Error),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> CacheError + '_ {
    move |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where responses come from when the network is available.
pub trait Origin {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, CacheError>;
}

/// Serves request paths from a directory, `/` mapping to `index.html`.
#[derive(Debug, Clone)]
pub struct DirOrigin {
    root: PathBuf,
}

impl DirOrigin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirOrigin { root: root.into() }
    }
}

impl Origin for DirOrigin {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, CacheError> {
        let rel = match relative_path(path)? {
            Some(rel) => rel,
            None => PathBuf::from("index.html"),
        };
        let full = self.root.join(rel);
        fs::read(&full).map_err(|e| CacheError::Fetch {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Validate a request path and turn it into a relative file path.
/// `/` (and the empty path) yield `None`.
fn relative_path(path: &str) -> Result<Option<PathBuf>, CacheError> {
    let trimmed = path.split(['?', '#']).next().unwrap_or("").trim_start_matches('/');
    if trimmed.is_empty() {
        return Ok(None);
    }
    let rel = PathBuf::from(trimmed);
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(CacheError::UnsafePath(path.to_string()));
    }
    Ok(Some(rel))
}

/// Persisted lifecycle state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerState {
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default)]
    pub waiting: Option<String>,
}

/// Message posted to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMessage {
    SkipWaiting,
}

/// What an install did once every asset was stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// No generation was active, so this one took over immediately
    Activated,
    /// Another generation is active; this one waits
    Waiting,
    /// This generation was already active and has been refreshed
    Refreshed,
}

/// Where a fetched response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Network,
    Cache,
}

#[derive(Debug, Clone)]
pub struct Fetched {
    pub body: Vec<u8>,
    pub source: FetchSource,
}

/// Snapshot for `fp cache status`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub current: String,
    pub active: Option<String>,
    pub waiting: Option<String>,
    pub generations: Vec<String>,
    pub active_entries: usize,
}

/// The offline cache for one worker version
#[derive(Debug, Clone)]
pub struct OfflineCache {
    dir: PathBuf,
    name: String,
}

impl OfflineCache {
    /// `name` is the full generation name this worker installs,
    /// e.g. `festival-planner-v1.0.3`.
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        OfflineCache {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn generation_dir(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn entry_path(&self, generation: &str, request: &str) -> Result<PathBuf, CacheError> {
        let rel = relative_path(request)?.unwrap_or_else(|| PathBuf::from(ROOT_ENTRY));
        Ok(self.generation_dir(generation).join(rel))
    }

    pub fn state(&self) -> Result<WorkerState, CacheError> {
        let path = self.dir.join(STATE_FILE);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(WorkerState::default()),
            Err(e) => Err(io_err(&path)(e)),
        }
    }

    fn write_state(&self, state: &WorkerState) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        let path = self.dir.join(STATE_FILE);
        let content = serde_json::to_string_pretty(state)?;
        atomic_write(&path, content.as_bytes()).map_err(io_err(&path))
    }

    /// Fetch every manifest path into this generation.
    ///
    /// Assets are staged first; any failure discards the staging directory
    /// and leaves existing generations alone.
    pub fn install(&self, manifest: &[String], origin: &dyn Origin) -> Result<InstallOutcome, CacheError> {
        let staging = self.dir.join(format!(".{}.partial", self.name));
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(io_err(&staging))?;
        }
        fs::create_dir_all(&staging).map_err(io_err(&staging))?;

        if let Err(e) = self.stage(&staging, manifest, origin) {
            tracing::warn!(cache = %self.name, error = %e, "install failed");
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        let target = self.generation_dir(&self.name);
        if target.exists() {
            fs::remove_dir_all(&target).map_err(io_err(&target))?;
        }
        fs::rename(&staging, &target).map_err(io_err(&target))?;
        tracing::debug!(cache = %self.name, assets = manifest.len(), "installed");

        let mut state = self.state()?;
        let active = state.active.clone();
        match active.as_deref() {
            None => {
                self.activate_generation(&mut state, self.name.clone())?;
                Ok(InstallOutcome::Activated)
            }
            Some(active) if active == self.name => {
                if state.waiting.as_deref() == Some(self.name.as_str()) {
                    state.waiting = None;
                    self.write_state(&state)?;
                }
                Ok(InstallOutcome::Refreshed)
            }
            Some(_) => {
                state.waiting = Some(self.name.clone());
                self.write_state(&state)?;
                Ok(InstallOutcome::Waiting)
            }
        }
    }

    fn stage(&self, staging: &Path, manifest: &[String], origin: &dyn Origin) -> Result<(), CacheError> {
        for request in manifest {
            let body = origin.fetch(request)?;
            let rel = relative_path(request)?.unwrap_or_else(|| PathBuf::from(ROOT_ENTRY));
            write_entry(&staging.join(rel), &body)?;
        }
        Ok(())
    }

    /// Make this worker's generation active and delete every other one.
    /// Returns the names of the deleted generations.
    pub fn activate(&self) -> Result<Vec<String>, CacheError> {
        let mut state = self.state()?;
        self.activate_generation(&mut state, self.name.clone())
    }

    fn activate_generation(&self, state: &mut WorkerState, name: String) -> Result<Vec<String>, CacheError> {
        let mut deleted = Vec::new();
        for generation in self.generations()? {
            if generation != name {
                let path = self.generation_dir(&generation);
                fs::remove_dir_all(&path).map_err(io_err(&path))?;
                tracing::debug!(cache = %generation, "deleted old cache");
                deleted.push(generation);
            }
        }
        if state.waiting.as_deref().is_some_and(|w| w == name || deleted.iter().any(|d| d == w)) {
            state.waiting = None;
        }
        state.active = Some(name);
        self.write_state(state)?;
        Ok(deleted)
    }

    /// Handle a posted message. `SkipWaiting` activates the waiting
    /// generation, if there is one, and returns the deleted generations.
    pub fn handle_message(&self, message: WorkerMessage) -> Result<Option<Vec<String>>, CacheError> {
        match message {
            WorkerMessage::SkipWaiting => {
                let mut state = self.state()?;
                match state.waiting.clone() {
                    Some(waiting) => Ok(Some(self.activate_generation(&mut state, waiting)?)),
                    None => Ok(None),
                }
            }
        }
    }

    /// Network first. A successful response refreshes the active cache; a
    /// failed one falls back to it.
    pub fn fetch(&self, request: &str, origin: &dyn Origin) -> Result<Fetched, CacheError> {
        let state = self.state()?;
        match origin.fetch(request) {
            Ok(body) => {
                if let Some(active) = state.active.as_deref() {
                    let path = self.entry_path(active, request)?;
                    if let Err(e) = write_entry(&path, &body) {
                        tracing::warn!(request, error = %e, "could not update cache entry");
                    }
                }
                Ok(Fetched {
                    body,
                    source: FetchSource::Network,
                })
            }
            Err(e @ CacheError::UnsafePath(_)) => Err(e),
            Err(e) => {
                tracing::debug!(request, error = %e, "network failed, trying cache");
                let active = state
                    .active
                    .ok_or_else(|| CacheError::NotCached(request.to_string()))?;
                let path = self.entry_path(&active, request)?;
                match fs::read(&path) {
                    Ok(body) => Ok(Fetched {
                        body,
                        source: FetchSource::Cache,
                    }),
                    Err(_) => Err(CacheError::NotCached(request.to_string())),
                }
            }
        }
    }

    /// Names of the generations on disk, sorted
    pub fn generations(&self) -> Result<Vec<String>, CacheError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(&self.dir)(e)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_err(&self.dir))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && !name.starts_with('.')
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn status(&self) -> Result<CacheStatus, CacheError> {
        let state = self.state()?;
        let active_entries = match state.active.as_deref() {
            Some(active) => count_files(&self.generation_dir(active)),
            None => 0,
        };
        Ok(CacheStatus {
            current: self.name.clone(),
            active: state.active,
            waiting: state.waiting,
            generations: self.generations()?,
            active_entries,
        })
    }
}

fn write_entry(path: &Path, body: &[u8]) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    fs::write(path, body).map_err(io_err(path))
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|e| {
            let path = e.path();
            if path.is_dir() { count_files(&path) } else { 1 }
        })
        .sum()
}
