use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::io::config_io;
use crate::io::storage::atomic_write;

/// Error type for the version bump
#[derive(Debug, thiserror::Error)]
pub enum BumpError {
    #[error("{0} not found")]
    Missing(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid version file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("version file has no \"version\" string")]
    NoVersion,
    #[error("version '{0}' is not MAJOR.MINOR.PATCH")]
    BadVersion(String),
    #[error("{0}")]
    Config(#[from] crate::io::project_io::ProjectError),
}

/// Result of a bump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpReport {
    pub previous: String,
    pub version: String,
    pub build_date: String,
    pub worker_updated: bool,
}

/// `1.2.3` → `1.2.4`
pub fn next_patch(version: &str) -> Result<String, BumpError> {
    let bad = || BumpError::BadVersion(version.to_string());
    let parts: Vec<&str> = version.trim().split('.').collect();
    let [major, minor, patch] = parts.as_slice() else {
        return Err(bad());
    };
    let major: u64 = major.parse().map_err(|_| bad())?;
    let minor: u64 = minor.parse().map_err(|_| bad())?;
    let patch: u64 = patch.parse().map_err(|_| bad())?;
    Ok(format!("{}.{}.{}", major, minor, patch + 1))
}

/// Bump the patch component of a `version.json` document and stamp
/// `buildDate`. Other fields and their order are kept.
///
/// Returns `(new document, previous version, new version)`.
pub fn bump_version_document(text: &str, today: NaiveDate) -> Result<(String, String, String), BumpError> {
    let mut doc: IndexMap<String, Value> = serde_json::from_str(text)?;
    let previous = doc
        .get("version")
        .and_then(Value::as_str)
        .ok_or(BumpError::NoVersion)?
        .to_string();
    let version = next_patch(&previous)?;
    doc.insert("version".into(), Value::String(version.clone()));
    doc.insert("buildDate".into(), Value::String(today.format("%Y-%m-%d").to_string()));
    Ok((serde_json::to_string_pretty(&doc)?, previous, version))
}

fn worker_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"const CACHE_VERSION = '[^']+';").unwrap())
}

/// Rewrite the first `const CACHE_VERSION = '...';` in a worker script.
/// `None` when the script has no such line.
pub fn rewrite_worker_version(source: &str, version: &str) -> Option<String> {
    let re = worker_version_re();
    if !re.is_match(source) {
        return None;
    }
    let replacement = format!("const CACHE_VERSION = '{}';", version);
    Some(re.replacen(source, 1, regex::NoExpand(&replacement)).into_owned())
}

fn read(path: &Path) -> Result<String, BumpError> {
    if !path.exists() {
        return Err(BumpError::Missing(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|e| BumpError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write(path: &Path, content: &str) -> Result<(), BumpError> {
    atomic_write(path, content.as_bytes()).map_err(|e| BumpError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Bump `version.json`, sync `cache.version` in planner.toml, and optionally
/// rewrite a worker script's cache version.
pub fn run_bump(
    root: &Path,
    version_path: &Path,
    worker: Option<&Path>,
    today: NaiveDate,
) -> Result<BumpReport, BumpError> {
    let (doc, previous, version) = bump_version_document(&read(version_path)?, today)?;

    // Read everything before writing anything
    let (_, mut config_doc) = config_io::read_config(root)?;
    let worker_source = worker.map(read).transpose()?;

    write(version_path, &doc)?;
    config_io::set_cache_version(&mut config_doc, &version);
    config_io::write_config(root, &config_doc)?;

    let mut worker_updated = false;
    if let (Some(path), Some(source)) = (worker, worker_source) {
        match rewrite_worker_version(&source, &version) {
            Some(updated) => {
                write(path, &updated)?;
                worker_updated = true;
            }
            None => tracing::warn!(path = %path.display(), "no CACHE_VERSION line in worker"),
        }
    }

    tracing::debug!(%previous, %version, "bumped version");
    Ok(BumpReport {
        previous,
        version,
        build_date: today.format("%Y-%m-%d").to_string(),
        worker_updated,
    })
}
