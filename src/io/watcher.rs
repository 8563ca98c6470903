use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Changes the TUI event loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEvent {
    /// The storage file was rewritten, usually by an `fp` command.
    Preferences,
    /// The schedule file changed on disk.
    Schedule,
}

/// Watches the storage and schedule files of one project.
pub struct PlannerWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<FileEvent>,
}

impl PlannerWatcher {
    /// Start watching. Each file's parent directory is watched so atomic
    /// renames onto the file are seen.
    pub fn start(storage: &Path, schedule: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let storage_owned = storage.to_path_buf();
        let schedule_owned = schedule.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::debug!(error = %e, "watcher error");
                        return;
                    }
                };
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }
                for path in &event.paths {
                    if let Some(kind) = classify(path, &storage_owned, &schedule_owned) {
                        let _ = tx.send(kind);
                    }
                }
            },
            Config::default(),
        )?;

        let mut dirs: Vec<PathBuf> = [storage, schedule]
            .iter()
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .filter(|d| d.is_dir())
            .collect();
        dirs.sort();
        dirs.dedup();
        for dir in &dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }

        Ok(PlannerWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain queued events without blocking, collapsing repeats.
    pub fn poll(&self) -> Vec<FileEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            if !events.contains(&evt) {
                events.push(evt);
            }
        }
        events
    }
}

/// Which watched file, if any, a changed path is.
fn classify(path: &Path, storage: &Path, schedule: &Path) -> Option<FileEvent> {
    if path.file_name() == storage.file_name() && path.parent() == storage.parent() {
        Some(FileEvent::Preferences)
    } else if path.file_name() == schedule.file_name() && path.parent() == schedule.parent() {
        Some(FileEvent::Schedule)
    } else {
        None
    }
}
