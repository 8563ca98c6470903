use std::path::PathBuf;

use super::config::PlannerConfig;
use super::schedule::Schedule;

/// Name of the config file marking a planner project root
pub const CONFIG_FILE: &str = "planner.toml";

/// A loaded planner project
#[derive(Debug)]
pub struct Project {
    /// Directory containing `planner.toml`
    pub root: PathBuf,
    /// Parsed planner.toml
    pub config: PlannerConfig,
    pub schedule: Schedule,
}

impl Project {
    pub fn schedule_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.schedule)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.root.join(&self.config.paths.storage)
    }
}
