pub mod app;
pub mod input;
pub mod render;
pub mod theme;

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::model::Project;

pub use app::run;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "FESTPLAN_LOG";

/// Log file inside the project, next to the storage file
pub const LOG_FILE: &str = ".festplan/festplan.log";

/// Send logs to the project's log file when `FESTPLAN_LOG` is set. The
/// terminal belongs to the grid, so nothing is written to stderr.
pub(crate) fn init_file_logging(project: &Project) {
    let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) else {
        return;
    };
    let path = project.root.join(LOG_FILE);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
