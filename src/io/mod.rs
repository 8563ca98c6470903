pub mod config_io;
pub mod lock;
pub mod offline;
pub mod project_io;
pub mod schedule_io;
pub mod storage;
pub mod watcher;
