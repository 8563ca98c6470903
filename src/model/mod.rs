pub mod classification;
pub mod config;
pub mod event;
pub mod project;
pub mod schedule;

pub use classification::*;
pub use config::*;
pub use event::*;
pub use project::*;
pub use schedule::*;
