use clap::{Args, Parser, Subcommand};

use crate::ops::export::ExportFormat;
use crate::ops::filter::ViewFilter;

#[derive(Parser)]
#[command(name = "fp", about = concat!("festplan v", env!("CARGO_PKG_VERSION"), " - plan your festival from the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different project directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create planner.toml and data/ in the current directory
    Init(InitArgs),
    /// List festival days
    Days,
    /// Print the time grid for one day
    Grid(GridArgs),
    /// List events with their plan status
    List(ListArgs),
    /// Show event details
    Show(EventArgs),
    /// Toggle an event in the hidden set
    Hide(EventArgs),
    /// Toggle an event in the interested set
    Interest(EventArgs),
    /// Toggle an event in the selected set
    Select(EventArgs),
    /// Clear the hidden set
    UnhideAll,
    /// Show plan statistics
    Stats,
    /// Export the plan as text, JSON, or an iCalendar file
    Export(ExportArgs),
    /// Replace the plan with one from a .txt or .json file
    Import(ImportArgs),
    /// Manage the offline cache
    Cache(CacheCmd),
    /// Bump the patch version and sync the cache version
    Bump(BumpArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Festival name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Copy this schedule file into data/schedule.json
    #[arg(long)]
    pub schedule: Option<String>,
    /// Overwrite an existing planner.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct GridArgs {
    /// Day to show: date (12), source name (Dilluns) or English name
    /// (default: first day)
    pub day: Option<String>,
    /// Which events to draw (all, interested, selected, hidden)
    #[arg(long, default_value = "all")]
    pub filter: ViewFilter,
}

#[derive(Args)]
pub struct ListArgs {
    /// Which events to list (all, interested, selected, hidden)
    #[arg(long, default_value = "all")]
    pub filter: ViewFilter,
    /// Only events on this day
    #[arg(long)]
    pub day: Option<String>,
}

#[derive(Args)]
pub struct EventArgs {
    /// Event number from `fp list`, or its full identity
    pub event: String,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output format (text, json, ics)
    #[arg(long, short = 'f', default_value = "text")]
    pub format: ExportFormat,
    /// Output file, `-` for stdout (default: my-festival-plan.<ext>)
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Plan file; `.json` is read as JSON, anything else as text
    pub file: String,
}

#[derive(Args)]
pub struct CacheCmd {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Fetch the manifest into this version's cache
    Install,
    /// Fetch one path, falling back to the cache when the site is unreachable
    Fetch(FetchArgs),
    /// Make this version's cache active and delete the others
    Activate,
    /// Activate a waiting cache now
    SkipWaiting,
    /// Show cache generations
    Status,
}

#[derive(Args)]
pub struct FetchArgs {
    /// Request path, e.g. /data/schedule.json
    pub path: String,
    /// Write the body here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

#[derive(Args)]
pub struct BumpArgs {
    /// Worker script whose `const CACHE_VERSION = '...';` line is updated
    #[arg(long)]
    pub worker: Option<String>,
}
