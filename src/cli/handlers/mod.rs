mod init;
pub use init::cmd_init;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::offline::{DirOrigin, FetchSource, InstallOutcome, OfflineCache, WorkerMessage};
use crate::io::project_io::{self, ProjectError};
use crate::io::storage::atomic_write;
use crate::model::Schedule;
use crate::model::classification::Classification;
use crate::model::project::Project;
use crate::model::schedule::DayBucket;
use crate::ops::export;
use crate::ops::import::{self, ImportFormat};
use crate::ops::layout::{compute_slots, layout_day};
use crate::ops::stats::compute_stats;
use crate::ops::bump;
use crate::parse::time::minutes_to_time;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Per-invocation settings shared by every handler
pub struct Context {
    pub json: bool,
    /// Where project discovery starts (`-C` or the working directory)
    pub start_dir: PathBuf,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let start_dir = match &cli.project_dir {
            Some(dir) => fs::canonicalize(dir)
                .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
            None => std::env::current_dir()?,
        };
        Ok(Context {
            json: cli.json,
            start_dir,
        })
    }

    fn root(&self) -> Result<PathBuf, ProjectError> {
        project_io::discover_project(&self.start_dir)
    }

    fn project(&self) -> Result<Project, ProjectError> {
        let project = project_io::load_project(&self.root()?)?;
        tracing::debug!(
            root = %project.root.display(),
            events = project.schedule.len(),
            "loaded project"
        );
        Ok(project)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        None => crate::tui::run(cli.project_dir.as_deref()),
        Some(cmd) => match cmd {
            // Normally handled in main.rs before project discovery
            Commands::Init(args) => cmd_init(args, cli.project_dir.as_deref()),

            // Read commands
            Commands::Days => cmd_days(&ctx),
            Commands::Grid(args) => cmd_grid(&ctx, args),
            Commands::List(args) => cmd_list(&ctx, args),
            Commands::Show(args) => cmd_show(&ctx, args),
            Commands::Stats => cmd_stats(&ctx),

            // Plan edits
            Commands::Hide(args) => cmd_toggle(&ctx, Classification::Hidden, args),
            Commands::Interest(args) => cmd_toggle(&ctx, Classification::Interested, args),
            Commands::Select(args) => cmd_toggle(&ctx, Classification::Selected, args),
            Commands::UnhideAll => cmd_unhide_all(&ctx),
            Commands::Export(args) => cmd_export(&ctx, args),
            Commands::Import(args) => cmd_import(&ctx, args),

            // Maintenance
            Commands::Cache(cmd) => cmd_cache(&ctx, cmd.action),
            Commands::Bump(args) => cmd_bump(&ctx, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn find_day<'a>(schedule: &'a Schedule, selector: Option<&str>) -> Result<DayBucket<'a>, String> {
    let mut buckets = schedule.day_buckets();
    if buckets.is_empty() {
        return Err("the schedule has no events".to_string());
    }
    match selector {
        None => Ok(buckets.swap_remove(0)),
        Some(sel) => buckets
            .into_iter()
            .find(|b| b.key.matches(sel))
            .ok_or_else(|| format!("no festival day matches '{}'", sel)),
    }
}

fn resolve_event<'a>(schedule: &'a Schedule, reference: &str) -> Result<&'a crate::model::Event, String> {
    schedule
        .resolve(reference)
        .ok_or_else(|| format!("event not found: {}", reference))
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_days(ctx: &Context) -> CmdResult {
    let project = ctx.project()?;
    let days: Vec<DayJson> = project
        .schedule
        .day_buckets()
        .into_iter()
        .map(|bucket| {
            let slots = compute_slots(&bucket.events);
            DayJson {
                label: bucket.key.label(),
                day: bucket.key.day.clone(),
                date: bucket.key.date.clone(),
                events: bucket.events.len(),
                first_slot: slots.first().map(|&m| minutes_to_time(m)),
                last_slot: slots.last().map(|&m| minutes_to_time(m)),
            }
        })
        .collect();

    if ctx.json {
        return print_json(&days);
    }
    if days.is_empty() {
        println!("No festival days");
        return Ok(());
    }
    for day in &days {
        let range = match (&day.first_slot, &day.last_slot) {
            (Some(first), Some(last)) => format!("{}-{}", first, last),
            _ => "untimed".to_string(),
        };
        println!("{:<16} {:>3} events  {}", day.label, day.events, range);
    }
    Ok(())
}

fn cmd_grid(ctx: &Context, args: GridArgs) -> CmdResult {
    let project = ctx.project()?;
    let store = project_io::open_store(&project);
    let bucket = find_day(&project.schedule, args.day.as_deref())?;
    let venues = project.schedule.venues();
    let grid = layout_day(&bucket, &venues);

    if ctx.json {
        let events: Vec<EventJson> = project
            .schedule
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| bucket.events.iter().any(|b| std::ptr::eq(*b, *e)))
            .filter_map(|(i, e)| {
                let status = store.classification_of(&e.identity());
                args.filter.shows(status).then(|| event_to_json(i + 1, e, status))
            })
            .collect();
        return print_json(&events);
    }

    print!("{}", render_text_grid(&grid, &store, args.filter));
    Ok(())
}

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let project = ctx.project()?;
    let store = project_io::open_store(&project);

    let day = match args.day.as_deref() {
        Some(sel) => Some(find_day(&project.schedule, Some(sel))?.key),
        None => None,
    };

    let rows: Vec<(usize, &crate::model::Event, Option<Classification>)> = project
        .schedule
        .events
        .iter()
        .enumerate()
        .filter(|(_, e)| day.as_ref().is_none_or(|key| key.day == e.day && key.date == e.date.to_string()))
        .map(|(i, e)| (i + 1, e, store.classification_of(&e.identity())))
        .filter(|(_, _, status)| args.filter.shows(*status))
        .collect();

    if ctx.json {
        let events: Vec<EventJson> = rows
            .iter()
            .map(|(i, e, status)| event_to_json(*i, e, *status))
            .collect();
        return print_json(&events);
    }

    if rows.is_empty() {
        println!("No events ({} filter)", args.filter);
        return Ok(());
    }
    for (i, e, status) in rows {
        println!("{}", format_event_line(i, e, status));
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: EventArgs) -> CmdResult {
    let project = ctx.project()?;
    let store = project_io::open_store(&project);
    let event = resolve_event(&project.schedule, &args.event)?;
    let status = store.classification_of(&event.identity());

    if ctx.json {
        let index = project
            .schedule
            .events
            .iter()
            .position(|e| std::ptr::eq(e, event))
            .map_or(0, |i| i + 1);
        return print_json(&event_to_json(index, event, status));
    }
    for line in format_event_detail(event, status) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_stats(ctx: &Context) -> CmdResult {
    let project = ctx.project()?;
    let store = project_io::open_store(&project);
    let stats = compute_stats(&project.schedule, &store);

    if ctx.json {
        return print_json(&stats);
    }
    println!("{}", project.config.festival.name);
    println!("  events:     {} ({} visible)", stats.total_events, stats.visible_events);
    println!("  in plan:    {} ({} selected)", stats.plan_events, stats.selected_events);
    println!("  plan hours: {}", stats.plan_hours);
    println!("  days:       {}", stats.days);
    println!("  venues:     {}", stats.venues);
    Ok(())
}

// ---------------------------------------------------------------------------
// Plan edits
// ---------------------------------------------------------------------------

fn cmd_toggle(ctx: &Context, class: Classification, args: EventArgs) -> CmdResult {
    let project = ctx.project()?;
    let mut store = project_io::open_store(&project);
    let event = resolve_event(&project.schedule, &args.event)?;
    let id = event.identity();
    let status = store.toggle(class, &id)?;

    if ctx.json {
        return print_json(&ToggleJson { id, status });
    }
    match status {
        Some(class) => println!("{}: {}", class.name(), event.title),
        None => println!("cleared: {}", event.title),
    }
    Ok(())
}

fn cmd_unhide_all(ctx: &Context) -> CmdResult {
    let project = ctx.project()?;
    let mut store = project_io::open_store(&project);
    let count = store.ids(Classification::Hidden).len();
    store.clear_hidden()?;
    if ctx.json {
        return print_json(&serde_json::json!({ "unhidden": count }));
    }
    println!("Unhid {} event{}", count, if count == 1 { "" } else { "s" });
    Ok(())
}

fn cmd_export(ctx: &Context, args: ExportArgs) -> CmdResult {
    let project = ctx.project()?;
    let store = project_io::open_store(&project);
    let exported = export::export_plan(args.format, &project.schedule, &store, project.config.festival.month)?;

    for title in &exported.skipped {
        eprintln!("warning: skipped '{}' (no usable date or time)", title);
    }

    let output = args
        .output
        .unwrap_or_else(|| args.format.default_file_name());
    if output == "-" {
        std::io::stdout().write_all(exported.content.as_bytes())?;
        return Ok(());
    }

    let path = PathBuf::from(&output);
    atomic_write(&path, exported.content.as_bytes())
        .map_err(|e| format!("could not write {}: {}", path.display(), e))?;

    if ctx.json {
        return print_json(&ExportJson {
            format: exported.format.to_string(),
            path: path.display().to_string(),
            count: exported.count,
            skipped: exported.skipped,
        });
    }
    println!(
        "Exported {} event{} to {}",
        exported.count,
        if exported.count == 1 { "" } else { "s" },
        path.display()
    );
    Ok(())
}

fn cmd_import(ctx: &Context, args: ImportArgs) -> CmdResult {
    let project = ctx.project()?;
    let mut store = project_io::open_store(&project);
    let path = Path::new(&args.file);
    let text = fs::read_to_string(path).map_err(|e| format!("could not read {}: {}", args.file, e))?;
    let report = import::import_plan(ImportFormat::for_path(path), &text, &project.schedule, &mut store)?;

    if ctx.json {
        return print_json(&ImportJson {
            imported: report.imported,
            replaced: report.replaced,
            unmatched: report.unmatched,
        });
    }
    println!(
        "Imported {} interested, {} selected, {} hidden",
        report.imported.interested, report.imported.selected, report.imported.hidden
    );
    if report.unmatched > 0 {
        eprintln!(
            "warning: {} record{} matched no event in the schedule",
            report.unmatched,
            if report.unmatched == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

fn cmd_cache(ctx: &Context, action: CacheAction) -> CmdResult {
    let root = ctx.root()?;
    let config = project_io::load_config(&root)?;
    let cache = OfflineCache::new(root.join(&config.cache.dir), config.cache.cache_name());
    let origin = DirOrigin::new(root.join(&config.cache.site_dir));

    match action {
        CacheAction::Install => {
            let outcome = cache.install(&config.cache.manifest, &origin)?;
            let message = match outcome {
                InstallOutcome::Activated => "installed and activated",
                InstallOutcome::Waiting => "installed, waiting for activation",
                InstallOutcome::Refreshed => "refreshed",
            };
            println!("{}: {}", cache.name(), message);
        }
        CacheAction::Fetch(args) => {
            let fetched = cache.fetch(&args.path, &origin)?;
            if fetched.source == FetchSource::Cache {
                eprintln!("offline: served {} from {}", args.path, cache.name());
            }
            match args.output {
                Some(out) => atomic_write(Path::new(&out), &fetched.body)?,
                None => std::io::stdout().write_all(&fetched.body)?,
            }
        }
        CacheAction::Activate => report_deleted(cache.name(), &cache.activate()?),
        CacheAction::SkipWaiting => match cache.handle_message(WorkerMessage::SkipWaiting)? {
            Some(deleted) => report_deleted(cache.name(), &deleted),
            None => println!("{} is not waiting", cache.name()),
        },
        CacheAction::Status => {
            let status = cache.status()?;
            if ctx.json {
                return print_json(&status);
            }
            println!("current:  {}", status.current);
            println!("active:   {}", status.active.as_deref().unwrap_or("-"));
            println!("waiting:  {}", status.waiting.as_deref().unwrap_or("-"));
            println!("entries:  {}", status.active_entries);
            for name in &status.generations {
                println!("  {}", name);
            }
        }
    }
    Ok(())
}

fn report_deleted(name: &str, deleted: &[String]) {
    println!("{} active", name);
    for old in deleted {
        println!("  deleted {}", old);
    }
}

fn cmd_bump(ctx: &Context, args: BumpArgs) -> CmdResult {
    let root = ctx.root()?;
    let config = project_io::load_config(&root)?;
    let worker = args.worker.map(|w| root.join(w));
    let report = bump::run_bump(
        &root,
        &root.join(&config.paths.version),
        worker.as_deref(),
        Local::now().date_naive(),
    )?;

    if ctx.json {
        return print_json(&serde_json::json!({
            "previous": report.previous,
            "version": report.version,
            "build_date": report.build_date,
            "worker_updated": report.worker_updated,
        }));
    }
    println!("{} -> {} ({})", report.previous, report.version, report.build_date);
    if report.worker_updated {
        println!("worker cache version updated");
    }
    Ok(())
}
