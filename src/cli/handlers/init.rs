use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::project_io;
use crate::model::project::CONFIG_FILE;

const PLANNER_TOML_TEMPLATE: &str = r##"[festival]
name = "{name}"
# Month the festival runs in. Calendar export pins every event to it.
month = 10
# storage_key = "festivalPlannerPrefs"

[paths]
schedule = "data/schedule.json"
storage = ".festplan/storage.json"
version = "version.json"

[cache]
name = "festival-planner"
version = "1.0.0"
# dir = ".festplan/cache"
# site_dir = "."
# manifest = ["/", "/index.html", "/css/styles.css", "/js/planner.js", "/data/schedule.json", "/manifest.json"]

# --- UI Customization ---
# Uncomment and edit to override defaults.

[ui]
# seconds a notice stays in the status row (3-5)
notice_seconds = 4
#
# [ui.colors]
# background = "#0C001B"
# text = "#A09BFE"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#5A5580"
# interested = "#44DDFF"
# selected = "#44FF88"
# hidden = "#5A5580"
"##;

const EMPTY_SCHEDULE: &str = "[]\n";

const VERSION_TEMPLATE: &str = "{\n  \"version\": \"1.0.0\"\n}";

/// Infer a festival name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_planner_toml(name: &str) -> String {
    PLANNER_TOML_TEMPLATE.replace("{name}", &name.replace('"', "\\\""))
}

/// Initialize a project in `dir` (created if missing), or the working directory.
pub fn cmd_init(args: InitArgs, dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = match dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            fs::canonicalize(dir)?
        }
        None => std::env::current_dir()?,
    };
    let config_path = cwd.join(CONFIG_FILE);

    if config_path.exists() && !args.force {
        return Err("planner.toml already exists (use --force to overwrite)".into());
    }

    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = project_io::discover_project(parent)
    {
        eprintln!("Note: parent project found at {}/", parent_root.display());
    }

    // Read the source schedule before writing anything
    let schedule = match &args.schedule {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("could not read {}: {}", path, e))?;
            crate::io::schedule_io::parse_schedule(&text)
                .map_err(|e| format!("{} is not a valid schedule: {}", path, e))?;
            Some(text)
        }
        None => None,
    };

    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Festival".to_string())
    });

    fs::write(&config_path, render_planner_toml(&name))?;

    let data_dir = cwd.join("data");
    fs::create_dir_all(&data_dir)?;
    let schedule_path = data_dir.join("schedule.json");
    match schedule {
        Some(text) => fs::write(&schedule_path, text)?,
        None if !schedule_path.exists() => fs::write(&schedule_path, EMPTY_SCHEDULE)?,
        None => {}
    }

    let version_path = cwd.join("version.json");
    if !version_path.exists() {
        fs::write(&version_path, VERSION_TEMPLATE)?;
    }

    fs::create_dir_all(cwd.join(".festplan"))?;

    println!("Initialized planner \"{}\" in {}", name, cwd.display());
    Ok(())
}
