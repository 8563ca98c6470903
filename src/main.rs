use clap::Parser;
use festplan::cli::commands::{Cli, Commands};
use festplan::cli::handlers;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env(festplan::tui::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let project_dir = cli.project_dir.clone();

    let result = match cli.command {
        None => {
            // No subcommand → launch TUI, which logs to a file if at all
            festplan::tui::run(project_dir.as_deref())
        }
        Some(Commands::Init(args)) => {
            // Init is handled before project discovery
            init_logging();
            handlers::cmd_init(args, project_dir.as_deref())
        }
        Some(_) => {
            init_logging();
            handlers::dispatch(cli)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
