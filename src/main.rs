use clap::{Parser, Subcommand};
use jerjerrod::commands::*;
use jerjerrod::core::{error::Result, print_error, print_warning, ProjectStatus};
use std::env;
use std::path::PathBuf;

/// Exit code when no subcommand was given
const NO_SUBCOMMAND_EXIT: i32 = 2;

#[derive(Parser)]
#[command(name = "jerjerrod")]
#[command(about = "At-a-glance status of all your git and mercurial repositories")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the names of projects with any of the given statuses
    #[command(alias = "namesbystatus")]
    NamesByStatus {
        /// UNKNOWN, CHANGED, UNTRACKED, UNPUSHED, GARBAGE or CLEAN
        /// (optionally prefixed with JERJERROD:)
        #[arg(required = true)]
        statuses: Vec<ProjectStatus>,
    },
    /// Summarize one project, found by name or by a path inside it
    Summary { name_or_path: String },
    /// Don't report on these projects until tomorrow
    #[command(alias = "nottoday")]
    NotToday {
        #[arg(required = true)]
        names_or_paths: Vec<String>,
    },
    /// Clear cached results for every repository at or above PATH
    #[command(alias = "clearcache")]
    ClearCache {
        /// Keep the cached (expensive) outgoing status
        #[arg(long)]
        local: bool,
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
    },
    /// Print project names grouped by status on one line
    StatusLine {
        /// Keep reprinting every SECONDS, refreshing the cache in the background
        #[arg(long, value_name = "SECONDS")]
        watch: Option<u64>,
    },
}

fn run(command: Option<Commands>) -> Result<i32> {
    match command {
        Some(Commands::NamesByStatus { statuses }) => execute_names_by_status(statuses)?,
        Some(Commands::Summary { name_or_path }) => execute_summary(&name_or_path)?,
        Some(Commands::NotToday { names_or_paths }) => execute_not_today(names_or_paths)?,
        Some(Commands::ClearCache { local, paths }) => execute_clear_cache(paths, local)?,
        Some(Commands::StatusLine { watch }) => execute_status_line(watch)?,
        None => {
            print_warning("No subcommand specified. Clearing cache and presenting summary");
            execute_clear_cache(vec![PathBuf::from(".")], false)?;
            execute_summary(".")?;
            return Ok(NO_SUBCOMMAND_EXIT);
        }
    }
    Ok(0)
}

fn main() {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match run(cli.command) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}
