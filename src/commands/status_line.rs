use crate::core::{
    cache::path_key,
    command_init::CommandContext,
    config::ConfigCache,
    error::Result,
    output::{status_line, Line},
    project::Project,
    refresh::RefreshMonitor,
    status::ProjectStatus,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::Command;
use std::thread;
use std::time::Duration;

/// Unknown projects beyond this many are summarized as "(+N more)"
pub const UNKNOWN_LIMIT: usize = 5;

const SHOWN: [ProjectStatus; 4] = [
    ProjectStatus::Changed,
    ProjectStatus::Untracked,
    ProjectStatus::Unpushed,
    ProjectStatus::Unknown,
];

/// Project names by status, from cached results only. Ignore-listed
/// projects are left out and spotlighted ones lead their group.
pub fn group_projects(
    projects: &[Project],
    ignore: &BTreeSet<String>,
) -> Result<Vec<(ProjectStatus, Vec<String>)>> {
    let mut groups: Vec<(ProjectStatus, Vec<String>)> =
        SHOWN.iter().map(|status| (*status, Vec::new())).collect();

    let mut ordered: Vec<&Project> = projects.iter().collect();
    ordered.sort_by_key(|project| !project.is_spotlight());

    for project in ordered {
        if ignore.contains(&path_key(project.path())) {
            continue;
        }
        let status = project.status(false)?;
        if let Some((_, names)) = groups.iter_mut().find(|(shown, _)| *shown == status) {
            names.push(project.name().to_string());
        }
    }

    for (status, names) in &mut groups {
        if *status == ProjectStatus::Unknown && names.len() > UNKNOWN_LIMIT {
            let more = names.len() - UNKNOWN_LIMIT;
            names.truncate(UNKNOWN_LIMIT);
            names.push(format!("(+{more} more)"));
        }
    }

    Ok(groups)
}

/// Re-renders the status line, keeping a background refresh going
#[derive(Debug)]
pub struct StatusLineWatcher {
    context: CommandContext,
    config: ConfigCache,
    monitor: RefreshMonitor,
    seen_generation: u64,
}

impl StatusLineWatcher {
    pub fn new(context: CommandContext, monitor: RefreshMonitor) -> Self {
        let config = context.config_cache();
        Self {
            context,
            config,
            monitor,
            seen_generation: 0,
        }
    }

    pub fn render(&mut self) -> Result<Line> {
        self.monitor.tick(false)?;

        let projects = self
            .context
            .enumerator()
            .enumerate(self.config.directives()?)?;

        // a new config gets a fresh refresh, even after a failure
        let generation = self.config.generation();
        if generation != self.seen_generation {
            if self.seen_generation != 0 {
                log::debug!("Config changed, restarting background refresh");
                self.monitor.cancel();
                self.monitor.reset();
            }
            self.seen_generation = generation;
        }

        let groups = group_projects(&projects, &self.context.cache.ignore_list())?;

        let has_unknown = groups
            .iter()
            .any(|(status, names)| *status == ProjectStatus::Unknown && !names.is_empty());
        if has_unknown && self.monitor.is_idle() {
            self.monitor.tick(true)?;
        }

        Ok(status_line(&groups, self.monitor.indicator()))
    }
}

/// `jerjerrod names-by-status CHANGED`, which refreshes every stale entry
fn refresh_command() -> Command {
    let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("jerjerrod"));
    let mut cmd = Command::new(exe);
    cmd.args(["names-by-status", ProjectStatus::Changed.as_str()]);
    cmd
}

pub fn execute_status_line(watch: Option<u64>) -> Result<()> {
    let context = CommandContext::initialize()?;

    let Some(seconds) = watch else {
        let projects = context.load_projects()?;
        let groups = group_projects(&projects, &context.cache.ignore_list())?;
        println!("{}", status_line(&groups, None).render());
        return Ok(());
    };

    let mut watcher = StatusLineWatcher::new(context, RefreshMonitor::new(refresh_command));
    let pause = Duration::from_secs(seconds.max(1));
    loop {
        println!("{}", watcher.render()?.render());
        thread::sleep(pause);
    }
}
