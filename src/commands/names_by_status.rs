use crate::core::{
    command_init::CommandContext, error::Result, project::Project, status::ProjectStatus,
};

/// Names of the projects whose status is one of `statuses`
pub fn names_by_status(
    projects: &[Project],
    statuses: &[ProjectStatus],
    can_inspect: bool,
) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for project in projects {
        let status = project.status(can_inspect)?;
        log::debug!("{} is {status}", project.name());
        if statuses.contains(&status) {
            names.push(project.name().to_string());
        }
    }
    Ok(names)
}

/// Print matching project names, one per line. Inspects every project whose
/// cache entry is missing or expired, so this doubles as the cache refresher.
pub fn execute_names_by_status(statuses: Vec<ProjectStatus>) -> Result<()> {
    let context = CommandContext::initialize()?;
    let projects = context.load_projects()?;

    for name in names_by_status(&projects, &statuses, true)? {
        println!("{name}");
    }
    Ok(())
}
