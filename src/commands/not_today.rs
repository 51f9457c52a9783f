use crate::core::{
    cache::{path_key, ResultCache},
    command_init::CommandContext,
    error::Result,
    output::print_success,
    project::Project,
};

/// Add every project matching one of `names_or_paths` to today's ignore
/// list; returns the names of the projects added
pub fn mark_not_today(
    cache: &ResultCache,
    projects: &[Project],
    names_or_paths: &[String],
) -> Result<Vec<String>> {
    let mut ignore = cache.ignore_list();
    let mut added = Vec::new();

    for project in projects {
        if names_or_paths.iter().any(|arg| project.matches(arg)) {
            ignore.insert(path_key(project.path()));
            added.push(project.name().to_string());
        }
    }

    cache.set_ignore_list(&ignore)?;
    Ok(added)
}

pub fn execute_not_today(names_or_paths: Vec<String>) -> Result<()> {
    let context = CommandContext::initialize()?;
    let projects = context.load_projects()?;

    let added = mark_not_today(&context.cache, &projects, &names_or_paths)?;
    if !added.is_empty() {
        print_success(&format!("Ignoring until tomorrow: {}", added.join(", ")));
    }
    Ok(())
}
