use crate::core::{
    command_init::CommandContext,
    error::Result,
    output::{garbage_lines, print_lines, repo_summary, short_path, workspace_title, Line},
    project::Project,
    repo::Repo,
};
use std::path::Path;

const WORKSPACE_INDENT: usize = 2;

fn repo_lines(repo: &Repo, home: Option<&Path>, indent: usize) -> Result<Vec<Line>> {
    let info = repo.info(true)?;
    Ok(repo_summary(
        &short_path(repo.path(), home),
        info.as_ref(),
        indent,
    ))
}

/// Summary lines for a project, inspecting anything not freshly cached
pub fn summary_lines(project: &Project, home: Option<&Path>) -> Result<Vec<Line>> {
    match project {
        Project::Repo(repo) => repo_lines(repo, home, 0),
        Project::Workspace(ws) => {
            let mut lines = vec![workspace_title(&short_path(ws.path(), home))];
            for repo in ws.repos() {
                lines.extend(repo_lines(repo, home, WORKSPACE_INDENT)?);
            }
            lines.extend(garbage_lines(ws.garbage(), WORKSPACE_INDENT));
            Ok(lines)
        }
    }
}

pub fn execute_summary(name_or_path: &str) -> Result<()> {
    let context = CommandContext::initialize()?;
    let project = context.find_project(name_or_path)?;

    print_lines(&summary_lines(&project, dirs::home_dir().as_deref())?);
    Ok(())
}
