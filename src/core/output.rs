//! Output formatting for the command-line surface.
//!
//! Rendering is split in two: builders return [`Line`]s made of toned
//! segments, and [`Line::render`] applies the colors. Tests compare
//! [`Line::plain`] so they never depend on terminal detection.
//!
//! # Color scheme
//! - changed: bold red
//! - untracked (and stashes, garbage): red
//! - unpushed: yellow
//! - unknown: magenta
//! - clean: green
//! - workspace titles: bold blue

use crate::core::{info::RepoInfo, status::ProjectStatus};
use colored::*;
use std::path::Path;

/// File lists longer than this are abbreviated
pub const FILES_WIDTH: usize = 40;

/// Summary stats longer than this go one per line
pub const STATS_WIDTH: usize = 80;

const SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Changed,
    Untracked,
    Unpushed,
    Unknown,
    Clean,
    Title,
}

impl Tone {
    pub fn paint(self, text: &str) -> ColoredString {
        match self {
            Tone::Changed => text.red().bold(),
            Tone::Untracked => text.red(),
            Tone::Unpushed => text.yellow(),
            Tone::Unknown => text.magenta(),
            Tone::Clean => text.green(),
            Tone::Title => text.blue().bold(),
        }
    }
}

impl From<ProjectStatus> for Tone {
    fn from(status: ProjectStatus) -> Self {
        match status {
            ProjectStatus::Unknown => Tone::Unknown,
            ProjectStatus::Changed => Tone::Changed,
            ProjectStatus::Untracked | ProjectStatus::Garbage => Tone::Untracked,
            ProjectStatus::Unpushed => Tone::Unpushed,
            ProjectStatus::Clean => Tone::Clean,
        }
    }
}

/// One output line: an indent plus toned segments joined by `" | "`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub indent: usize,
    pub segments: Vec<(Tone, String)>,
}

impl Line {
    pub fn new(indent: usize, tone: Tone, text: impl Into<String>) -> Self {
        Self {
            indent,
            segments: vec![(tone, text.into())],
        }
    }

    pub fn joined(indent: usize, segments: Vec<(Tone, String)>) -> Self {
        Self { indent, segments }
    }

    pub fn plain(&self) -> String {
        let body: Vec<&str> = self.segments.iter().map(|(_, text)| text.as_str()).collect();
        format!("{}{}", " ".repeat(self.indent), body.join(SEPARATOR))
    }

    pub fn render(&self) -> String {
        let body: Vec<String> = self
            .segments
            .iter()
            .map(|(tone, text)| tone.paint(text).to_string())
            .collect();
        let separator = SEPARATOR.bright_black().dimmed().to_string();
        format!("{}{}", " ".repeat(self.indent), body.join(&separator))
    }
}

/// Print every line with colors
pub fn print_lines(lines: &[Line]) {
    for line in lines {
        println!("{}", line.render());
    }
}

/// Abbreviate a list of paths to fit [`FILES_WIDTH`]: the full list, then
/// top-level directories only, then just a count
pub fn files_summary(files: &[String]) -> String {
    if files.is_empty() {
        return String::new();
    }

    let joined = files.join(", ");
    if joined.chars().count() <= FILES_WIDTH {
        return joined;
    }

    let short = files
        .iter()
        .map(|file| format!("{}/...", file.split('/').next().unwrap_or(file)))
        .collect::<Vec<_>>()
        .join(", ");
    if short.chars().count() <= FILES_WIDTH {
        return short;
    }

    files.len().to_string()
}

/// `path` with the home directory replaced by `~`
pub fn short_path(path: &Path, home: Option<&Path>) -> String {
    match home.and_then(|home| path.strip_prefix(home).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.display()),
        None => path.display().to_string(),
    }
}

/// Title and stats lines for one repo
pub fn repo_summary(title: &str, info: Option<&RepoInfo>, indent: usize) -> Vec<Line> {
    let Some(info) = info else {
        return vec![Line::new(indent, Tone::Unknown, format!("> {title} (unknown)"))];
    };

    let outgoing = info.outgoing.is_truthy().then(|| info.outgoing.to_string());

    let tone = if !info.changed.is_empty() {
        Tone::Changed
    } else if outgoing.is_some() {
        Tone::Unpushed
    } else if !info.untracked.is_empty() || info.stashes > 0 {
        Tone::Untracked
    } else {
        Tone::Clean
    };

    let title = match &info.branch {
        Some(branch) => format!("> {title} [{branch}]"),
        None => format!("> {title}"),
    };
    let mut lines = vec![Line::new(indent, tone, title)];

    let mut stats = Vec::new();
    let changed = files_summary(&info.changed);
    if !changed.is_empty() {
        stats.push((Tone::Changed, format!("Changed: {changed}")));
    }
    if let Some(outgoing) = outgoing {
        stats.push((Tone::Unpushed, format!("Outgoing: {outgoing}")));
    }
    let untracked = files_summary(&info.untracked);
    if !untracked.is_empty() {
        stats.push((Tone::Untracked, format!("Untracked: {untracked}")));
    }
    if info.stashes > 0 {
        stats.push((Tone::Untracked, format!("Stashes: {}", info.stashes)));
    }

    if stats.is_empty() {
        return lines;
    }

    let stats_line = Line::joined(indent + 2, stats);
    if stats_line.plain().trim_start().chars().count() <= STATS_WIDTH {
        lines.push(stats_line);
    } else {
        lines.extend(
            stats_line
                .segments
                .into_iter()
                .map(|(tone, text)| Line::new(indent + 2, tone, text)),
        );
    }
    lines
}

pub fn workspace_title(title: &str) -> Line {
    Line::new(0, Tone::Title, format!(":: {title} ++"))
}

/// Garbage entries: inline when there is one, listed otherwise
pub fn garbage_lines(garbage: &[String], indent: usize) -> Vec<Line> {
    match garbage {
        [] => Vec::new(),
        [only] => vec![Line::new(indent, Tone::Untracked, format!("GARBAGE: {only}"))],
        many => std::iter::once(Line::new(indent, Tone::Untracked, "GARBAGE:"))
            .chain(
                many.iter()
                    .map(|name| Line::new(indent + 2, Tone::Untracked, name.as_str())),
            )
            .collect(),
    }
}

/// Project names grouped by status on a single line, led by the refresh
/// indicator if any
pub fn status_line(groups: &[(ProjectStatus, Vec<String>)], indicator: Option<&str>) -> Line {
    let mut segments = Vec::new();
    if let Some(indicator) = indicator {
        segments.push((Tone::Unknown, indicator.to_string()));
    }
    segments.extend(
        groups
            .iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(status, names)| (Tone::from(*status), names.join(" "))),
    );
    Line::joined(0, segments)
}

/// Formats and prints an error message with consistent styling
///
/// # Format
/// ```text
/// ✕ Error: <message>
/// ```
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✕ Error:".red(), message);
}

pub fn print_warning(message: &str) {
    println!("{}", message.yellow());
}

/// Formats and prints a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
