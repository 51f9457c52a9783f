//! Mercurial inspection via the `hg` command line.
//!
//! `hg outgoing` may contact the default remote, so it runs under a hard
//! timeout and its failures are mapped onto [`Outgoing`] sentinels:
//!
//! | outcome                               | result            |
//! |---------------------------------------|-------------------|
//! | success (changes found)               | `"1+"`            |
//! | exit status 1 / "no changes found"    | `0`               |
//! | timed out                             | `"?"`             |
//! | known unreachable-remote message      | `"-"`             |
//! | anything else                         | error             |
//!
//! Message matching is best-effort; hg's wording varies between versions and
//! locales, so the exit status is consulted first.

use crate::core::{
    error::{JerjerrodError, ParseError, Result},
    info::Outgoing,
    inspector::{memoized, Inspector, StatusLines},
    process::{command_lines, command_output, describe, output_lines, run_with_timeout},
};
use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Allow up to 10 seconds to contact a remote hg server
pub const HG_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

const NO_CHANGES: &str = "no changes found";
const UNREACHABLE_MESSAGES: &[&str] = &[
    "abort: error: nodename nor servname provided, or not known",
    "abort: error: Name or service not known",
    "abort: error: Temporary failure in name resolution",
    "abort: no suitable response from remote hg!",
];

/// Classify `hg status` lines by their one-letter status code
pub fn parse_status(lines: &[String]) -> std::result::Result<StatusLines, ParseError> {
    let mut status = StatusLines::default();

    for line in lines {
        let unexpected = || ParseError::new("hg status", line.as_str());
        let (code, path) = match (line.get(..1), line.get(1..2), line.get(2..)) {
            (Some(code), Some(" "), Some(path)) if !path.is_empty() => (code, path),
            _ => return Err(unexpected()),
        };

        match code {
            "M" | "A" | "D" | "R" | "!" => status.changed.push(path.to_string()),
            "?" => status.untracked.push(path.to_string()),
            _ => return Err(unexpected()),
        }
    }

    Ok(status)
}

/// Map a finished `hg outgoing` run onto an [`Outgoing`] value
pub fn classify_outgoing(
    command: &str,
    status: std::process::ExitStatus,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<Outgoing> {
    if status.success() {
        return Ok(Outgoing::AtLeastOne);
    }

    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(stderr));
    let lines = output_lines(&combined);

    if lines
        .iter()
        .any(|line| UNREACHABLE_MESSAGES.iter().any(|msg| line.contains(msg)))
    {
        return Ok(Outgoing::Unreachable);
    }

    let said_no_changes = lines.last().is_some_and(|line| line.ends_with(NO_CHANGES));
    if status.code() == Some(1) || said_no_changes {
        return Ok(Outgoing::Count(0));
    }

    log::error!("{command} failed:\n{combined}");
    Err(JerjerrodError::CommandFailed {
        command: command.to_string(),
        status: status.to_string(),
        output: combined.trim().to_string(),
    })
}

pub struct HgInspector {
    path: PathBuf,
    program: String,
    leading_args: Vec<String>,
    remote_timeout: Duration,
    status: OnceCell<StatusLines>,
}

impl HgInspector {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            program: "hg".to_string(),
            leading_args: Vec::new(),
            remote_timeout: HG_REMOTE_TIMEOUT,
            status: OnceCell::new(),
        }
    }

    /// Run `program leading_args...` wherever `hg` would be run
    pub fn with_command<I, S>(mut self, program: impl Into<String>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program = program.into();
        self.leading_args = leading_args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    fn args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        self.leading_args
            .iter()
            .map(String::as_str)
            .chain(args.iter().copied())
            .collect()
    }

    fn lines(&self, args: &[&str]) -> Result<Vec<String>> {
        command_lines(&self.program, &self.args(args), &self.path)
    }
}

impl Inspector for HgInspector {
    fn branch(&self) -> Result<Option<String>> {
        let stdout = command_output(&self.program, &self.args(&["branch"]), &self.path)?;
        let branch = String::from_utf8(stdout)?.trim().to_string();
        if branch.is_empty() {
            return Err(ParseError::new("hg branch", "").into());
        }
        Ok(Some(branch))
    }

    fn status_lines(&self) -> Result<&StatusLines> {
        memoized(&self.status, || Ok(parse_status(&self.lines(&["status"])?)?))
    }

    fn stash_count(&self) -> Result<usize> {
        Ok(self.lines(&["shelve", "--list"])?.len())
    }

    fn outgoing(&self) -> Result<Outgoing> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(&["outgoing"])).current_dir(&self.path);
        let label = describe(&cmd);

        match run_with_timeout(cmd, self.remote_timeout)? {
            None => {
                log::debug!("{label} timed out in {}", self.path.display());
                Ok(Outgoing::Unknown)
            }
            Some(output) => {
                classify_outgoing(&label, output.status, &output.stdout, &output.stderr)
            }
        }
    }

    fn outgoing_expensive(&self) -> bool {
        true
    }
}
