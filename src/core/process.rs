//! Blocking subprocess helpers for VCS commands.
//!
//! Every inspection step runs one command in the repository's working
//! directory and collects its output in full. Only [`run_with_timeout`]
//! bounds the runtime; everything else is assumed local and fast.

use crate::core::error::{JerjerrodError, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Render a command for logs and error messages
pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `program args...` in `cwd` and return stdout, failing on a nonzero exit
pub fn command_output(program: &str, args: &[&str], cwd: &Path) -> Result<Vec<u8>> {
    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(cwd).stdin(Stdio::null());
    let label = describe(&cmd);
    log::debug!("Running '{label}' in {}", cwd.display());

    let output = cmd
        .output()
        .map_err(|e| JerjerrodError::command_spawn_failed(&label, e))?;

    if !output.status.success() {
        return Err(JerjerrodError::command_failed(
            label,
            output.status,
            &output.stderr,
        ));
    }

    Ok(output.stdout)
}

/// Non-empty, right-trimmed output lines of a command
pub fn command_lines(program: &str, args: &[&str], cwd: &Path) -> Result<Vec<String>> {
    let stdout = command_output(program, args, cwd)?;
    Ok(output_lines(&String::from_utf8(stdout)?))
}

pub fn output_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run `cmd` to completion, or kill it once `timeout` has elapsed.
///
/// Returns `Ok(None)` on timeout. Stdout and stderr are drained on background
/// threads so a chatty child can't block on a full pipe.
pub fn run_with_timeout(mut cmd: Command, timeout: Duration) -> Result<Option<Output>> {
    let label = describe(&cmd);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    log::debug!("Running '{label}' with a {timeout:?} timeout");

    let mut child = cmd
        .spawn()
        .map_err(|e| JerjerrodError::command_spawn_failed(&label, e))?;
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            log::debug!("'{label}' timed out, killing it");
            if let Err(e) = child.kill() {
                log::debug!("Failed to kill '{label}': {e}");
            }
            // reap; the reader threads are left to finish on their own
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(Some(Output {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    }))
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = reader.read_to_end(&mut buf) {
            log::debug!("Failed reading child output: {e}");
        }
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}
