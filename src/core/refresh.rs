//! Background cache refresh for long-running status displays.
//!
//! A [`RefreshTask`] is one child process (normally
//! `jerjerrod names-by-status CHANGED`, which inspects every project and
//! writes the results to the cache). [`RefreshMonitor`] keeps at most one
//! task alive, restarts it at most once per interval, and remembers a failed
//! run until it is reset.

use crate::core::{
    error::{JerjerrodError, Result},
    process::describe,
};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Minimum time between two successful refreshes
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub const RUNNING_INDICATOR: &str = "***";
pub const FAILED_INDICATOR: &str = "!!!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug)]
pub struct RefreshTask {
    label: String,
    child: Child,
    cancel: Arc<AtomicBool>,
    state: RefreshState,
}

impl RefreshTask {
    /// Start `cmd` with its output discarded
    pub fn spawn(mut cmd: Command) -> Result<Self> {
        let label = describe(&cmd);
        let child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| JerjerrodError::command_spawn_failed(&label, e))?;

        log::debug!("Started background refresh: {label}");
        Ok(Self {
            label,
            child,
            cancel: Arc::new(AtomicBool::new(false)),
            state: RefreshState::Running,
        })
    }

    pub fn cancel(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.poll();
    }

    pub fn poll(&mut self) -> RefreshState {
        if self.state != RefreshState::Running {
            return self.state;
        }

        if self.cancel.load(Ordering::Relaxed) {
            log::debug!("Cancelling {}", self.label);
            self.kill();
            self.state = RefreshState::Failed;
            return self.state;
        }

        self.state = match self.child.try_wait() {
            Ok(None) => RefreshState::Running,
            Ok(Some(status)) if status.success() => RefreshState::Succeeded,
            Ok(Some(status)) => {
                log::error!("Background refresh '{}' failed with {status}", self.label);
                RefreshState::Failed
            }
            Err(e) => {
                log::error!("Lost track of background refresh '{}': {e}", self.label);
                RefreshState::Failed
            }
        };
        self.state
    }

    fn kill(&mut self) {
        if let Err(e) = self.child.kill() {
            log::debug!("kill {}: {e}", self.label);
        }
        let _ = self.child.wait();
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        if self.state == RefreshState::Running {
            self.kill();
        }
    }
}

/// Owner of the (single) background refresh
pub struct RefreshMonitor {
    make_command: Box<dyn Fn() -> Command>,
    interval: Duration,
    task: Option<RefreshTask>,
    last_finished: Option<Instant>,
    failed: bool,
}

impl std::fmt::Debug for RefreshMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshMonitor")
            .field("interval", &self.interval)
            .field("task", &self.task)
            .field("last_finished", &self.last_finished)
            .field("failed", &self.failed)
            .finish()
    }
}

impl RefreshMonitor {
    pub fn new<F>(make_command: F) -> Self
    where
        F: Fn() -> Command + 'static,
    {
        Self {
            make_command: Box::new(make_command),
            interval: REFRESH_INTERVAL,
            task: None,
            last_finished: None,
            failed: false,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Reap a finished task, or start a new one when due (or `force`d)
    pub fn tick(&mut self, force: bool) -> Result<()> {
        if let Some(task) = &mut self.task {
            match task.poll() {
                RefreshState::Running => {}
                state => {
                    self.failed = state == RefreshState::Failed;
                    self.last_finished = Some(Instant::now());
                    self.task = None;
                }
            }
            return Ok(());
        }

        if self.failed {
            return Ok(());
        }

        let due = self
            .last_finished
            .map_or(true, |finished| finished.elapsed() >= self.interval);
        if due || force {
            self.task = Some(RefreshTask::spawn((self.make_command)())?);
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Neither running nor failed
    pub fn is_idle(&self) -> bool {
        !self.is_running() && !self.has_failed()
    }

    pub fn indicator(&self) -> Option<&'static str> {
        if self.has_failed() {
            Some(FAILED_INDICATOR)
        } else if self.is_running() {
            Some(RUNNING_INDICATOR)
        } else {
            None
        }
    }

    /// Forget a failure so the next tick may start another task
    pub fn reset(&mut self) {
        self.failed = false;
    }

    pub fn cancel(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }
}
