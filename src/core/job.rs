use std::fmt;

use nix::{sys::wait::WaitStatus, unistd::Pid};

/// How a child process finished.
///
/// The `Display` form is what the shell prints for `status` and for
/// background completion notices, e.g. `exit value 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The process exited normally with this exit code.
    Exited(i32),
    /// The process was killed by this signal number.
    Signaled(i32),
}

impl Termination {
    /// Extracts the termination from a `waitpid` result. Returns `None` for
    /// statuses that do not mean the child is gone (stopped, continued, ...).
    pub fn from_wait_status(wait_status: WaitStatus) -> Option<(Pid, Termination)> {
        match wait_status {
            WaitStatus::Exited(pid, code) => Some((pid, Termination::Exited(code))),
            WaitStatus::Signaled(pid, signal, _) => {
                Some((pid, Termination::Signaled(signal as i32)))
            }
            _ => None,
        }
    }

}

impl Default for Termination {
    fn default() -> Self {
        Termination::Exited(0)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Termination::Exited(code) => write!(f, "exit value {}", code),
            Termination::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

/// A background process tracked by the shell.
#[derive(Clone, PartialEq, Eq)]
pub struct Job {
    pid: Pid,
    input: String,
}

impl Job {
    pub fn new(pid: Pid, input: &str) -> Self {
        Self {
            pid,
            input: input.to_string(),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid: {}\tinput: {}", self.pid, self.input)
    }
}
