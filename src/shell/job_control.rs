//! Bookkeeping for background jobs.
//!
//! Every background child is registered in the `JobTable` when it starts.
//! Once per pass through the read loop the table is asked to collect any
//! children that have terminated, report them, and forget them.

use std::fmt;
use std::io::{self, Write};

use failure::{Fail, ResultExt};
use nix::{
    errno::Errno,
    sys::{
        signal::{self, Signal},
        wait::{self, WaitPidFlag, WaitStatus},
    },
    unistd::Pid,
};

use crate::core::job::{Job, Termination};
use crate::errors::{Error, ErrorKind, Result};

/// Default number of background jobs tracked at once.
pub const DEFAULT_JOB_CAPACITY: usize = 256;

pub struct JobTable {
    jobs: Vec<Job>,
    capacity: usize,
}

impl JobTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            jobs: Vec::new(),
            capacity,
        }
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.find_job(pid).is_some()
    }

    /// Starts tracking a background job.
    ///
    /// Registering a pid that is already tracked is a no-op. Fails with
    /// `ErrorKind::JobTableFull` once `capacity` jobs are tracked.
    pub fn insert(&mut self, job: Job) -> Result<()> {
        if self.contains(job.pid()) {
            warn!("job with pid {} is already tracked", job.pid());
            return Ok(());
        }
        if self.jobs.len() >= self.capacity {
            return Err(Error::job_table_full(self.capacity));
        }

        debug!("tracking job: {:?}", job);
        self.jobs.push(job);
        Ok(())
    }

    /// Stops tracking `pid`, returning its job if it was tracked.
    pub fn remove(&mut self, pid: Pid) -> Option<Job> {
        self.find_job(pid).map(|index| self.jobs.remove(index))
    }

    /// Reports and forgets every background child that has terminated,
    /// without blocking.
    pub fn do_job_notification(&mut self) {
        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        let temp_result = self.notify_terminated(poll_terminated_child, &mut stdout);
        log_if_err!(temp_result, "do_job_notification");
    }

    /// Drains `poll` until it reports no more terminated children, writing a
    /// completion notice for each one.
    ///
    /// Children that are not tracked (e.g. because the table was full when
    /// they started) are reported all the same.
    pub fn notify_terminated<F>(&mut self, mut poll: F, stdout: &mut dyn Write) -> Result<()>
    where
        F: FnMut() -> Result<Option<(Pid, Termination)>>,
    {
        while let Some((pid, termination)) = poll()? {
            match self.remove(pid) {
                Some(job) => info!("job {} finished ({}): {}", pid, termination, job.input()),
                None => debug!("untracked child {} finished ({})", pid, termination),
            }

            writeln!(stdout, "background pid {} is done: {}", pid, termination)
                .context(ErrorKind::Io)?;
            stdout.flush().context(ErrorKind::Io)?;
        }

        Ok(())
    }

    /// Kills and reaps every tracked job. Used when the shell exits.
    pub fn kill_all(&mut self) {
        for job in self.jobs.drain(..) {
            debug!("killing job {}: {}", job.pid(), job.input());
            let temp_result = signal::kill(job.pid(), Signal::SIGKILL);
            log_if_err!(temp_result, "failed to kill pid ({})", job.pid());
            if temp_result.is_ok() {
                let temp_result = wait_for_pid(job.pid());
                log_if_err!(temp_result, "failed to reap pid ({})", job.pid());
            }
        }
    }

    fn find_job(&self, pid: Pid) -> Option<usize> {
        self.jobs.iter().position(|job| job.pid() == pid)
    }
}

impl Default for JobTable {
    fn default() -> Self {
        JobTable::with_capacity(DEFAULT_JOB_CAPACITY)
    }
}

impl fmt::Debug for JobTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} jobs\tcapacity: {}", self.jobs.len(), self.capacity)?;
        for job in &self.jobs {
            writeln!(f, "{:?}", job)?;
        }

        Ok(())
    }
}

/// Collects one terminated child, if any, without blocking.
///
/// Returns `Ok(None)` when every child is still running or there are no
/// children at all.
pub fn poll_terminated_child() -> Result<Option<(Pid, Termination)>> {
    loop {
        match wait::waitpid(None, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => return Ok(None),
            Ok(wait_status) => {
                if let Some(terminated) = Termination::from_wait_status(wait_status) {
                    return Ok(Some(terminated));
                }
                debug!("ignoring wait status: {:?}", wait_status);
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.context(ErrorKind::Nix).into()),
        }
    }
}

/// Blocks until `pid` terminates.
pub fn wait_for_pid(pid: Pid) -> Result<Termination> {
    loop {
        match wait::waitpid(pid, None) {
            Ok(wait_status) => {
                if let Some((_, termination)) = Termination::from_wait_status(wait_status) {
                    return Ok(termination);
                }
                debug!("ignoring wait status: {:?}", wait_status);
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.context(ErrorKind::Nix).into()),
        }
    }
}
