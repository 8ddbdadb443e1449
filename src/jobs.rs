//! Bounded registry of background jobs.

use crate::error::ShellError;
use std::io;
use std::process::{Child, ExitStatus};

/// One tracked background process.
///
/// Owns the [`Child`] handle; the pid stays tracked until the process has
/// been reaped through that handle, so a recycled pid can never be
/// confused with a live job.
#[derive(Debug)]
pub struct Job {
    pid: u32,
    command_line: String,
    child: Child,
}

impl Job {
    pub fn new(child: Child, command_line: String) -> Self {
        Self {
            pid: child.id(),
            command_line,
            child,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Blocking reap.
    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait()
    }

    /// Non-blocking reap; `Ok(None)` while the process is still running.
    pub fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Kill and reap the process. Test cleanup only; live jobs are
    /// terminated through the signal-forwarding path.
    #[cfg(test)]
    pub(crate) fn terminate(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Bounded index -> job mapping with O(1) swap-with-last removal.
///
/// Indices are ephemeral: removing any entry may relocate the last entry
/// into the vacated slot, so callers must re-resolve after every removal
/// and never cache an index across calls.
#[derive(Debug)]
pub struct JobTable {
    jobs: Vec<Job>,
    capacity: usize,
}

impl JobTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Track a new background job, returning its (ephemeral) index.
    pub fn register(&mut self, job: Job) -> Result<usize, ShellError> {
        if self.jobs.len() >= self.capacity {
            return Err(ShellError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.jobs.push(job);
        Ok(self.jobs.len() - 1)
    }

    /// Remove and return the job at `index` via swap-with-last.
    pub fn remove(&mut self, index: usize) -> Result<Job, ShellError> {
        if index >= self.jobs.len() {
            return Err(ShellError::IndexOutOfRange {
                index,
                count: self.jobs.len(),
            });
        }
        Ok(self.jobs.swap_remove(index))
    }

    pub fn resolve(&self, index: usize) -> Result<&Job, ShellError> {
        self.jobs.get(index).ok_or(ShellError::IndexOutOfRange {
            index,
            count: self.jobs.len(),
        })
    }

    pub fn count(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Job)> {
        self.jobs.iter().enumerate()
    }

    /// Sweep the table without blocking, dropping every job whose process
    /// has already terminated. Returns `(pid, command line)` only for jobs
    /// that actually exited, so the caller can announce them as done.
    pub fn reap_finished(&mut self) -> Vec<(u32, String)> {
        let mut finished = Vec::new();
        let mut i = 0;
        while i < self.jobs.len() {
            match self.jobs[i].try_wait() {
                Ok(Some(_)) => {
                    let job = self.jobs.swap_remove(i);
                    log::debug!("reaped background pid {}", job.pid);
                    finished.push((job.pid, job.command_line));
                }
                Ok(None) => i += 1,
                Err(e) => {
                    // Can't wait on it; drop it from tracking rather than
                    // retry it forever. Reported as dropped, never as done.
                    let job = self.jobs.swap_remove(i);
                    log::warn!("dropping untraceable job pid {}: {}", job.pid, e);
                    eprintln!("myshell: job [{}] untraceable, dropped: {e}", job.pid);
                }
            }
        }
        finished
    }
}
