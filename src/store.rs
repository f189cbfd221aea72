use anyhow::{Context, Result};
use chrono::Utc;

use crate::models::{Job, JobDraft, StatsSummary};
use crate::remind::{self, Notifier};

/// Remote job store, consumed through a narrow interface. The HTTP client
/// implements this; tests substitute an in-memory double.
pub trait JobBackend {
    fn fetch_jobs(&self) -> Result<Vec<Job>>;
    fn fetch_stats(&self) -> Result<StatsSummary>;
    fn create_job(&self, draft: &JobDraft) -> Result<Job>;
    fn update_job(&self, id: &str, draft: &JobDraft) -> Result<Job>;
    fn delete_job(&self, id: &str) -> Result<()>;
}

/// Owns the authoritative local job collection and stats snapshot and keeps
/// them synchronized with the backend. Mutations are not applied
/// optimistically: local state only changes after the server confirms, so a
/// failure leaves the last known-good state in place.
pub struct JobStore<B: JobBackend> {
    backend: B,
    jobs: Vec<Job>,
    stats: Option<StatsSummary>,
}

impl<B: JobBackend> JobStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            jobs: Vec::new(),
            stats: None,
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn stats(&self) -> Option<&StatsSummary> {
        self.stats.as_ref()
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    /// Replaces the collection atomically on success; any failure leaves the
    /// previous collection untouched. Every successful fetch re-runs the
    /// reminder sweep, so repeated refreshes inside the reminder window
    /// notify again.
    pub fn refresh_jobs(&mut self, notifier: &dyn Notifier) -> Result<()> {
        let jobs = self.backend.fetch_jobs().context("Failed to load jobs")?;
        let now = Utc::now();
        for job in &jobs {
            remind::check_and_notify(job, now, notifier);
        }
        self.jobs = jobs;
        Ok(())
    }

    /// Independent failure path from `refresh_jobs`.
    pub fn refresh_stats(&mut self) -> Result<()> {
        let stats = self
            .backend
            .fetch_stats()
            .context("Failed to load job stats")?;
        self.stats = Some(stats);
        Ok(())
    }

    pub fn create_job(&mut self, draft: &JobDraft, notifier: &dyn Notifier) -> Result<()> {
        self.backend.create_job(draft)?;
        self.refresh_jobs(notifier)?;
        self.refresh_stats()
    }

    /// Full replacement of the fields of `id`.
    pub fn update_job(&mut self, id: &str, draft: &JobDraft, notifier: &dyn Notifier) -> Result<()> {
        self.backend.update_job(id, draft)?;
        self.refresh_jobs(notifier)?;
        self.refresh_stats()
    }

    /// Destructive-action gate: `confirm` runs before anything touches the
    /// network. A decline returns Ok(false) without any backend call.
    pub fn delete_job(
        &mut self,
        id: &str,
        confirm: impl FnOnce() -> bool,
        notifier: &dyn Notifier,
    ) -> Result<bool> {
        if !confirm() {
            return Ok(false);
        }
        self.backend.delete_job(id)?;
        self.refresh_jobs(notifier)?;
        self.refresh_stats()?;
        Ok(true)
    }
}
