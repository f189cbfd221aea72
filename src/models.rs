use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Interview,
    Declined,
    Accepted,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Pending,
        JobStatus::Interview,
        JobStatus::Declined,
        JobStatus::Accepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Interview => "interview",
            JobStatus::Declined => "declined",
            JobStatus::Accepted => "accepted",
        }
    }

    pub fn parse(name: &str) -> Result<JobStatus> {
        match name {
            "pending" => Ok(JobStatus::Pending),
            "interview" => Ok(JobStatus::Interview),
            "declined" => Ok(JobStatus::Declined),
            "accepted" => Ok(JobStatus::Accepted),
            _ => Err(anyhow!(
                "Unknown status '{}'. Available: pending, interview, declined, accepted",
                name
            )),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Internship,
    Remote,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Internship,
        JobType::Remote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Internship => "internship",
            JobType::Remote => "remote",
        }
    }

    pub fn parse(name: &str) -> Result<JobType> {
        match name {
            "full-time" => Ok(JobType::FullTime),
            "part-time" => Ok(JobType::PartTime),
            "internship" => Ok(JobType::Internship),
            "remote" => Ok(JobType::Remote),
            _ => Err(anyhow!(
                "Unknown job type '{}'. Available: full-time, part-time, internship, remote",
                name
            )),
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked application. The id is assigned by the remote store and never
/// changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: String,
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub job_type: JobType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<DateTime<Utc>>,
}

/// Form-staging representation of a Job: everything but the id, with the
/// interview date reduced to a plain calendar day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub company: String,
    pub position: String,
    pub status: JobStatus,
    pub job_type: JobType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<NaiveDate>,
}

impl JobDraft {
    pub fn from_job(job: &Job) -> Self {
        Self {
            company: job.company.clone(),
            position: job.position.clone(),
            status: job.status,
            job_type: job.job_type,
            interview_date: job.interview_date.map(|d| d.date_naive()),
        }
    }
}

/// Whether a draft creates a new job or replaces an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftMode {
    Creating,
    Editing(String),
}

/// Per-status counts as reported by the backend. Treated as an opaque
/// snapshot, never derived from the local collection.
pub type StatsSummary = BTreeMap<String, u64>;
