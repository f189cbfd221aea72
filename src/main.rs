mod api;
mod export;
mod filter;
mod models;
mod remind;
mod session;
mod store;
mod suggest;
mod tui;

use anyhow::{Context, Result, anyhow};
use api::ApiClient;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use filter::FilterState;
use models::{Job, JobDraft, JobStatus, JobType};
use remind::TerminalNotifier;
use session::Session;
use std::io::{self, Write};
use std::path::PathBuf;
use store::JobStore;

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Job application tracking - record, filter, export, and get reminded")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard
    Dashboard,

    /// Sign in and persist the session
    Login {
        email: String,
        password: String,
    },

    /// Create an account and sign in
    Register {
        name: String,
        email: String,
        password: String,
    },

    /// Forget the persisted session
    Logout,

    /// List jobs, one page at a time
    List {
        /// Filter by company name substring
        #[arg(short = 'q', long, default_value = "")]
        search: String,

        /// Filter by job type (full-time, part-time, internship, remote)
        #[arg(short = 't', long = "type")]
        job_type: Option<String>,

        /// Filter by status (pending, interview, declined, accepted)
        #[arg(short, long)]
        status: Option<String>,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Add a job application
    Add {
        company: String,
        position: String,

        /// Status (pending, interview, declined, accepted)
        #[arg(short, long, default_value = "pending")]
        status: String,

        /// Job type (full-time, part-time, internship, remote)
        #[arg(short = 't', long = "type", default_value = "full-time")]
        job_type: String,

        /// Interview date (YYYY-MM-DD)
        #[arg(short, long)]
        interview: Option<String>,
    },

    /// Update a job; unspecified fields keep their current values
    Update {
        /// Job ID
        id: String,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        position: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        #[arg(short = 't', long = "type")]
        job_type: Option<String>,

        /// Interview date (YYYY-MM-DD; pass "" to clear it)
        #[arg(short, long)]
        interview: Option<String>,
    },

    /// Delete a job
    Delete {
        /// Job ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show per-status application counts
    Stats,

    /// Show next-step suggestions based on your applications
    Suggest,

    /// Export jobs to CSV or PDF
    Export {
        /// Output format (csv, pdf)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output path (defaults to jobs.csv / job_applications.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Filter by company name substring
        #[arg(short = 'q', long, default_value = "")]
        search: String,

        /// Filter by job type
        #[arg(short = 't', long = "type")]
        job_type: Option<String>,

        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let session = Session::load()?;
    let client = ApiClient::new(&ApiClient::base_url_from_env(), session.token.clone());

    match cli.command {
        Commands::Dashboard => {
            let store = JobStore::new(client);
            tui::run_dashboard(store, session.user_name.clone())?;
        }

        Commands::Login { email, password } => {
            let auth = client.login(&email, &password)?;
            let name = auth.user.name.clone();
            Session {
                token: Some(auth.token),
                user_name: Some(auth.user.name),
            }
            .save()?;
            println!("Logged in as {}", name);
        }

        Commands::Register {
            name,
            email,
            password,
        } => {
            let auth = client.register(&name, &email, &password)?;
            let name = auth.user.name.clone();
            Session {
                token: Some(auth.token),
                user_name: Some(auth.user.name),
            }
            .save()?;
            println!("Registered and logged in as {}", name);
        }

        Commands::Logout => {
            Session::clear()?;
            println!("Logged out.");
        }

        Commands::List {
            search,
            job_type,
            status,
            page,
        } => {
            let state = build_filter(search, job_type, status, page)?;
            let mut store = JobStore::new(client);
            store.refresh_jobs(&TerminalNotifier)?;

            let (jobs, total_pages) = filter::visible_jobs(store.jobs(), &state);
            if jobs.is_empty() {
                println!("No jobs found.");
            } else {
                print_job_table(&jobs);
                println!("\nPage {} of {}", state.page, total_pages);
            }
        }

        Commands::Add {
            company,
            position,
            status,
            job_type,
            interview,
        } => {
            let draft = JobDraft {
                company,
                position,
                status: JobStatus::parse(&status)?,
                job_type: JobType::parse(&job_type)?,
                interview_date: parse_date(interview.as_deref())?,
            };
            let mut store = JobStore::new(client);
            store.create_job(&draft, &TerminalNotifier)?;
            println!("Added {} at {}", draft.position, draft.company);
        }

        Commands::Update {
            id,
            company,
            position,
            status,
            job_type,
            interview,
        } => {
            let mut store = JobStore::new(client);
            store.refresh_jobs(&TerminalNotifier)?;

            let draft = {
                let job = store
                    .job(&id)
                    .ok_or_else(|| anyhow!("Job {} not found", id))?;
                let mut draft = JobDraft::from_job(job);
                if let Some(company) = company {
                    draft.company = company;
                }
                if let Some(position) = position {
                    draft.position = position;
                }
                if let Some(status) = status {
                    draft.status = JobStatus::parse(&status)?;
                }
                if let Some(job_type) = job_type {
                    draft.job_type = JobType::parse(&job_type)?;
                }
                draft.interview_date =
                    updated_interview(draft.interview_date, interview.as_deref())?;
                draft
            };
            store.update_job(&id, &draft, &TerminalNotifier)?;
            println!("Updated job {}", id);
        }

        Commands::Delete { id, yes } => {
            let mut store = JobStore::new(client);
            let deleted = store.delete_job(&id, || yes || confirm_delete(), &TerminalNotifier)?;
            if deleted {
                println!("Deleted job {}", id);
            } else {
                println!("Aborted.");
            }
        }

        Commands::Stats => {
            let mut store = JobStore::new(client);
            store.refresh_stats()?;

            println!("{:<12} {:>6}", "STATUS", "COUNT");
            println!("{}", "-".repeat(19));
            for status in JobStatus::ALL {
                let count = store
                    .stats()
                    .and_then(|stats| stats.get(status.as_str()).copied())
                    .unwrap_or(0);
                println!("{:<12} {:>6}", status, count);
            }
        }

        Commands::Suggest => {
            let mut store = JobStore::new(client);
            store.refresh_jobs(&TerminalNotifier)?;
            let all: Vec<&Job> = store.jobs().iter().collect();
            for (i, tip) in suggest::suggestions(&all).iter().enumerate() {
                println!("{}. {}", i + 1, textwrap::fill(tip, 76));
            }
        }

        Commands::Export {
            format,
            output,
            search,
            job_type,
            status,
        } => {
            let state = build_filter(search, job_type, status, 1)?;
            let mut store = JobStore::new(client);
            store.refresh_jobs(&TerminalNotifier)?;

            let jobs = filter::filtered_jobs(store.jobs(), &state);
            let (bytes, default_name) = match format.as_str() {
                "csv" => (export::to_csv(&jobs)?, export::CSV_FILENAME),
                "pdf" => (export::to_pdf(&jobs)?, export::REPORT_FILENAME),
                other => return Err(anyhow!("Unknown format '{}'. Available: csv, pdf", other)),
            };
            let path = output.unwrap_or_else(|| PathBuf::from(default_name));
            std::fs::write(&path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported {} jobs to {}", jobs.len(), path.display());
        }
    }

    Ok(())
}

fn build_filter(
    search: String,
    job_type: Option<String>,
    status: Option<String>,
    page: usize,
) -> Result<FilterState> {
    Ok(FilterState {
        search,
        job_type: job_type.as_deref().map(JobType::parse).transpose()?,
        status: status.as_deref().map(JobStatus::parse).transpose()?,
        page: page.max(1),
    })
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
    })
    .transpose()
}

/// Absent means keep the current date; an empty string clears it.
fn updated_interview(current: Option<NaiveDate>, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw {
        None => Ok(current),
        Some("") => Ok(None),
        Some(date) => parse_date(Some(date)),
    }
}

fn print_job_table(jobs: &[&Job]) {
    println!(
        "{:<26} {:<11} {:<20} {:<22} {:<12} {:<12}",
        "ID", "STATUS", "COMPANY", "POSITION", "TYPE", "INTERVIEW"
    );
    println!("{}", "-".repeat(106));
    for job in jobs {
        let date = job
            .interview_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<26} {:<11} {:<20} {:<22} {:<12} {:<12}",
            job.id,
            job.status,
            truncate(&job.company, 18),
            truncate(&job.position, 20),
            job.job_type,
            date
        );
    }
}

fn confirm_delete() -> bool {
    print!("Are you sure you want to delete this job? [y/N] ");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    answer.trim().eq_ignore_ascii_case("y")
}

// Counts chars, not bytes, so multibyte names never split mid-character.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_cuts_on_char_boundaries() {
        assert_eq!(truncate("Acme", 10), "Acme");
        assert_eq!(truncate("Ingenieurbüro Müller AG", 10), "Ingenie...");
    }

    #[test]
    fn test_updated_interview_keeps_sets_and_clears() {
        let current = NaiveDate::from_ymd_opt(2026, 9, 1);

        assert_eq!(updated_interview(current, None).unwrap(), current);
        assert_eq!(
            updated_interview(current, Some("2026-10-15")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 15)
        );
        assert_eq!(updated_interview(current, Some("")).unwrap(), None);
        assert!(updated_interview(current, Some("next week")).is_err());
    }
}
