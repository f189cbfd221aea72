use anyhow::{Context, Result, anyhow};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::env;

use crate::models::{Job, JobDraft, StatsSummary};
use crate::store::JobBackend;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// HTTP client for the job backend.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
        }
    }

    /// Base URL from JOBTRACK_API_URL, falling back to the default.
    pub fn base_url_from_env() -> String {
        env::var("JOBTRACK_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the session bearer token when one exists. Absence is
    /// tolerated: the request goes out unauthenticated and the backend
    /// rejects it itself.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn check(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            Err(anyhow!(
                "Request failed with status {}: {}",
                status,
                error_message(&body)
            ))
        }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .context("Failed to reach the server")?;
        Self::check(response)?
            .json()
            .context("Failed to parse login response")
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&body)
            .send()
            .context("Failed to reach the server")?;
        Self::check(response)?
            .json()
            .context("Failed to parse register response")
    }
}

/// Backend errors carry a JSON `{"msg": ...}` body. Surface the message when
/// present, the raw body otherwise.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        msg: String,
    }
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.msg)
        .unwrap_or_else(|_| body.to_string())
}

impl JobBackend for ApiClient {
    fn fetch_jobs(&self) -> Result<Vec<Job>> {
        let response = self
            .authorize(self.client.get(self.url("/jobs")))
            .send()
            .context("Failed to reach the server")?;
        Self::check(response)?
            .json()
            .context("Failed to parse job list")
    }

    fn fetch_stats(&self) -> Result<StatsSummary> {
        let response = self
            .authorize(self.client.get(self.url("/jobs/stats")))
            .send()
            .context("Failed to reach the server")?;
        Self::check(response)?
            .json()
            .context("Failed to parse job stats")
    }

    fn create_job(&self, draft: &JobDraft) -> Result<Job> {
        let response = self
            .authorize(self.client.post(self.url("/jobs")))
            .json(draft)
            .send()
            .context("Failed to reach the server")?;
        Self::check(response)?
            .json()
            .context("Failed to parse created job")
    }

    fn update_job(&self, id: &str, draft: &JobDraft) -> Result<Job> {
        let response = self
            .authorize(self.client.put(self.url(&format!("/jobs/{id}"))))
            .json(draft)
            .send()
            .context("Failed to reach the server")?;
        Self::check(response)?
            .json()
            .context("Failed to parse updated job")
    }

    fn delete_job(&self, id: &str) -> Result<()> {
        let response = self
            .authorize(self.client.delete(self.url(&format!("/jobs/{id}"))))
            .send()
            .context("Failed to reach the server")?;
        Self::check(response)?;
        Ok(())
    }
}
