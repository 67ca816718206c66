//! Client for the external text-generation service that writes student summaries.
//!
//! The service is treated as a black box: one `POST {endpoint}/generate` per request with the
//! model name and a prompt, answered by a JSON object carrying a `summary` string. There is no
//! retry and no caching; a failure is reported to the caller as-is.

use crate::config::{Config, get_config};
use crate::store::Student;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced while requesting a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// HTTP client could not be built.
    #[error("Failed to build summary HTTP client: {0}")]
    Client(String),
    /// Service could not be reached or the request timed out.
    #[error("Summary service unavailable: {0}")]
    Unavailable(String),
    /// Service answered with a non-success status code.
    #[error("Summary service returned {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the service.
        status: reqwest::StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },
    /// Response body was not a JSON object with a `summary` string.
    #[error("Malformed summary response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by summary providers.
#[async_trait]
pub trait SummaryClient: Send + Sync {
    /// Produce a natural-language summary of the given student.
    async fn summarize(&self, student: &Student) -> Result<String, SummaryError>;
}

/// Build the prompt sent to the generation service for a student.
pub fn build_prompt(student: &Student) -> String {
    format!(
        "Provide a brief summary of the following student. Name: {}. Age: {}. Email: {}.",
        student.name, student.age, student.email
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    summary: String,
}

/// Summary client backed by a plain HTTP JSON API.
pub struct HttpSummaryClient {
    http: Client,
    base_url: String,
    model: String,
}

impl HttpSummaryClient {
    /// Construct a client targeting `base_url` with the given model and optional timeout.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, SummaryError> {
        let mut builder = Client::builder().user_agent("student-registry/summary");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|error| SummaryError::Client(error.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// Construct a client from runtime configuration.
    pub fn from_config(config: &Config) -> Result<Self, SummaryError> {
        Self::new(
            config.summary_endpoint.clone(),
            config.summary_model.clone(),
            config.summary_timeout_secs.map(Duration::from_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SummaryClient for HttpSummaryClient {
    async fn summarize(&self, student: &Student) -> Result<String, SummaryError> {
        let prompt = build_prompt(student);
        tracing::debug!(id = student.id, model = %self.model, "Requesting student summary");

        let response = self
            .http
            .post(self.endpoint())
            .json(&GenerateRequest {
                model: &self.model,
                prompt: &prompt,
            })
            .send()
            .await
            .map_err(|error| {
                SummaryError::Unavailable(format!("failed to reach {}: {error}", self.endpoint()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummaryError::UnexpectedStatus { status, body });
        }

        let body: GenerateResponse = response.json().await.map_err(|error| {
            SummaryError::InvalidResponse(format!("failed to decode summary response: {error}"))
        })?;

        Ok(body.summary)
    }
}

/// Build the summary client described by the global configuration.
pub fn get_summary_client() -> Result<HttpSummaryClient, SummaryError> {
    HttpSummaryClient::from_config(get_config())
}
