//! REST-backed sources keyed on `student_id`.
//!
//! Both sources fail soft: a missing `student_id` or a transport error comes
//! back as labelled text instead of an `Err`. Without a configured endpoint
//! the source answers locally with the id and the query.

use async_trait::async_trait;
use finaid_core::error::SourceError;
use finaid_core::source::{Metadata, SourceAdapter, metadata_string};
use std::time::Duration;
use tracing::{debug, warn};

pub struct RestSource {
    name: &'static str,
    label: &'static str,
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl RestSource {
    pub fn new(
        name: &'static str,
        label: &'static str,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(source = name, error = %e, "HTTP client builder failed, using defaults");
                reqwest::Client::new()
            });

        Self {
            name,
            label,
            endpoint,
            client,
        }
    }

    /// Student record service (`GET {endpoint}?student_id=...`).
    pub fn student_record_api(endpoint: Option<String>, timeout: Duration) -> Self {
        Self::new("student_record_api", "StudentRecord API", endpoint, timeout)
    }

    /// Available financial aid service (`GET {endpoint}?student_id=...`).
    pub fn available_aid_api(endpoint: Option<String>, timeout: Duration) -> Self {
        Self::new("available_aid_api", "AvailableAid API", endpoint, timeout)
    }

    async fn fetch(&self, endpoint: &str, student_id: &str) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .get(endpoint)
            .query(&[("student_id", student_id)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(source = self.name, %status, "REST source returned non-success status");
        }
        Ok(body)
    }
}

#[async_trait]
impl SourceAdapter for RestSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn retrieve(&self, query: &str, metadata: Option<&Metadata>) -> Result<String, SourceError> {
        let Some(student_id) = metadata_string(metadata, "student_id") else {
            return Ok(format!("[{}] No student_id provided", self.label));
        };

        let Some(endpoint) = self.endpoint.as_deref() else {
            return Ok(format!("[{}] {} {}", self.label, student_id, query));
        };

        match self.fetch(endpoint, &student_id).await {
            Ok(body) => Ok(format!("[{}] {}", self.label, body)),
            Err(e) => {
                warn!(source = self.name, error = %e, "REST source request failed");
                Ok(format!("[{} Error] {}", self.label, e))
            }
        }
    }
}
