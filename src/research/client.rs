//! HTTP client for the research API.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::ResearchBackend;
use crate::error::{Error, Result};

/// Body of every research request.
#[derive(Debug, Serialize)]
struct ResearchRequest<'a> {
    user_prompt: &'a str,
}

/// [`ResearchBackend`] that POSTs prompts to one endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use legal_research_chat::research::{HttpResearchClient, ResearchBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpResearchClient::new("http://localhost:8000/legal/research/")?;
/// let body = client.query("what is consideration in contract law").await?;
/// println!("{body}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpResearchClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpResearchClient {
    /// Create a client for `endpoint` with a fresh connection pool.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self> {
        Ok(Self::with_client(
            Url::parse(endpoint.as_ref())?,
            reqwest::Client::new(),
        ))
    }

    /// Create a client sharing an existing `reqwest` pool.
    pub fn with_client(endpoint: Url, http: reqwest::Client) -> Self {
        Self { endpoint, http }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ResearchBackend for HttpResearchClient {
    async fn query(&self, prompt: &str) -> Result<Value> {
        info!(
            name: "research.request.sent",
            endpoint = %self.endpoint,
            prompt_len = prompt.len(),
            "Sending research request"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&ResearchRequest {
                user_prompt: prompt,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        debug!(
            name: "research.response.received",
            status = status.as_u16(),
            bytes = bytes.len(),
            "Research response received"
        );
        Ok(serde_json::from_slice(&bytes)?)
    }
}
