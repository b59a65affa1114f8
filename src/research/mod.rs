//! Research API access and response projections.
//!
//! Every chat screen talks to one research endpoint and understands one
//! response shape. This module provides the pieces a screen is built from:
//!
//! - [`ResearchBackend`]: the seam for issuing a prompt and getting raw JSON back
//! - [`HttpResearchClient`]: the `reqwest` implementation of that seam
//! - [`Projection`]: strategy turning a raw response into [`Resource`]s and cards
//! - [`SearchProjection`] / [`MemoProjection`]: the two known response shapes
//!
//! [`Screen`] ties an endpoint to its projection so the conversation engine
//! stays shape-agnostic.

pub mod client;
pub mod memo;
pub mod projection;
pub mod search;

pub use client::HttpResearchClient;
pub use memo::MemoProjection;
pub use projection::{Projection, Resource};
pub use search::SearchProjection;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ResearchConfig;
use crate::error::Result;

/// Issues a prompt to a research endpoint and returns the parsed JSON body.
///
/// Implementations must map non-success statuses to
/// [`Error::Status`](crate::error::Error::Status) rather than returning the
/// error body as if it were a result.
#[async_trait::async_trait]
pub trait ResearchBackend: Send + Sync + fmt::Debug {
    /// Send one prompt. No retries.
    async fn query(&self, prompt: &str) -> Result<serde_json::Value>;
}

/// Resolved research endpoints.
#[derive(Debug, Clone)]
pub struct ResearchSettings {
    /// Base URL the endpoint paths are joined onto.
    pub base_url: Url,
    /// Base URL used to build document links for search results.
    pub doc_base_url: String,
    /// Path of the document search endpoint.
    pub search_path: String,
    /// Path of the research memo endpoint.
    pub memo_path: String,
}

impl ResearchSettings {
    /// Validate and resolve the configured URLs.
    pub fn from_config(config: &ResearchConfig) -> Result<Self> {
        let mut base_url = Url::parse(config.base_url.trim())?;
        // Without a trailing slash `join` would replace the last path segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            doc_base_url: config.doc_base_url.trim().to_string(),
            search_path: config.search_path.trim_start_matches('/').to_string(),
            memo_path: config.memo_path.trim_start_matches('/').to_string(),
        })
    }

    /// Full endpoint URL for a screen.
    pub fn endpoint(&self, screen: Screen) -> Result<Url> {
        let path = match screen {
            Screen::Research => &self.memo_path,
            Screen::Draft => &self.search_path,
        };
        Ok(self.base_url.join(path)?)
    }
}

/// A chat screen: one endpoint, one response shape.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    /// Research memo: jurisdiction-tagged summaries.
    Research,
    /// Document search: case law hits with highlighted headlines.
    Draft,
}

impl Screen {
    /// All screens, in navigation order.
    pub const ALL: [Screen; 2] = [Screen::Research, Screen::Draft];

    /// URL path segment.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Draft => "draft",
        }
    }

    /// Parse a URL path segment.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }

    /// Heading shown on the empty screen.
    pub fn title(self) -> &'static str {
        match self {
            Self::Research => "Legal Research Assistant",
            Self::Draft => "Legal Draft Assistant",
        }
    }

    /// Navigation label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Research => "Research",
            Self::Draft => "Auto Draft",
        }
    }

    /// Input placeholder.
    pub fn placeholder(self) -> &'static str {
        "Ask about legal cases..."
    }

    /// Build the projection this screen renders with.
    pub fn projection(self, settings: &ResearchSettings) -> Arc<dyn Projection> {
        match self {
            Self::Research => Arc::new(MemoProjection),
            Self::Draft => Arc::new(SearchProjection::new(settings.doc_base_url.clone())),
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Backend and projection a conversation on some screen is built from.
#[derive(Debug, Clone)]
pub struct ScreenBinding {
    /// Which screen this binding serves.
    pub screen: Screen,
    /// Where prompts go.
    pub backend: Arc<dyn ResearchBackend>,
    /// How responses are read.
    pub projection: Arc<dyn Projection>,
}

impl ScreenBinding {
    /// Bind a screen to the HTTP research API.
    pub fn http(
        screen: Screen,
        settings: &ResearchSettings,
        http: reqwest::Client,
    ) -> Result<Self> {
        let endpoint = settings.endpoint(screen)?;
        Ok(Self {
            screen,
            backend: Arc::new(HttpResearchClient::with_client(endpoint, http)),
            projection: screen.projection(settings),
        })
    }
}
