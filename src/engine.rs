//! The query submitter.
//!
//! [`ConversationEngine`] is the only writer of a conversation's turns. It is
//! parameterized by a [`ResearchBackend`] and a [`Projection`], which is all
//! that differs between screens.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::conversation::{AssistantContent, ConversationState, ConversationStore, Turn};
use crate::error::Result;
use crate::research::{Projection, ResearchBackend, ScreenBinding};
use crate::ui::view::{self, TurnView};

/// Why a submission was refused before anything changed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// A request for this conversation is still in flight.
    #[error("a request is already in flight for this conversation")]
    Busy,
}

/// Result of an accepted call to [`ConversationEngine::submit`].
#[derive(Debug, Clone)]
pub enum Submission {
    /// Prompt was blank; nothing happened.
    Ignored,
    /// Request settled; the state ends with the new assistant turn.
    Settled(Arc<ConversationState>),
}

impl Submission {
    pub fn state(&self) -> Option<&Arc<ConversationState>> {
        match self {
            Self::Ignored => None,
            Self::Settled(state) => Some(state),
        }
    }

    /// The assistant turn this submission produced.
    pub fn assistant_turn(&self) -> Option<&Arc<Turn>> {
        self.state().and_then(|state| state.last_turn())
    }
}

/// One conversation bound to a backend and a projection.
#[derive(Debug, Clone)]
pub struct ConversationEngine {
    store: ConversationStore,
    backend: Arc<dyn ResearchBackend>,
    projection: Arc<dyn Projection>,
}

impl ConversationEngine {
    pub fn new(backend: Arc<dyn ResearchBackend>, projection: Arc<dyn Projection>) -> Self {
        Self {
            store: ConversationStore::new(),
            backend,
            projection,
        }
    }

    /// Start a fresh conversation on a screen.
    pub fn for_screen(binding: &ScreenBinding) -> Self {
        Self::new(
            Arc::clone(&binding.backend),
            Arc::clone(&binding.projection),
        )
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    pub fn snapshot(&self) -> Arc<ConversationState> {
        self.store.snapshot()
    }

    pub fn toggle_sources(&self) -> Arc<ConversationState> {
        self.store.toggle_sources()
    }

    /// Render one turn with this conversation's projection.
    pub fn render(&self, turn: &Turn) -> TurnView {
        view::render(turn.content(), self.projection.as_ref())
    }

    /// Submit a prompt.
    ///
    /// A blank prompt is ignored. Otherwise exactly one user turn and, once
    /// the request settles, exactly one assistant turn are appended; request
    /// and projection failures become an error turn instead of an `Err`.
    /// Returns [`SubmitError::Busy`] without touching state if a request is
    /// already in flight.
    #[instrument(skip_all, fields(projection = self.projection.name()))]
    pub async fn submit(&self, prompt: &str) -> std::result::Result<Submission, SubmitError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            debug!("Ignoring blank prompt");
            return Ok(Submission::Ignored);
        }

        self.store.begin_submission(prompt)?;

        let content = match self.fetch(prompt).await {
            Ok(content) => {
                info!(
                    name: "conversation.response.received",
                    resources = content.resources().len(),
                    "Research response projected"
                );
                content
            }
            Err(err) => {
                warn!(
                    name: "conversation.response.failed",
                    error = %err,
                    "Research request failed"
                );
                let message = err.user_message();
                AssistantContent::failed(self.projection.error_document(&message), message)
            }
        };

        Ok(Submission::Settled(self.store.settle_submission(content)))
    }

    async fn fetch(&self, prompt: &str) -> Result<AssistantContent> {
        let raw = self.backend.query(prompt).await?;
        let resources = self.projection.resources(&raw)?;
        Ok(AssistantContent::answered(raw, resources))
    }
}
