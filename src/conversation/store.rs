//! Conversation state, its reducer, and the shared store around it.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use serde::Serialize;

use super::turn::{AssistantContent, Turn, TurnId};
use crate::engine::SubmitError;
use crate::research::Resource;

/// Where a conversation is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No turns, not loading.
    Empty,
    /// A request is in flight.
    Submitting,
    /// Turns exist, nothing in flight.
    Displaying,
}

/// Immutable snapshot of one conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationState {
    turns: Vec<Arc<Turn>>,
    is_loading: bool,
    sources_panel_open: bool,
    selected_resources: Vec<Resource>,
}

/// A single state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Append a user turn with the next id.
    AppendUserTurn(String),
    /// Append an assistant turn with the next id.
    AppendAssistantTurn(AssistantContent),
    SetLoading(bool),
    /// Flip the sources panel.
    ToggleSources,
    /// Force the sources panel shut.
    CloseSources,
    /// Replace the "current sources" slot.
    SelectResources(Vec<Resource>),
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Arc<Turn>] {
        &self.turns
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn sources_panel_open(&self) -> bool {
        self.sources_panel_open
    }

    /// Resources of the most recent successful assistant turn.
    pub fn selected_resources(&self) -> &[Resource] {
        &self.selected_resources
    }

    /// The sources panel is drawn only when open and there is something in it.
    pub fn sources_visible(&self) -> bool {
        self.sources_panel_open && !self.selected_resources.is_empty()
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Submitting
        } else if self.turns.is_empty() {
            Phase::Empty
        } else {
            Phase::Displaying
        }
    }

    pub fn last_turn(&self) -> Option<&Arc<Turn>> {
        self.turns.last()
    }

    /// Apply `action`, returning the next state. `self` is left untouched.
    #[must_use]
    pub fn reduce(&self, action: Action) -> Self {
        let mut next = self.clone();
        match action {
            Action::AppendUserTurn(text) => {
                let id = self.next_turn_id();
                next.turns.push(Arc::new(Turn::user(id, text)));
            }
            Action::AppendAssistantTurn(content) => {
                let id = self.next_turn_id();
                next.turns.push(Arc::new(Turn::assistant(id, content)));
            }
            Action::SetLoading(loading) => next.is_loading = loading,
            Action::ToggleSources => next.sources_panel_open = !self.sources_panel_open,
            Action::CloseSources => next.sources_panel_open = false,
            Action::SelectResources(resources) => next.selected_resources = resources,
        }
        next
    }

    fn next_turn_id(&self) -> TurnId {
        self.turns.last().map_or(1, |turn| turn.id() + 1)
    }
}

/// Shared handle to one conversation's current state.
///
/// Readers take cheap snapshots; every write goes through
/// [`ConversationState::reduce`] under the lock, so a snapshot is never
/// observed half-applied.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    inner: Arc<RwLock<Arc<ConversationState>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn snapshot(&self) -> Arc<ConversationState> {
        Arc::clone(&self.inner.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Flip the sources panel. The only mutation open to readers.
    pub fn toggle_sources(&self) -> Arc<ConversationState> {
        self.dispatch(Action::ToggleSources)
    }

    pub(crate) fn dispatch(&self, action: Action) -> Arc<ConversationState> {
        let mut guard = self.write();
        let next = Arc::new(guard.reduce(action));
        *guard = Arc::clone(&next);
        next
    }

    /// Open a submission: user turn, loading on, panel shut. Rejected while
    /// another submission is in flight.
    pub(crate) fn begin_submission(
        &self,
        prompt: &str,
    ) -> Result<Arc<ConversationState>, SubmitError> {
        let mut guard = self.write();
        if guard.is_loading() {
            return Err(SubmitError::Busy);
        }
        let next = Arc::new(
            guard
                .reduce(Action::AppendUserTurn(prompt.to_string()))
                .reduce(Action::SetLoading(true))
                .reduce(Action::CloseSources),
        );
        *guard = Arc::clone(&next);
        Ok(next)
    }

    /// Close a submission with its assistant turn.
    ///
    /// Failures leave the current sources selection alone.
    pub(crate) fn settle_submission(&self, content: AssistantContent) -> Arc<ConversationState> {
        let mut guard = self.write();
        let selection = (!content.is_failure()).then(|| content.resources().to_vec());

        let mut next = guard.reduce(Action::AppendAssistantTurn(content));
        if let Some(resources) = selection {
            next = next.reduce(Action::SelectResources(resources));
        }
        let next = Arc::new(next.reduce(Action::SetLoading(false)));
        *guard = Arc::clone(&next);
        next
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<ConversationState>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
