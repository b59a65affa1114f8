//! Conversation state.
//!
//! A conversation is an append-only list of turns plus three pieces of view
//! state: whether a request is in flight, whether the sources panel is open,
//! and which resources that panel lists.
//!
//! # Architecture
//!
//! - [`ConversationState`]: immutable snapshot with a pure [`reduce`](ConversationState::reduce)
//! - [`Action`]: the transitions `reduce` understands
//! - [`ConversationStore`]: shared, lock-guarded handle to the latest snapshot
//!
//! # Example
//!
//! ```rust
//! use legal_research_chat::conversation::{Action, ConversationState, Phase};
//!
//! let state = ConversationState::new().reduce(Action::AppendUserTurn("Hello".into()));
//! assert_eq!(state.turns().len(), 1);
//! assert_eq!(state.phase(), Phase::Displaying);
//! ```

mod store;
mod turn;

pub use store::{Action, ConversationState, ConversationStore, Phase};
pub use turn::{AssistantContent, Role, Turn, TurnContent, TurnId};
