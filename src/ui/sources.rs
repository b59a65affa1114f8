//! Sources panel view.

use serde::Serialize;

use crate::conversation::ConversationState;

/// What the sources panel shows for a conversation snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcesPanel {
    pub open: bool,
    pub items: Vec<SourceItem>,
}

/// One row of the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceItem {
    pub label: String,
    pub title: String,
    pub snippet: String,
    pub link: String,
}

impl SourcesPanel {
    pub fn from_state(state: &ConversationState) -> Self {
        Self {
            open: state.sources_panel_open(),
            items: state
                .selected_resources()
                .iter()
                .map(|r| SourceItem {
                    label: r.source_label.clone(),
                    title: r.display_title.clone(),
                    snippet: r.snippet.clone(),
                    link: r.link.clone(),
                })
                .collect(),
        }
    }

    /// Drawn only when open and non-empty.
    pub fn is_visible(&self) -> bool {
        self.open && !self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Action;
    use crate::research::Resource;

    fn with_resources(n: usize) -> ConversationState {
        let resources = (0..n)
            .map(|i| Resource {
                display_title: format!("Doc {i}"),
                source_label: "Delhi High Court".into(),
                snippet: "held that".into(),
                link: format!("https://example.test/doc/{i}/"),
            })
            .collect();
        ConversationState::new().reduce(Action::SelectResources(resources))
    }

    #[test]
    fn test_hidden_until_toggled() {
        let state = with_resources(2);
        assert!(!SourcesPanel::from_state(&state).is_visible());

        let panel = SourcesPanel::from_state(&state.reduce(Action::ToggleSources));
        assert!(panel.is_visible());
        assert_eq!(panel.items.len(), 2);
        assert_eq!(panel.items[1].link, "https://example.test/doc/1/");
    }

    #[test]
    fn test_open_but_empty_is_hidden() {
        let state = with_resources(0).reduce(Action::ToggleSources);
        let panel = SourcesPanel::from_state(&state);
        assert!(panel.open);
        assert!(!panel.is_visible());
    }
}
