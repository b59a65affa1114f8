//! Plain-text rendering for the terminal client.
//!
//! Emphasized snippet runs are wrapped in `**` so highlights survive without
//! ANSI support.

use super::sources::SourcesPanel;
use super::view::{DocumentCard, RenderedContent, Snippet, TurnView};

/// Render one turn as terminal text.
pub fn turn(view: &TurnView) -> String {
    match view {
        TurnView::User { text } => format!("> {text}\n"),
        TurnView::Assistant { content } => rendered_content(content),
    }
}

pub fn rendered_content(content: &RenderedContent) -> String {
    if let Some(message) = content.empty_message() {
        return format!("{message}\n");
    }

    let mut out = String::new();
    if let Some(heading) = &content.heading {
        out.push_str(heading);
        out.push_str("\n\n");
    }
    for (index, card) in content.cards.iter().enumerate() {
        out.push_str(&card_text(index + 1, card));
        out.push('\n');
    }
    out
}

fn card_text(number: usize, card: &DocumentCard) -> String {
    let mut out = format!("{number}. {}", card.title);
    if let Some(published) = &card.published {
        out.push_str(&format!(" ({published})"));
    }
    out.push('\n');

    let meta: Vec<String> = [
        card.source_label.clone(),
        card.author.clone(),
        card.cites.map(|n| format!("Citations: {n}")),
        card.cited_by.map(|n| format!("Cited by: {n}")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !meta.is_empty() {
        out.push_str(&format!("   {}\n", meta.join(" | ")));
    }

    if !card.snippet.is_empty() {
        match card.snippet_label {
            Some(label) => out.push_str(&format!("   {label}: {}\n", snippet(&card.snippet))),
            None => out.push_str(&format!("   {}\n", snippet(&card.snippet))),
        }
    }
    for detail in &card.details {
        out.push_str(&format!("   {}: {}\n", detail.label, detail.text));
    }
    out.push_str(&format!("   {}\n", card.link));
    out
}

/// Snippet with emphasized runs wrapped in `**`.
pub fn snippet(snippet: &Snippet) -> String {
    snippet
        .segments()
        .iter()
        .map(|segment| {
            if segment.emphasized {
                format!("**{}**", segment.text)
            } else {
                segment.text.clone()
            }
        })
        .collect()
}

/// Sources listing, regardless of whether the panel is open.
pub fn sources(panel: &SourcesPanel) -> String {
    if panel.items.is_empty() {
        return String::new();
    }
    let mut out = format!("Sources ({})\n", panel.items.len());
    for item in &panel.items {
        out.push_str(&format!("- {}: {}\n  {}\n", item.label, item.title, item.link));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::sources::SourceItem;
    use crate::ui::view::NO_RESULTS;

    #[test]
    fn test_user_turn() {
        assert_eq!(turn(&TurnView::User { text: "hi".into() }), "> hi\n");
    }

    #[test]
    fn test_card_lines() {
        let content = RenderedContent::new(
            Some("Found: 1".into()),
            vec![DocumentCard {
                title: "Foo v Bar".into(),
                link: "https://indiankanoon.org/doc/7/".into(),
                source_label: Some("Supreme Court of India".into()),
                cited_by: Some(2),
                snippet: Snippet::from_markup("the <b>rule</b>"),
                ..DocumentCard::default()
            }],
        );
        let text = rendered_content(&content);
        assert!(text.starts_with("Found: 1\n\n1. Foo v Bar\n"));
        assert!(text.contains("Supreme Court of India | Cited by: 2"));
        assert!(text.contains("the **rule**"));
        assert!(text.contains("https://indiankanoon.org/doc/7/"));
    }

    #[test]
    fn test_empty_content() {
        let content = RenderedContent::new(Some("Results:".into()), vec![]);
        assert_eq!(rendered_content(&content), format!("{NO_RESULTS}\n"));
    }

    #[test]
    fn test_sources_listing() {
        let panel = SourcesPanel {
            open: false,
            items: vec![SourceItem {
                label: "India".into(),
                title: "Memo".into(),
                snippet: "s".into(),
                link: "https://example.test/memo".into(),
            }],
        };
        assert_eq!(
            sources(&panel),
            "Sources (1)\n- India: Memo\n  https://example.test/memo\n"
        );
        assert_eq!(sources(&SourcesPanel { open: true, items: vec![] }), "");
    }
}
