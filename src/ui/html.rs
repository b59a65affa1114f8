//! HTML fragments swapped in by HTMX.
//!
//! Every function here takes already-rendered view data and returns markup;
//! nothing reads raw API responses or mutates state.

use crate::conversation::{ConversationState, Phase, Turn};
use crate::session::Session;

use super::sources::SourcesPanel;
use super::view::{DocumentCard, RenderedContent, Snippet, TurnView};

/// Escape text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The `#conversation` region: turns, loading indicator and sources panel.
pub fn conversation(session: &Session, state: &ConversationState) -> String {
    let mut html = String::from(r#"<section id="conversation" class="conversation">"#);

    if state.phase() == Phase::Empty {
        html.push_str(&format!(
            r#"<div class="empty-state"><h1>{}</h1></div>"#,
            escape(session.screen().title())
        ));
    }

    for turn in state.turns() {
        html.push_str(&turn_html(session, turn));
    }

    if state.is_loading() {
        html.push_str(
            r#"<div class="turn assistant loading" aria-busy="true"><span class="spinner"></span></div>"#,
        );
    }

    html.push_str(&sources_panel(session.id(), state));
    html.push_str("</section>");
    html
}

/// The `#sources-panel` region. Empty placeholder when hidden so HTMX always
/// has a target to swap.
pub fn sources_panel(session_id: &str, state: &ConversationState) -> String {
    let panel = SourcesPanel::from_state(state);
    if !panel.is_visible() {
        return r#"<aside id="sources-panel" hidden></aside>"#.to_string();
    }

    let mut html = format!(
        r##"<aside id="sources-panel" class="sources-panel"><header><h2>Sources</h2><button type="button" class="close" hx-post="/conversations/{id}/sources" hx-target="#sources-panel" hx-swap="outerHTML" aria-label="Close sources">&times;</button></header>"##,
        id = escape(session_id)
    );
    for item in &panel.items {
        html.push_str(&format!(
            r#"<div class="source"><div class="source-label">{label}</div><div class="source-snippet">{snippet}</div><a href="{link}" target="_blank" rel="noopener noreferrer">View source</a></div>"#,
            label = escape(&item.label),
            snippet = escape(&item.snippet),
            link = escape(&item.link),
        ));
    }
    html.push_str("</aside>");
    html
}

fn turn_html(session: &Session, turn: &Turn) -> String {
    match session.engine().render(turn) {
        TurnView::User { text } => format!(
            r#"<div class="turn user" data-turn-id="{}"><div class="bubble">{}</div></div>"#,
            turn.id(),
            escape(&text)
        ),
        TurnView::Assistant { content } => {
            let mut html = format!(
                r#"<div class="turn assistant" data-turn-id="{}">{}"#,
                turn.id(),
                rendered_content(&content)
            );
            let count = turn.resources().len();
            if count > 0 {
                html.push_str(&format!(
                    r##"<div class="turn-actions"><button type="button" class="sources-toggle" hx-post="/conversations/{id}/sources" hx-target="#sources-panel" hx-swap="outerHTML">Sources ({count})</button></div>"##,
                    id = escape(session.id()),
                ));
            }
            html.push_str("</div>");
            html
        }
    }
}

/// Cards for one assistant response, or the explicit empty-state message.
pub fn rendered_content(content: &RenderedContent) -> String {
    let mut html = String::from(r#"<div class="results">"#);
    if let Some(message) = content.empty_message() {
        html.push_str(&format!(
            r#"<div class="results-empty">{}</div>"#,
            escape(message)
        ));
    } else {
        if let Some(heading) = &content.heading {
            html.push_str(&format!(
                r#"<div class="results-heading">{}</div>"#,
                escape(heading)
            ));
        }
        for card in &content.cards {
            html.push_str(&card_html(card));
        }
    }
    html.push_str("</div>");
    html
}

fn card_html(card: &DocumentCard) -> String {
    let link = escape(&card.link);
    let mut html = format!(
        r#"<article class="card"><div class="card-header"><a class="card-title" href="{link}" target="_blank" rel="noopener noreferrer">{}</a>"#,
        escape(&card.title)
    );
    if let Some(published) = &card.published {
        html.push_str(&format!(
            r#"<span class="card-date">{}</span>"#,
            escape(published)
        ));
    }
    html.push_str("</div>");

    let mut meta = String::new();
    if let Some(source) = &card.source_label {
        meta.push_str(&format!(r#"<span class="source">{}</span>"#, escape(source)));
    }
    if let Some(author) = &card.author {
        meta.push_str(&format!(r#"<span class="author">{}</span>"#, escape(author)));
    }
    if let Some(cites) = card.cites {
        meta.push_str(&format!(r#"<span class="cites">Citations: {cites}</span>"#));
    }
    if let Some(cited_by) = card.cited_by {
        meta.push_str(&format!(
            r#"<span class="cited-by">Cited by: {cited_by}</span>"#
        ));
    }
    if !meta.is_empty() {
        html.push_str(&format!(r#"<div class="card-meta">{meta}</div>"#));
    }

    html.push_str(r#"<div class="card-body">"#);
    if !card.snippet.is_empty() {
        let label = card
            .snippet_label
            .map(|l| format!("<strong>{}:</strong> ", escape(l)))
            .unwrap_or_default();
        html.push_str(&format!(
            r#"<p class="snippet">{label}{}</p>"#,
            snippet_html(&card.snippet)
        ));
    }
    for detail in &card.details {
        html.push_str(&format!(
            r#"<p><strong>{}:</strong> {}</p>"#,
            escape(detail.label),
            escape(&detail.text)
        ));
    }
    html.push_str("</div>");

    html.push_str(&format!(
        r#"<a class="card-link" href="{link}" target="_blank" rel="noopener noreferrer">View full document</a></article>"#
    ));
    html
}

/// Snippet text with emphasized runs wrapped in `<mark>`.
pub fn snippet_html(snippet: &Snippet) -> String {
    snippet
        .segments()
        .iter()
        .map(|segment| {
            if segment.emphasized {
                format!(r#"<mark class="hl">{}</mark>"#, escape(&segment.text))
            } else {
                escape(&segment.text)
            }
        })
        .collect()
}
