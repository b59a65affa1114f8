//! Display model for conversation turns.
//!
//! [`render`] is the pure projection from a turn's content to something a
//! surface (HTML page, terminal) can draw. Surfaces never look at raw API
//! responses themselves.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::conversation::TurnContent;
use crate::research::Projection;

/// Shown instead of an empty card list.
pub const NO_RESULTS: &str = "No results found.";

/// `<b>…</b>` spans the search API uses to mark matched terms.
static EMPHASIS_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<b>(.*?)</b>").expect("valid emphasis regex"));

static EMPHASIS_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?b>").expect("valid emphasis tag regex"));

/// Rendered form of one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnView {
    /// The user's prompt, verbatim.
    User { text: String },
    /// Result cards for an assistant turn.
    Assistant { content: RenderedContent },
}

/// Cards for one assistant response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderedContent {
    /// Line above the cards, e.g. `Found: 12` or `Results:`.
    pub heading: Option<String>,
    /// One card per document.
    pub cards: Vec<DocumentCard>,
}

impl RenderedContent {
    pub fn new(heading: Option<String>, cards: Vec<DocumentCard>) -> Self {
        Self { heading, cards }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The explicit empty-state message, when there is nothing to list.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.cards.is_empty().then_some(NO_RESULTS)
    }
}

/// One document in a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentCard {
    pub title: String,
    pub link: String,
    pub source_label: Option<String>,
    /// Already formatted for display.
    pub published: Option<String>,
    pub author: Option<String>,
    /// Only set when the API reported a positive count.
    pub cites: Option<u64>,
    /// Only set when the API reported a positive count.
    pub cited_by: Option<u64>,
    /// Label printed before the snippet, if any.
    pub snippet_label: Option<&'static str>,
    pub snippet: Snippet,
    /// Extra labelled paragraphs (key terms, implications).
    pub details: Vec<CardDetail>,
}

/// A labelled paragraph on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardDetail {
    pub label: &'static str,
    pub text: String,
}

/// Snippet text split into plain and emphasized runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snippet {
    segments: Vec<Segment>,
}

/// A run of snippet text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub emphasized: bool,
}

impl Snippet {
    /// Snippet without any emphasis.
    pub fn plain(text: impl Into<String>) -> Self {
        let mut snippet = Self::default();
        snippet.push(text.into(), false);
        snippet
    }

    /// Parse `<b>…</b>` markup into emphasized runs.
    ///
    /// Unbalanced tags are dropped, so [`plain_text`](Self::plain_text) always
    /// equals [`strip_emphasis`] of the same input.
    pub fn from_markup(markup: &str) -> Self {
        let mut snippet = Self::default();
        let mut last = 0;

        for caps in EMPHASIS_SPAN.captures_iter(markup) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            snippet.push(strip_emphasis(&markup[last..whole.start()]), false);
            snippet.push(strip_emphasis(inner.as_str()), true);
            last = whole.end();
        }
        snippet.push(strip_emphasis(&markup[last..]), false);
        snippet
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenated text without emphasis.
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    fn push(&mut self, text: String, emphasized: bool) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(prev) if prev.emphasized == emphasized => prev.text.push_str(&text),
            _ => self.segments.push(Segment { text, emphasized }),
        }
    }
}

/// Remove `<b>` and `</b>` tags, keeping their text.
pub fn strip_emphasis(markup: &str) -> String {
    EMPHASIS_TAG.replace_all(markup, "").into_owned()
}

/// Render a turn's content with the projection of the screen it belongs to.
///
/// Never mutates the turn and never touches the network.
pub fn render(content: &TurnContent, projection: &dyn Projection) -> TurnView {
    match content {
        TurnContent::Text { text } => TurnView::User { text: text.clone() },
        TurnContent::Response(response) => {
            let content = projection.render(response.raw()).unwrap_or_else(|err| {
                tracing::warn!(
                    name: "render.projection.failed",
                    projection = projection.name(),
                    error = %err,
                    "Stored response no longer matches its projection"
                );
                projection
                    .render(&projection.error_document(&err.user_message()))
                    .unwrap_or_default()
            });
            TurnView::Assistant { content }
        }
    }
}

/// Format an API date (`2019-03-12` or RFC 3339) as `March 12, 2019`.
///
/// Unrecognized input is returned unchanged.
pub fn format_publish_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()));

    match date {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

/// Keep a count only when it is present and positive.
pub(crate) fn positive_count(count: Option<i64>) -> Option<u64> {
    count
        .and_then(|n| u64::try_from(n).ok())
        .filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_splits_emphasis_runs() {
        let snippet = Snippet::from_markup("the <b>doctrine</b> of <b>consideration</b>.");
        let runs: Vec<(&str, bool)> = snippet
            .segments()
            .iter()
            .map(|s| (s.text.as_str(), s.emphasized))
            .collect();
        assert_eq!(
            runs,
            vec![
                ("the ", false),
                ("doctrine", true),
                (" of ", false),
                ("consideration", true),
                (".", false),
            ]
        );
    }

    #[test]
    fn test_plain_text_matches_strip() {
        let inputs = [
            "no markup at all",
            "<b>lead</b> and tail",
            "unclosed <b>tag here",
            "stray </b> close",
            "<b><b>nested</b></b>",
            "",
        ];
        for input in inputs {
            assert_eq!(
                Snippet::from_markup(input).plain_text(),
                strip_emphasis(input),
                "input: {input:?}"
            );
        }
    }

    #[test]
    fn test_adjacent_runs_merge() {
        let snippet = Snippet::from_markup("<b>a</b><b>b</b>");
        assert_eq!(snippet.segments().len(), 1);
        assert_eq!(snippet.plain_text(), "ab");
    }

    #[test]
    fn test_publish_date_formats() {
        assert_eq!(format_publish_date("2019-03-12"), "March 12, 2019");
        assert_eq!(
            format_publish_date("2024-01-05T10:00:00+00:00"),
            "January 5, 2024"
        );
        assert_eq!(format_publish_date("sometime"), "sometime");
    }

    #[test]
    fn test_positive_count() {
        assert_eq!(positive_count(Some(3)), Some(3));
        assert_eq!(positive_count(Some(0)), None);
        assert_eq!(positive_count(Some(-1)), None);
        assert_eq!(positive_count(None), None);
    }

    #[test]
    fn test_empty_message_only_without_cards() {
        assert_eq!(RenderedContent::default().empty_message(), Some(NO_RESULTS));
        let content = RenderedContent::new(None, vec![DocumentCard::default()]);
        assert_eq!(content.empty_message(), None);
    }
}
