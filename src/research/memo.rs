//! Research memo responses (`legal_info[]`).

use serde::Deserialize;
use serde_json::{Value, json};

use super::projection::{Projection, Resource, TextOrList, parse_shape};
use crate::error::Result;
use crate::ui::view::{CardDetail, DocumentCard, RenderedContent, Snippet};

#[derive(Debug, Deserialize)]
struct MemoEnvelope {
    legal_info: Vec<MemoEntry>,
}

#[derive(Debug, Deserialize)]
struct MemoEntry {
    title: String,
    jurisdiction: String,
    summary: String,
    doc_link: String,
    #[serde(default)]
    key_terms: Option<TextOrList>,
    #[serde(default)]
    implications: Option<TextOrList>,
}

/// Projection for the research memo endpoint.
///
/// `legal_info` is required; an empty list is a valid "no results" answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoProjection;

impl Projection for MemoProjection {
    fn name(&self) -> &'static str {
        "memo"
    }

    fn resources(&self, raw: &Value) -> Result<Vec<Resource>> {
        let memo: MemoEnvelope = parse_shape(raw)?;
        Ok(memo
            .legal_info
            .into_iter()
            .map(|entry| Resource {
                display_title: entry.title,
                source_label: entry.jurisdiction,
                snippet: entry.summary,
                link: entry.doc_link,
            })
            .collect())
    }

    fn render(&self, raw: &Value) -> Result<RenderedContent> {
        let memo: MemoEnvelope = parse_shape(raw)?;
        let cards = memo
            .legal_info
            .into_iter()
            .map(|entry| {
                let mut details = Vec::new();
                if let Some(terms) = entry.key_terms {
                    details.push(CardDetail {
                        label: "Key Terms",
                        text: terms.to_string(),
                    });
                }
                if let Some(implications) = entry.implications {
                    details.push(CardDetail {
                        label: "Implications",
                        text: implications.to_string(),
                    });
                }
                DocumentCard {
                    title: entry.title,
                    link: entry.doc_link,
                    source_label: Some(entry.jurisdiction),
                    snippet_label: Some("Summary"),
                    snippet: Snippet::plain(entry.summary),
                    details,
                    ..DocumentCard::default()
                }
            })
            .collect();

        Ok(RenderedContent::new(Some("Results:".to_string()), cards))
    }

    fn error_document(&self, message: &str) -> Value {
        json!({
            "legal_info": [{
                "title": "Error",
                "summary": message,
                "jurisdiction": "System Error",
                "implications": "Please try your query again.",
                "doc_link": "#",
            }]
        })
    }
}
