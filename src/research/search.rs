//! Document search responses (`response.docs[]`).

use serde::Deserialize;
use serde_json::{Value, json};

use super::projection::{Projection, Resource, Scalar, parse_shape};
use crate::error::Result;
use crate::ui::view::{
    DocumentCard, RenderedContent, Snippet, format_publish_date, positive_count, strip_emphasis,
};

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    response: Option<SearchBody>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    docs: Option<Vec<SearchDoc>>,
    #[serde(default)]
    found: Option<Scalar>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    title: String,
    /// HTML with `<b>` around matched terms.
    headline: String,
    #[serde(default)]
    docsource: Option<String>,
    #[serde(default)]
    tid: Option<Scalar>,
    #[serde(default)]
    publishdate: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    numcites: Option<i64>,
    #[serde(default)]
    numcitedby: Option<i64>,
}

impl SearchEnvelope {
    fn into_parts(self) -> (Vec<SearchDoc>, Option<Scalar>) {
        match self.response {
            Some(body) => (body.docs.unwrap_or_default(), body.found),
            None => (Vec::new(), None),
        }
    }
}

/// Projection for the document search endpoint.
///
/// A missing `response` or `docs` reads as zero hits; a doc without `title`
/// or `headline` is a shape error.
#[derive(Debug, Clone)]
pub struct SearchProjection {
    doc_base_url: String,
}

impl SearchProjection {
    /// `doc_base_url` is the site documents are linked on, e.g.
    /// `https://indiankanoon.org`.
    pub fn new(doc_base_url: impl Into<String>) -> Self {
        Self {
            doc_base_url: doc_base_url.into(),
        }
    }

    /// `<doc-base-url>/doc/{tid}/`, or `#` for docs without an id.
    fn link(&self, tid: Option<&Scalar>) -> String {
        match tid {
            Some(tid) => format!("{}/doc/{tid}/", self.doc_base_url.trim_end_matches('/')),
            None => "#".to_string(),
        }
    }

    fn parse(raw: &Value) -> Result<(Vec<SearchDoc>, Option<Scalar>)> {
        Ok(parse_shape::<SearchEnvelope>(raw)?.into_parts())
    }
}

impl Projection for SearchProjection {
    fn name(&self) -> &'static str {
        "search"
    }

    fn resources(&self, raw: &Value) -> Result<Vec<Resource>> {
        let (docs, _) = Self::parse(raw)?;
        Ok(docs
            .into_iter()
            .map(|doc| Resource {
                link: self.link(doc.tid.as_ref()),
                snippet: strip_emphasis(&doc.headline),
                source_label: doc.docsource.unwrap_or_default(),
                display_title: doc.title,
            })
            .collect())
    }

    fn render(&self, raw: &Value) -> Result<RenderedContent> {
        let (docs, found) = Self::parse(raw)?;
        let found = found.map_or_else(|| "0".to_string(), |f| f.to_string());

        let cards = docs
            .into_iter()
            .map(|doc| DocumentCard {
                link: self.link(doc.tid.as_ref()),
                source_label: doc.docsource.filter(|s| !s.is_empty()),
                published: doc.publishdate.as_deref().map(format_publish_date),
                author: doc.author.filter(|s| !s.is_empty()),
                cites: positive_count(doc.numcites),
                cited_by: positive_count(doc.numcitedby),
                snippet: Snippet::from_markup(&doc.headline),
                title: doc.title,
                ..DocumentCard::default()
            })
            .collect();

        Ok(RenderedContent::new(Some(format!("Found: {found}")), cards))
    }

    fn error_document(&self, message: &str) -> Value {
        json!({
            "response": {
                "docs": [{
                    "title": "Error",
                    "publishdate": chrono::Utc::now().to_rfc3339(),
                    "author": "System",
                    "headline": message,
                    "docsource": "Error",
                }],
                "found": "0",
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn projection() -> SearchProjection {
        SearchProjection::new("https://indiankanoon.org/")
    }

    fn sample() -> Value {
        json!({
            "response": {
                "docs": [
                    {
                        "title": "Foo v Bar",
                        "docsource": "Supreme Court of India",
                        "headline": "what is <b>consideration</b> in <b>contract</b> law",
                        "tid": "12345",
                        "publishdate": "2019-03-12",
                        "author": "J. Doe",
                        "numcites": 4,
                        "numcitedby": 0,
                        "citation": "AIR 2019 SC 1"
                    },
                    {
                        "title": "Baz v Qux",
                        "docsource": "Bombay High Court",
                        "headline": "no emphasis",
                        "tid": 678
                    }
                ],
                "found": "2"
            }
        })
    }

    #[test]
    fn test_resources_link_and_strip() {
        let resources = projection().resources(&sample()).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].display_title, "Foo v Bar");
        assert_eq!(resources[0].source_label, "Supreme Court of India");
        assert_eq!(resources[0].snippet, "what is consideration in contract law");
        assert_eq!(resources[0].link, "https://indiankanoon.org/doc/12345/");
        assert!(resources[1].link.ends_with("/doc/678/"));
    }

    #[test]
    fn test_render_keeps_highlights_and_counts() {
        let content = projection().render(&sample()).unwrap();
        assert_eq!(content.heading.as_deref(), Some("Found: 2"));

        let card = &content.cards[0];
        assert_eq!(card.published.as_deref(), Some("March 12, 2019"));
        assert_eq!(card.author.as_deref(), Some("J. Doe"));
        assert_eq!(card.cites, Some(4));
        assert_eq!(card.cited_by, None);
        assert_eq!(
            card.snippet
                .segments()
                .iter()
                .filter(|s| s.emphasized)
                .count(),
            2
        );
    }

    #[test]
    fn test_missing_docs_is_empty() {
        let raw = json!({ "response": { "found": "0" } });
        assert!(projection().resources(&raw).unwrap().is_empty());
        assert!(projection().render(&raw).unwrap().is_empty());
        assert!(projection().resources(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_doc_without_headline_is_shape_error() {
        let raw = json!({ "response": { "docs": [{ "title": "Foo", "tid": "1" }] } });
        assert!(matches!(
            projection().resources(&raw),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn test_error_document_renders_error_card() {
        let p = projection();
        let raw = p.error_document("Error: boom. Please try again.");
        assert_eq!(p.resources(&raw).unwrap()[0].link, "#");

        let content = p.render(&raw).unwrap();
        assert_eq!(content.cards[0].title, "Error");
        assert_eq!(
            content.cards[0].snippet.plain_text(),
            "Error: boom. Please try again."
        );
    }

    #[test]
    fn test_projection_is_deterministic() {
        let p = projection();
        let raw = sample();
        assert_eq!(p.resources(&raw).unwrap(), p.resources(&raw).unwrap());
    }
}
