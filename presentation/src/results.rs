use colored::{ColoredString, Colorize};
use domain::models::SearchResponse;
use shared::utils::preview;

pub const RESULTS_HEADING: &str = "Results";

#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    pub index: usize,
    pub document: String,
    pub similarity: f64,
}

/// Terminal counterpart of the page's results container: a heading followed
/// by one block per document, or an error message.
#[derive(Debug, Clone, Default)]
pub struct ResultsPanel {
    entries: Vec<ResultEntry>,
    error: Option<String>,
    max_chars: Option<usize>,
}

impl ResultsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cut each document to `max_chars` when rendering.
    pub fn with_preview(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.error = None;
    }

    /// Replace the contents with one entry per hit, in payload order.
    pub fn show(&mut self, response: &SearchResponse) {
        self.clear();
        self.entries.extend(response.hits().map(|hit| ResultEntry {
            index: hit.index,
            document: hit.document.to_string(),
            similarity: hit.similarity,
        }));
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.clear();
        self.error = Some(message.into());
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn render(&self, styled: bool) -> String {
        let mut out = String::new();
        out.push_str(&paint(RESULTS_HEADING, styled, |s| s.bold().underline()));
        out.push('\n');

        if let Some(error) = &self.error {
            out.push_str(&paint(error, styled, |s| s.red()));
            out.push('\n');
            return out;
        }

        for entry in &self.entries {
            let document = match self.max_chars {
                Some(max) => preview(&entry.document, max),
                None => entry.document.clone(),
            };
            let heading = format!("Document {}", entry.index);
            let score = format!("Similarity: {}", entry.similarity);
            out.push('\n');
            out.push_str(&paint(&heading, styled, |s| s.green().bold()));
            out.push('\n');
            out.push_str(document.trim_end());
            out.push_str("\n\n");
            out.push_str(&paint(&score, styled, |s| s.yellow().bold()));
            out.push('\n');
        }
        out
    }
}

fn paint(text: &str, styled: bool, style: fn(ColoredString) -> ColoredString) -> String {
    if styled {
        style(text.normal()).to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_hits() -> SearchResponse {
        SearchResponse::new(vec!["a".into(), "b".into()], vec![0, 1], vec![0.9, 0.1]).unwrap()
    }

    #[test]
    fn shows_one_entry_per_document_in_order() {
        let mut panel = ResultsPanel::new();
        panel.show(&two_hits());
        assert_eq!(
            panel.entries(),
            &[
                ResultEntry {
                    index: 0,
                    document: "a".into(),
                    similarity: 0.9,
                },
                ResultEntry {
                    index: 1,
                    document: "b".into(),
                    similarity: 0.1,
                },
            ]
        );

        let text = panel.render(false);
        let first = text.find("Document 0").unwrap();
        let second = text.find("Document 1").unwrap();
        assert!(first < second);
        assert!(text.contains("Similarity: 0.9"));
        assert!(text.contains("Similarity: 0.1"));
        assert_eq!(text.matches("Document ").count(), 2);
    }

    #[test]
    fn empty_payload_leaves_only_the_heading() {
        let mut panel = ResultsPanel::new();
        panel.show(&two_hits());
        panel.show(&SearchResponse::empty());
        assert!(panel.entries().is_empty());
        assert_eq!(panel.render(false), "Results\n");
    }

    #[test]
    fn error_replaces_previous_results() {
        let mut panel = ResultsPanel::new();
        panel.show(&two_hits());
        panel.show_error("Search failed: connection refused");
        assert!(panel.entries().is_empty());
        assert_eq!(
            panel.render(false),
            "Results\nSearch failed: connection refused\n"
        );
    }

    #[test]
    fn preview_shortens_long_documents() {
        let response = SearchResponse::new(vec!["x".repeat(50)], vec![3], vec![0.5]).unwrap();
        let mut panel = ResultsPanel::new().with_preview(10);
        panel.show(&response);
        let text = panel.render(false);
        assert!(text.contains(&format!("{}...", "x".repeat(10))));
    }
}
