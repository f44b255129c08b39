use crate::chart::ChartCanvas;
use crate::results::ResultsPanel;
use domain::models::SearchQuery;
use infrastructure::search_client::SearchClient;
use shared::telemetry::Telemetry;

/// What a submission left on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Number of result entries rendered.
    Rendered(usize),
    /// The message shown in place of results.
    Failed(String),
}

/// Terminal search form: sends the query, then feeds the decoded payload to
/// the results panel and the chart, in that order.
pub struct SearchForm {
    client: SearchClient,
    results: ResultsPanel,
    chart: ChartCanvas,
}

impl SearchForm {
    pub fn new(client: SearchClient) -> Self {
        Self::with_views(client, ResultsPanel::new(), ChartCanvas::default())
    }

    pub fn with_views(client: SearchClient, results: ResultsPanel, chart: ChartCanvas) -> Self {
        Self {
            client,
            results,
            chart,
        }
    }

    pub async fn submit(&mut self, query: &str) -> SubmitOutcome {
        let telemetry = Telemetry::new();
        match self.client.search(&SearchQuery::new(query)).await {
            Ok(response) => {
                self.results.show(&response);
                self.chart.draw(&response);
                tracing::debug!(
                    results = response.len(),
                    elapsed_ms = telemetry.elapsed_ms(),
                    "search rendered"
                );
                SubmitOutcome::Rendered(response.len())
            }
            Err(e) => {
                let message = format!("Search failed: {e:#}");
                tracing::warn!(error = %format!("{e:#}"), "search request failed");
                self.results.show_error(message.clone());
                self.chart.destroy();
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Results followed by the chart, if one is drawn.
    pub fn render(&self, styled: bool) -> String {
        let mut out = self.results.render(styled);
        let chart = self.chart.render(styled);
        if !chart.is_empty() {
            out.push('\n');
            out.push_str(&chart);
        }
        out
    }

    pub fn results(&self) -> &ResultsPanel {
        &self.results
    }

    pub fn chart(&self) -> &ChartCanvas {
        &self.chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Form, Json, Router};
    use serde_json::{json, Value};

    async fn echo_server() -> String {
        // Ranks two fixed documents; echoes the query into the first one.
        let app = Router::new().route(
            "/search",
            post(|Form(q): Form<SearchQuery>| async move {
                Json::<Value>(json!({
                    "documents": [format!("about {}", q.query), "other"],
                    "indices": [7, 2],
                    "similarities": [0.75, 0.25],
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn dead_endpoint() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn renders_results_then_chart() {
        let mut form = SearchForm::new(SearchClient::new(echo_server().await));
        assert_eq!(form.submit("rockets").await, SubmitOutcome::Rendered(2));

        let entries = form.results().entries();
        assert_eq!(entries[0].document, "about rockets");
        assert_eq!(entries[0].index, 7);
        assert_eq!(form.chart().current().unwrap().labels, vec!["7", "2"]);

        let text = form.render(false);
        assert!(text.starts_with("Results\n"));
        let results_at = text.find("Document 7").unwrap();
        let chart_at = text.find("Cosine Similarities").unwrap();
        assert!(results_at < chart_at);
    }

    #[tokio::test]
    async fn resubmitting_replaces_the_chart() {
        let mut form = SearchForm::new(SearchClient::new(echo_server().await));
        form.submit("first").await;
        form.submit("second").await;
        assert_eq!(form.chart().charts_created(), 2);
        assert_eq!(form.results().entries()[0].document, "about second");
    }

    #[tokio::test]
    async fn unreachable_endpoint_shows_a_message() {
        let mut form = SearchForm::new(SearchClient::new(echo_server().await));
        form.submit("first").await;

        form.client = SearchClient::new(dead_endpoint().await);
        let SubmitOutcome::Failed(message) = form.submit("again").await else {
            panic!("expected a failure");
        };
        assert!(message.starts_with("Search failed: "));
        assert_eq!(form.results().error(), Some(message.as_str()));
        assert!(form.results().entries().is_empty());
        assert!(form.chart().current().is_none());
        assert!(form.render(false).contains("Search failed: "));
    }
}
