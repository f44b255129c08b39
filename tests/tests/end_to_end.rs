use application::search_service::SearchService;
use infrastructure::search_client::SearchClient;
use presentation::server::router;
use presentation::submit::{SearchForm, SubmitOutcome};
use std::sync::Arc;
use tests::Fixture;

async fn start(fixture: &Fixture, top_k: usize) -> String {
    let mut service = SearchService::new(&fixture.config(top_k).unwrap()).unwrap();
    service.build_index(false).unwrap();
    let app = router(Arc::new(service)).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn terminal_form_renders_server_results() {
    let fixture = Fixture::new().unwrap();
    let mut form = SearchForm::new(SearchClient::new(start(&fixture, 3).await));

    let outcome = form.submit("rocket orbit").await;
    assert_eq!(outcome, SubmitOutcome::Rendered(3));
    let entries = form.results().entries();
    assert!(entries.iter().all(|e| (3..6).contains(&e.index)));

    let chart = form.chart().current().unwrap();
    let labels: Vec<String> = entries.iter().map(|e| e.index.to_string()).collect();
    assert_eq!(chart.labels, labels);

    let text = form.render(false);
    assert!(text.starts_with("Results\n"));
    assert!(text.contains("Cosine Similarities"));
    assert!(text.contains("Document Index"));
}

#[tokio::test]
async fn query_text_survives_form_encoding() {
    let fixture = Fixture::new().unwrap();
    let mut form = SearchForm::new(SearchClient::new(start(&fixture, 2).await));

    // punctuation and symbols must not break the field or leak into others
    assert_eq!(
        form.submit("hockey & goalie = 100% win?").await,
        SubmitOutcome::Rendered(2)
    );
    assert!(form.results().entries().iter().all(|e| e.index < 3));
}

#[tokio::test]
async fn stopped_server_shows_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut form = SearchForm::new(SearchClient::new(format!("http://{addr}")));
    let outcome = form.submit("rocket").await;
    assert!(matches!(outcome, SubmitOutcome::Failed(ref m) if m.starts_with("Search failed: ")));
    assert!(form.chart().current().is_none());
}
