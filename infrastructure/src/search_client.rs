use anyhow::{anyhow, Context};
use domain::models::{SearchQuery, SearchResponse};
use reqwest::{Client, Request};
use serde::Deserialize;
use shared::types::Result;
use std::sync::Arc;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for a running search service's `POST /search`.
#[derive(Clone)]
pub struct SearchClient {
    client: Arc<Client>,
    base_url: String,
}

impl SearchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }

    /// The request `search` sends: the query as a URL-encoded form body.
    pub fn build_request(&self, query: &SearchQuery) -> Result<Request> {
        self.client
            .post(self.search_url())
            .form(query)
            .build()
            .context("failed to build search request")
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let request = self.build_request(query)?;
        let url = request.url().clone();
        let response = self
            .client
            .execute(request)
            .await
            .with_context(|| format!("could not reach {url}"))?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let reason = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(anyhow!("search endpoint returned {status}: {reason}"));
        }
        serde_json::from_str(&text).context("invalid search response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    fn body_of(request: &Request) -> String {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn body_url_encodes_the_exact_query() {
        let client = SearchClient::new("http://localhost:5000/");
        let request = client
            .build_request(&SearchQuery::new("space & rockets = 100%"))
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost:5000/search");
        assert_eq!(
            request.headers()[reqwest::header::CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        assert_eq!(body_of(&request), "query=space+%26+rockets+%3D+100%25");
    }

    #[test]
    fn empty_query_is_still_sent() {
        let client = SearchClient::new("http://localhost:5000");
        let request = client.build_request(&SearchQuery::new("")).unwrap();
        assert_eq!(body_of(&request), "query=");
    }

    #[tokio::test]
    async fn decodes_a_valid_response() {
        let app = Router::new().route(
            "/search",
            post(|| async {
                Json(json!({"documents": ["a"], "indices": [4], "similarities": [0.5]}))
            }),
        );
        let client = SearchClient::new(serve(app).await);
        let response = client.search(&SearchQuery::new("x")).await.unwrap();
        assert_eq!(response.indices(), &[4]);
    }

    #[tokio::test]
    async fn rejects_mismatched_payload() {
        let app = Router::new().route(
            "/search",
            post(|| async {
                Json(json!({"documents": ["a"], "indices": [], "similarities": [0.5]}))
            }),
        );
        let client = SearchClient::new(serve(app).await);
        let err = client.search(&SearchQuery::new("x")).await.unwrap_err();
        assert!(format!("{err:#}").contains("differ in length"), "{err:#}");
    }

    #[tokio::test]
    async fn surfaces_server_error_message() {
        let app = Router::new().route(
            "/search",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "index not ready"})),
                )
            }),
        );
        let client = SearchClient::new(serve(app).await);
        let err = client.search(&SearchQuery::new("x")).await.unwrap_err();
        assert!(err.to_string().contains("index not ready"), "{err}");
    }
}
