use application::search_service::SearchService;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use domain::chart::ChartStyle;
use domain::models::{SearchQuery, SearchResponse};
use serde_json::json;
use shared::types::Result;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

const PAGE_TEMPLATE: &str = include_str!("../assets/index.html");
const SCRIPT: &str = include_str!("../assets/main.js");
const STYLE_PLACEHOLDER: &str = "{{CHART_STYLE}}";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0:#}")]
    Search(#[from] anyhow::Error),
    #[error("search task failed: {0}")]
    Join(#[from] JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "search request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    service: Arc<SearchService>,
    page: Arc<String>,
}

/// The search page with the chart style embedded as JSON.
pub fn render_page(style: &ChartStyle) -> Result<String> {
    let style = serde_json::to_string(style)?.replace("</", "<\\/");
    Ok(PAGE_TEMPLATE.replace(STYLE_PLACEHOLDER, &style))
}

pub fn router(service: Arc<SearchService>) -> Result<Router> {
    let state = AppState {
        service,
        page: Arc::new(render_page(&ChartStyle::default())?),
    };
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    Ok(Router::new()
        .route("/", get(index))
        .route("/static/main.js", get(script))
        .route("/search", post(search))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

/// Serve until ctrl-c.
pub async fn serve(service: Arc<SearchService>, bind_addr: &str) -> Result<()> {
    let app = router(service)?;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "search service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("search service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.as_str().to_owned())
}

async fn script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], SCRIPT)
}

async fn search(
    State(state): State<AppState>,
    Form(query): Form<SearchQuery>,
) -> std::result::Result<Json<SearchResponse>, ApiError> {
    let service = state.service.clone();
    let task = tokio::task::spawn_blocking(move || service.search(&query.query));
    let response = task.await??;
    Ok(Json(response))
}
