use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Stand-in for the news service, bound to an ephemeral local port.
#[derive(Clone, Default)]
pub struct FakeNewsService {
    pub list_status: Arc<Mutex<Option<(StatusCode, String)>>>,
    pub list_body: Arc<Mutex<Value>>,
    pub queries: Arc<Mutex<Vec<Option<String>>>>,
}

impl FakeNewsService {
    pub fn with_items(items: Value) -> Self {
        let service = Self::default();
        *service.list_body.lock().unwrap() = json!({ "items": items });
        service
    }

    pub fn fail_list(&self, status: StatusCode, body: &str) {
        *self.list_status.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn recorded_queries(&self) -> Vec<Option<String>> {
        self.queries.lock().unwrap().clone()
    }

    pub async fn spawn(self) -> String {
        let app = Router::new()
            .route("/articles", get(list_articles))
            .route("/articles/:id", get(get_article))
            .route("/analyses/:id", get(get_analysis))
            .route("/broken/articles", get(broken_list))
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

async fn list_articles(State(service): State<FakeNewsService>, RawQuery(query): RawQuery) -> Response {
    service.queries.lock().unwrap().push(query);
    if let Some((status, body)) = service.list_status.lock().unwrap().clone() {
        return (status, body).into_response();
    }
    Json(service.list_body.lock().unwrap().clone()).into_response()
}

async fn get_article(Path(id): Path<u64>) -> Response {
    if id == 404 {
        return (StatusCode::NOT_FOUND, r#"{"detail":"Article not found"}"#).into_response();
    }
    Json(json!({
        "id": id,
        "source_id": 3,
        "title": format!("Article {}", id),
        "link": format!("https://news.example.com/{}", id),
        "published_at": "2024-05-01T08:30:00",
        "summary": "A short summary.",
        "sentiment_label": "neutral",
        "sentiment_score": 0.05,
        "keywords": ["economy", "rates"]
    }))
    .into_response()
}

async fn get_analysis(Path(id): Path<u64>) -> Response {
    if id == 404 {
        return (StatusCode::NOT_FOUND, r#"{"detail":"Analysis not found"}"#).into_response();
    }
    Json(json!({
        "id": 100 + id,
        "article_id": id,
        "summary": "Rates held steady.",
        "sentiment_label": "positive",
        "sentiment_score": 0.7,
        "keywords": ["rates"],
        "json_meta": { "reason": "upbeat tone", "safety_flag": false },
        "model_name": "gemini-1.5-flash",
        "created_at": "2024-05-01T09:00:00Z"
    }))
    .into_response()
}

async fn broken_list() -> impl IntoResponse {
    (StatusCode::OK, "<html>not json</html>")
}

/// An address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
