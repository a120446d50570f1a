use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::State,
    http::{HeaderMap, Request, StatusCode, Uri, header::CONTENT_TYPE},
};
use portfolio_backend::{
    build_router, notifier::TelegramNotifier, rate_limit::RateLimiter, state::AppState,
};
use serde_json::Value;
use sqlx::MySqlPool;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const TOKEN: &str = "TEST";
pub const CHAT: &str = "-100";

pub type Calls = Arc<Mutex<Vec<(String, Value)>>>;

// Stand-in for api.telegram.org, answers every request with a fixed reply
pub struct MockTelegram {
    pub base: String,
    pub calls: Calls,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    calls: Calls,
}

#[allow(dead_code)]
pub async fn spawn_telegram(status: StatusCode, body: &str) -> MockTelegram {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status,
        body: body.to_string(),
        calls: calls.clone(),
    };

    let app = Router::new().fallback(mock_handler).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock telegram");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockTelegram {
        base: format!("http://{addr}"),
        calls,
    }
}

async fn mock_handler(
    State(state): State<MockState>,
    uri: Uri,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state
        .calls
        .lock()
        .unwrap()
        .push((uri.path().to_string(), body));
    (state.status, state.body.clone())
}

#[allow(dead_code)]
pub fn notifier(base: &str, token: Option<&str>, chat: Option<&str>) -> TelegramNotifier {
    TelegramNotifier::new(
        reqwest::Client::new(),
        base,
        token.map(str::to_string),
        chat.map(str::to_string),
    )
}

#[allow(dead_code)]
pub fn app_with(
    db: Option<MySqlPool>,
    notifier: TelegramNotifier,
    max_requests: u32,
    window: Duration,
) -> Router {
    build_router(AppState::new(
        db,
        notifier,
        RateLimiter::new(max_requests, window),
    ))
}

// No store, notifier pointed at a port nothing listens on
#[allow(dead_code)]
pub fn degraded_app() -> Router {
    app_with(
        None,
        notifier("http://127.0.0.1:9", None, None),
        5,
        Duration::from_secs(60),
    )
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: &Value, ip: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(ip) = ip {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[allow(dead_code)]
pub fn post_raw(uri: &str, content_type: &str, body: &str, ip: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, content_type);
    if let Some(ip) = ip {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, headers, body)
}
