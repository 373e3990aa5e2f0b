//! Local stand-in for the WeatherAPI.com `current.json` endpoint.

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{net::TcpListener, task::JoinHandle};
use weather_core::Settings;

pub const VALID_KEY: &str = "test-key";

const INVALID_KEY_BODY: &str = r#"{"error":{"code":2006,"message":"API key provided is invalid"}}"#;
const NO_LOCATION_BODY: &str = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture readable")
}

#[derive(Clone)]
struct ServerState {
    body: Arc<String>,
    delay: Duration,
    queries: Arc<Mutex<Vec<String>>>,
}

async fn current(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let q = params.get("q").cloned().unwrap_or_default();
    state.queries.lock().unwrap().push(q.clone());

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    if params.get("key").map(String::as_str) != Some(VALID_KEY) {
        return (StatusCode::UNAUTHORIZED, INVALID_KEY_BODY.to_string());
    }

    match q.as_str() {
        "Atlantis" => (StatusCode::BAD_REQUEST, NO_LOCATION_BODY.to_string()),
        "Teapot" => (StatusCode::INTERNAL_SERVER_ERROR, "internal failure".to_string()),
        _ => (StatusCode::OK, state.body.to_string()),
    }
}

pub struct MockWeatherServer {
    addr: SocketAddr,
    queries: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl MockWeatherServer {
    pub async fn start(body: String) -> Self {
        Self::start_with_delay(body, Duration::ZERO).await
    }

    pub async fn start_with_delay(body: String, delay: Duration) -> Self {
        let state = ServerState {
            body: Arc::new(body),
            delay,
            queries: Arc::new(Mutex::new(Vec::new())),
        };
        let queries = state.queries.clone();

        let app = Router::new()
            .route("/v1/current.json", get(current))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server to 127.0.0.1:0");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, queries, handle }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/v1/current.json", self.addr)
    }

    pub fn settings(&self) -> Settings {
        Settings {
            api_key: Some(VALID_KEY.to_string()),
            endpoint: self.endpoint(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Drop for MockWeatherServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
