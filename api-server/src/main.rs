//! Student Performance Analytics Server
//!
//! Serves the predictions and rules tables and accepts replacement student
//! tables, re-running the pipeline on each upload.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 ANALYTICS SERVER                     │
//! ├──────────────────────────────────────────────────────┤
//! │  ┌────────────┐                ┌──────────────────┐  │
//! │  │  Reports   │                │  Upload          │  │
//! │  │  (Axum)    │                │  (blocking pool) │  │
//! │  └─────┬──────┘                └────────┬─────────┘  │
//! │        │ read                   ingest  │            │
//! │        ▼                                ▼            │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │  TableStore (raw, predictions, rules)          │  │
//! │  └────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use student_analytics_core::{FileStore, Pipeline, PipelineConfig, TableStore};
use tokio::sync::Mutex;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

/// Used when `RUST_LOG` is unset; core pipeline records arrive through `log`
const DEFAULT_LOG_FILTER: &str =
    "student_analytics_server=debug,student_analytics_core=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Student Analytics Server starting...");
    tracing::info!("Data directory: {}", config.data_dir.display());

    let store = FileStore::new(&config.data_dir);
    let state = AppState::new(Arc::new(store), config.clone());

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TableStore>,
    pub pipeline: Arc<Pipeline>,
    /// Held for the whole of an upload so two commits never interleave
    pub upload_lock: Arc<Mutex<()>>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(store: Arc<dyn TableStore>, config: config::Config) -> Self {
        Self {
            store,
            pipeline: Arc::new(Pipeline::new(PipelineConfig::default())),
            upload_lock: Arc::new(Mutex::new(())),
            config,
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let report_routes = Router::new()
        .route("/", get(handlers::health::welcome))
        .route("/health", get(handlers::health::check))
        .route("/summary", get(handlers::reports::summary))
        .route("/at-risk", get(handlers::reports::at_risk))
        .route("/students", get(handlers::reports::students))
        .route("/students/:id", get(handlers::reports::student))
        .route("/rules", get(handlers::reports::rules));

    let upload_routes = Router::new()
        .route("/upload", post(handlers::upload::upload))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    Router::new()
        .merge(report_routes)
        .merge(upload_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use std::time::Duration;
    use student_analytics_core::{Commit, MemoryStore, StoreError, Table};
    use tower::ServiceExt;

    const HEADER: &str =
        "StudentID,Name,Attendance,Assignments,Tutorials,Volunteering,MOOCs,EventsParticipation,PerformanceLevel";
    const BOUNDARY: &str = "analytics-test-boundary";

    fn raw_table() -> String {
        let rows = [
            "S0001,Ann Low,60,9,4,3,1,4,Low",
            "S0002,Ben Low,62,8,3,2,2,3,Low",
            "S0003,Cat Low,70,10,5,4,3,5,Low",
            "S0004,Dan High,80,9,4,3,1,4,High",
            "S0005,Eve High,85,8,3,2,1,3,High",
            "S0006,Fay High,90,10,5,5,2,5,High",
            "S0007,Gus High,95,9,4,4,3,4,High",
            "S0008,Hal Medium,78,9,2,3,1,4,Medium",
            "S0009,Ivy Medium,88,8,1,4,2,5,Medium",
            "S0010,Jon Medium,92,10,4,1,2,4,Medium",
        ];
        format!("{}\n{}\n", HEADER, rows.join("\n"))
    }

    fn app(store: Arc<MemoryStore>) -> Router {
        create_router(AppState::new(store, config::Config::default()))
    }

    fn analyzed_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::with_table(Table::RawStudents, raw_table()));
        Pipeline::default().run(store.as_ref()).unwrap();
        store
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn upload(field: &str, contents: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"students.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n{contents}\r\n--{b}--\r\n",
            b = BOUNDARY,
            field = field,
            contents = contents,
        );
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn snapshot(store: &MemoryStore) -> Vec<Option<Vec<u8>>> {
        Table::ALL.iter().map(|t| store.read(*t).ok()).collect()
    }

    #[tokio::test]
    async fn test_welcome_and_health() {
        let store = Arc::new(MemoryStore::new());

        let response = app(store.clone()).oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (status, body) = send(app(store), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_missing_tables_are_server_errors() {
        let store = Arc::new(MemoryStore::new());

        for uri in ["/summary", "/at-risk", "/students", "/rules"] {
            let (status, body) = send(app(store.clone()), get(uri)).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
            assert!(body["error"].as_str().unwrap().contains("not found"), "{}", uri);
            assert_eq!(body["status"], 500);
        }
    }

    #[tokio::test]
    async fn test_summary_counts_predictions() {
        let (status, body) = send(app(analyzed_store()), get("/summary")).await;

        assert_eq!(status, StatusCode::OK);
        let distribution = &body["performance_distribution"];
        assert_eq!(distribution["Low"], 3);
        assert_eq!(distribution["High"], 4);
        assert_eq!(distribution["Medium"], 3);
    }

    #[tokio::test]
    async fn test_at_risk_is_low_subset_of_students() {
        let store = analyzed_store();
        let (_, students) = send(app(store.clone()), get("/students")).await;
        let (status, at_risk) = send(app(store), get("/at-risk")).await;

        assert_eq!(status, StatusCode::OK);
        let expected: Vec<Value> = students
            .as_array()
            .unwrap()
            .iter()
            .filter(|r| r["Predicted_Performance"] == "Low")
            .cloned()
            .collect();
        assert_eq!(at_risk.as_array().unwrap(), &expected);
        assert_eq!(expected.len(), 3);
    }

    #[tokio::test]
    async fn test_student_lookup() {
        let store = analyzed_store();

        let (status, body) = send(app(store.clone()), get("/students/S0004")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Name"], "Dan High");
        assert_eq!(body["Predicted_Performance"], "High");

        let (status, body) = send(app(store), get("/students/S9999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_rules_rounding_is_presentation_only() {
        let rules = "antecedents,consequents,support,confidence,antecedent_support,consequent_support,lift\n\
                     \"Assignments_High, Tutorials_High\",PerformanceLevel_High,0.23456,0.87654,0.26761,0.4,2.19135\n";
        let store = Arc::new(MemoryStore::with_table(Table::Rules, rules));

        let (status, body) = send(app(store.clone()), get("/rules?round=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["antecedents"], "Assignments_High, Tutorials_High");
        assert_eq!(body[0]["support"], 0.23);
        assert_eq!(body[0]["confidence"], 0.88);
        assert_eq!(body[0]["lift"], 2.19);

        let (_, body) = send(app(store), get("/rules")).await;
        assert_eq!(body[0]["support"], 0.23456);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_rejected() {
        let store = analyzed_store();
        let before = snapshot(&store);

        let (status, body) = send(app(store.clone()), upload("document", &raw_table())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);

        let not_multipart = Request::builder()
            .method("POST")
            .uri("/upload")
            .body(Body::from(raw_table()))
            .unwrap();
        let (status, _) = send(app(store.clone()), not_multipart).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(snapshot(&store), before);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_tables() {
        let store = analyzed_store();
        let before = snapshot(&store);

        let bad = "StudentID,Name,Attendance\nS0001,Ann Low,60\n";
        let (status, body) = send(app(store.clone()), upload("file", bad)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("Assignments"));
        assert_eq!(snapshot(&store), before);
    }

    #[tokio::test]
    async fn test_upload_replaces_tables() {
        let store = Arc::new(MemoryStore::new());

        let (status, body) = send(app(store.clone()), upload("file", &raw_table())).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["success"], true);
        assert!(body["message"].as_str().unwrap().contains("Processed 10 students"));

        assert!(store.exists(Table::RawStudents));
        let (status, students) = send(app(store), get("/students")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(students.as_array().unwrap().len(), 10);
    }
    /// Store whose commits block until the test releases them
    struct GatedStore {
        inner: MemoryStore,
        entered: tokio::sync::mpsc::UnboundedSender<()>,
        release: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl TableStore for GatedStore {
        fn read(&self, table: Table) -> Result<Vec<u8>, StoreError> {
            self.inner.read(table)
        }

        fn exists(&self, table: Table) -> bool {
            self.inner.exists(table)
        }

        fn commit(&self, commit: Commit) -> Result<(), StoreError> {
            let _ = self.entered.send(());
            let _ = self.release.lock().unwrap().recv();
            self.inner.commit(commit)
        }
    }

    #[tokio::test]
    async fn test_dropped_upload_keeps_lock_until_commit_finishes() {
        let (entered_tx, mut entered_rx) = tokio::sync::mpsc::unbounded_channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let store = Arc::new(GatedStore {
            inner: MemoryStore::new(),
            entered: entered_tx,
            release: std::sync::Mutex::new(release_rx),
        });
        let state = AppState::new(store.clone(), config::Config::default());

        let request = create_router(state.clone()).oneshot(upload("file", &raw_table()));
        let handle = tokio::spawn(request);
        entered_rx.recv().await.unwrap();

        // Client goes away while the commit is still running
        handle.abort();
        let _ = handle.await;
        assert!(state.upload_lock.try_lock().is_err());

        release_tx.send(()).unwrap();
        let guard = tokio::time::timeout(Duration::from_secs(5), state.upload_lock.lock())
            .await
            .unwrap();
        drop(guard);
        assert!(store.exists(Table::Predictions));
    }

    #[tokio::test]
    async fn test_oversized_upload_is_payload_too_large() {
        let store = analyzed_store();
        let before = snapshot(&store);
        let config = config::Config {
            max_upload_bytes: 64,
            ..config::Config::default()
        };
        let app = create_router(AppState::new(store.clone(), config));

        let (status, body) = send(app, upload("file", &raw_table())).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["status"], 413);
        assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn test_default_log_filter_includes_core() {
        assert!(DEFAULT_LOG_FILTER
            .split(',')
            .any(|directive| directive.starts_with("student_analytics_core=")));
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
