//! `HttpClient` against an in-process fake of the dashboard API.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use catalog::{load_catalog, CatalogError, CatalogSource};
use client::{ClientConfig, ClientError, HttpClient};
use forge::service::trigger_execution;
use forge::{DropPayload, Editor, Notification, Position, ServiceError, WorkflowRef, WorkflowService};

// ============================================================
// Fake backend
// ============================================================

#[derive(Clone, Default)]
struct Backend {
    workflows: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl Backend {
    fn record_auth(&self, headers: &HeaderMap) {
        let value = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        self.auth.lock().unwrap().push(value);
    }
}

async fn primitives() -> Json<Value> {
    Json(json!({
        "SuperCompute": { "description": "Heavy numeric work", "methods": ["run"] },
        "SecurityGuardian": { "description": "Policy checks", "methods": ["scan", "block"] }
    }))
}

async fn create_workflow(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    backend.record_auth(&headers);
    let mut workflows = backend.workflows.lock().unwrap();
    let mut stored = body;
    stored["id"] = json!(workflows.len() + 1);
    stored["created_at"] = json!("2026-10-19T09:00:00Z");
    workflows.push(stored.clone());
    (StatusCode::CREATED, Json(stored))
}

async fn get_workflow(
    Path(id): Path<String>,
    State(backend): State<Backend>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let workflows = backend.workflows.lock().unwrap();
    workflows
        .iter()
        .find(|w| w["id"].to_string() == id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, Json(json!({ "error": "Workflow not found" }))))
}

async fn run_workflow(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "message": "Workflow execution started",
        "execution_id": format!("exec_{id}_stub")
    }))
}

fn app(backend: Backend) -> Router {
    Router::new()
        .route("/api/v1/modules/engine/primitives", get(primitives))
        .route("/api/v1/workflows", post(create_workflow))
        .route("/api/v1/workflows/:id", get(get_workflow))
        .route("/api/v1/workflows/:id/run", post(run_workflow))
        .with_state(backend)
}

async fn spawn_server(app: Router) -> (SocketAddr, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server should run");
    });
    (addr, handle)
}

fn client_for(addr: SocketAddr, token: Option<&str>) -> HttpClient {
    HttpClient::new(ClientConfig {
        base_url: format!("http://{addr}/api/v1"),
        token: token.map(str::to_owned),
        timeout_secs: 5,
    })
    .expect("client should build")
}

// ============================================================
// Catalog
// ============================================================

#[tokio::test]
async fn catalog_is_fetched_from_the_engine() {
    let (addr, _server) = spawn_server(app(Backend::default())).await;
    let client = client_for(addr, None);

    let catalog = load_catalog(&client).await;
    assert!(catalog.contains("CronTrigger"));
    assert!(catalog.contains("SuperCompute"));
    assert_eq!(catalog.get("SecurityGuardian").unwrap().methods, vec!["scan", "block"]);
}

#[tokio::test]
async fn missing_engine_falls_back_to_builtin_catalog() {
    let router = Router::new().route(
        "/api/v1/modules/engine/primitives",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "engine offline") }),
    );
    let (addr, _server) = spawn_server(router).await;
    let client = client_for(addr, None);

    let err = client.fetch().await.unwrap_err();
    assert!(matches!(err, CatalogError::Unavailable(ref m) if m.contains("engine offline")));

    let catalog = load_catalog(&client).await;
    assert_eq!(catalog.len(), 1);
    assert!(catalog.contains("CronTrigger"));
}

// ============================================================
// Workflow service
// ============================================================

#[tokio::test]
async fn editor_save_round_trips_through_the_api() {
    let backend = Backend::default();
    let (addr, _server) = spawn_server(app(backend.clone())).await;
    let client = client_for(addr, Some("secret-token"));

    let mut editor = Editor::new(load_catalog(&client).await);
    editor.rename("nightly_scan");
    editor
        .drop_primitive(&DropPayload::primitive("CronTrigger"), Position::new(40.0, 40.0))
        .expect("trigger is always in the catalog");

    let pending = editor.begin_save().unwrap();
    let result = client.save(&pending.request).await;
    editor.finish_save(pending, result);

    assert_eq!(editor.saved_id(), Some(&WorkflowRef::new("1")));
    assert!(!editor.is_dirty());
    assert_eq!(
        editor.drain_notifications(),
        vec![Notification::Success("Workflow Saved & Compiled".into())]
    );
    assert_eq!(
        backend.auth.lock().unwrap().as_slice(),
        &[Some("Bearer secret-token".to_owned())]
    );

    // Reopen what the service stored.
    let saved = client.load(&WorkflowRef::new("1")).await.unwrap();
    assert_eq!(saved.name, "nightly_scan");
    assert_eq!(saved.description, "Auto-generated flow with 1 nodes");
    assert!(saved.created_at.is_some());

    let (reopened, report) = Editor::open(editor.catalog().clone(), &saved);
    assert!(report.is_clean());
    assert_eq!(reopened.workflow().nodes, editor.workflow().nodes);
}

#[tokio::test]
async fn unknown_workflow_is_rejected_with_the_server_message() {
    let (addr, _server) = spawn_server(app(Backend::default())).await;
    let client = client_for(addr, None);

    let err = client.load(&WorkflowRef::new("99")).await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::Rejected { status: 404, message: "Workflow not found".into() }
    );
}

#[tokio::test]
async fn execution_is_acknowledged() {
    let (addr, _server) = spawn_server(app(Backend::default())).await;
    let client = client_for(addr, None);

    let ack = client.run_workflow(&WorkflowRef::new("7")).await.unwrap();
    assert_eq!(ack.execution_id.as_deref(), Some("exec_7_stub"));

    let notification = trigger_execution(&client, &WorkflowRef::new("7")).await;
    assert_eq!(notification, Notification::Success("Execution exec_7_stub started".into()));
}

#[tokio::test]
async fn non_json_success_body_is_a_decode_error() {
    let router = Router::new().route("/api/v1/workflows/:id", get(|| async { "<html>login</html>" }));
    let (addr, _server) = spawn_server(router).await;
    let client = client_for(addr, None);

    let err = client.get_workflow(&WorkflowRef::new("1")).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
    assert!(matches!(ServiceError::from(err), ServiceError::Decode(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Bind then release a port so nothing is listening on it.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        listener.local_addr().expect("listener should have addr")
    };
    let client = client_for(addr, None);

    let err = client.execute(&WorkflowRef::new("1")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Transport(_)));

    let notification = trigger_execution(&client, &WorkflowRef::new("1")).await;
    assert!(matches!(notification, Notification::Error(ref m) if m.starts_with("Failed to execute workflow")));
}
