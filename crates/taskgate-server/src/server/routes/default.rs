use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::state::{CoordinatorState, WorkerState};

const HEALTHY: &str = "healthy";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct CoordinatorHealth {
    status: &'static str,
    identity: String,
    workers: Vec<String>,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct WorkerHealth {
    status: &'static str,
    identity: String,
    capability: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    service: String,
    version: &'static str,
    role: &'static str,
    identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    capability: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    workers: Option<Vec<String>>,
    endpoints: BTreeMap<&'static str, &'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    security: Option<CallerPolicy>,
}

#[derive(Debug, Serialize)]
pub struct CallerPolicy {
    allowed_callers: Vec<String>,
    blocked_callers: Vec<String>,
}

pub async fn coordinator_health(
    State(state): State<Arc<CoordinatorState>>,
) -> (StatusCode, Json<CoordinatorHealth>) {
    tracing::debug!("Health check request received.");
    let coordinator = &state.coordinator;

    let health = CoordinatorHealth {
        status: HEALTHY,
        identity: coordinator.identity().to_string(),
        workers: coordinator.registry().ids().map(String::from).collect(),
        timestamp: Utc::now(),
    };
    (StatusCode::OK, Json(health))
}

pub async fn worker_health(
    State(state): State<Arc<WorkerState>>,
) -> (StatusCode, Json<WorkerHealth>) {
    tracing::debug!("Health check request received.");

    let health = WorkerHealth {
        status: HEALTHY,
        identity: state.processor.identity().to_string(),
        capability: state.processor.capability(),
        timestamp: Utc::now(),
    };
    (StatusCode::OK, Json(health))
}

pub async fn coordinator_index(
    State(state): State<Arc<CoordinatorState>>,
) -> (StatusCode, Json<ServiceInfo>) {
    let coordinator = &state.coordinator;

    let info = ServiceInfo {
        service: "Task dispatch coordinator".to_string(),
        version: VERSION,
        role: "coordinator",
        identity: coordinator.identity().to_string(),
        capability: None,
        workers: Some(coordinator.registry().ids().map(String::from).collect()),
        endpoints: BTreeMap::from([
            ("/health", "GET - Health check"),
            ("/analyze", "POST - Delegate task to all workers"),
            ("/test-worker", "POST - Test connectivity to a specific worker"),
        ]),
        security: None,
    };
    (StatusCode::OK, Json(info))
}

pub async fn worker_index(State(state): State<Arc<WorkerState>>) -> (StatusCode, Json<ServiceInfo>) {
    let processor = &state.processor;

    let info = ServiceInfo {
        service: format!("Task worker - {}", processor.identity()),
        version: VERSION,
        role: "worker",
        identity: processor.identity().to_string(),
        capability: Some(processor.capability()),
        workers: None,
        endpoints: BTreeMap::from([
            ("/health", "GET - Health check"),
            ("/process", "POST - Process task from coordinator"),
            (
                "/test-peer-call",
                "POST - Test worker-to-worker call (should be blocked)",
            ),
        ]),
        security: Some(CallerPolicy {
            allowed_callers: vec!["orchestrator-agent".to_string()],
            blocked_callers: vec!["*-agent (other workers)".to_string()],
        }),
    };
    (StatusCode::OK, Json(info))
}
