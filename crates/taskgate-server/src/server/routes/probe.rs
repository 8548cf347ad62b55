use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use taskgate::probe::{probe_peer, probe_worker, PeerProbeOutcome, PeerProbeReport, PROBE_TIMEOUT};

use crate::server::routes::parse_body;
use crate::server::state::{CoordinatorState, WorkerState};
use crate::server::ServerError;

const DEFAULT_TARGET: &str = "research-agent";

#[derive(Debug, Default, Deserialize)]
pub struct TestWorkerRequest {
    worker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeerCallRequest {
    target: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkerProbeReport {
    status: &'static str,
    worker: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    message: String,
}

/// `POST /test-worker`: check the coordinator can reach one worker's
/// health endpoint.
pub async fn test_worker(
    State(state): State<Arc<CoordinatorState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<WorkerProbeReport>), ServerError> {
    let request: TestWorkerRequest = parse_body(&body)?;
    let worker = request.worker.unwrap_or_else(|| DEFAULT_TARGET.to_string());

    let url = match state.coordinator.registry().get(&worker) {
        Some(endpoint) => endpoint.health_url(),
        None => format!("{}/health", state.address.base_url(&worker)),
    };

    tracing::info!(%worker, %url, "Testing connectivity to worker");

    let (status, report) = match probe_worker(&state.client, &url, PROBE_TIMEOUT).await {
        Ok(response) => (
            StatusCode::OK,
            WorkerProbeReport {
                status: "success",
                message: format!("Successfully connected to {worker}"),
                worker,
                url,
                response: Some(response),
                error: None,
            },
        ),
        Err(kind) => {
            tracing::error!(%worker, "Failed to connect: {}", kind);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                WorkerProbeReport {
                    status: "failed",
                    message: format!(
                        "Failed to connect to {worker}. Check the service mesh policy."
                    ),
                    worker,
                    url,
                    response: None,
                    error: Some(kind.to_string()),
                },
            )
        }
    };

    Ok((status, Json(report)))
}

/// `POST /test-peer-call`: try to reach another worker directly. Success
/// means the network policy does not isolate workers.
pub async fn test_peer_call(
    State(state): State<Arc<WorkerState>>,
    body: Bytes,
) -> Result<Response, ServerError> {
    let request: PeerCallRequest = parse_body(&body)?;
    let target = request.target.unwrap_or_else(|| DEFAULT_TARGET.to_string());
    let config = state.processor.config();
    let agent = config.identity.as_str();

    if target == config.service_name() {
        let body = serde_json::json!({
            "status": "invalid",
            "message": "Cannot call self",
            "agent": agent,
            "target": target,
        });
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }

    let url = format!("{}/health", config.address.base_url(&target));
    tracing::info!(agent, %target, "Attempting to call peer worker");

    let outcome = probe_peer(&state.client, &url, PROBE_TIMEOUT).await;
    match &outcome {
        PeerProbeOutcome::UnexpectedSuccess { .. } => tracing::warn!(
            agent,
            %target,
            "Successfully called peer worker, lateral calls are not being blocked"
        ),
        PeerProbeOutcome::BlockedAsExpected { .. } => {
            tracing::info!(agent, %target, "Connection to peer blocked as expected")
        }
        PeerProbeOutcome::TimedOut => {
            tracing::info!(agent, %target, "Request to peer timed out (likely blocked)")
        }
        PeerProbeOutcome::Failed { error } => {
            tracing::error!(agent, %target, "Error calling peer: {}", error)
        }
    }

    let status = peer_status_code(&outcome);
    let report = PeerProbeReport::new(agent, &target, &url, outcome);

    Ok((status, Json(report)).into_response())
}

fn peer_status_code(outcome: &PeerProbeOutcome) -> StatusCode {
    match outcome {
        PeerProbeOutcome::UnexpectedSuccess { .. } => StatusCode::OK,
        PeerProbeOutcome::BlockedAsExpected { .. } | PeerProbeOutcome::TimedOut => {
            StatusCode::FORBIDDEN
        }
        PeerProbeOutcome::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
