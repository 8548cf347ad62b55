use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use taskgate::{ProcessRequest, WorkerResponse};

use crate::server::routes::parse_body;
use crate::server::state::WorkerState;
use crate::server::ServerError;

pub async fn process(
    State(state): State<Arc<WorkerState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<WorkerResponse>), ServerError> {
    let request: ProcessRequest = parse_body(&body)?;
    let response = state.processor.process(request).await;

    Ok((StatusCode::OK, Json(response)))
}
