use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use taskgate::{AggregatedResponse, DispatchStatus, TaskRequest};

use crate::server::routes::parse_body;
use crate::server::state::CoordinatorState;
use crate::server::ServerError;

/// `POST /analyze`: fan the task out to every worker.
///
/// Answers 200 when every worker succeeded and 207 Multi-Status otherwise.
pub async fn analyze(
    State(state): State<Arc<CoordinatorState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<AggregatedResponse>), ServerError> {
    let request: TaskRequest = parse_body(&body)?;

    let response = state.coordinator.dispatch(&request).await?;
    let status = dispatch_status_code(response.status);

    Ok((status, Json(response)))
}

fn dispatch_status_code(status: DispatchStatus) -> StatusCode {
    match status {
        DispatchStatus::Completed => StatusCode::OK,
        DispatchStatus::Partial => StatusCode::MULTI_STATUS,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{json, Value};
    use taskgate::{CoordinatorConfig, ServiceAddress, WorkerConfig, WorkerEndpoint, WorkerRegistry};

    use super::*;
    use crate::server::testing::{serve, unreachable};
    use crate::server::{init_coordinator_router, init_worker_router};

    #[test]
    fn test_dispatch_status_code() {
        for status in [DispatchStatus::Completed, DispatchStatus::Partial] {
            assert_eq!(dispatch_status_code(status).as_u16(), status.http_status());
        }
        assert_eq!(
            dispatch_status_code(DispatchStatus::Partial),
            StatusCode::MULTI_STATUS
        );
    }

    async fn spawn_coordinator(workers: Vec<(&str, String)>) -> String {
        let registry = WorkerRegistry::new(
            workers
                .into_iter()
                .map(|(id, url)| WorkerEndpoint::new(id, url))
                .collect(),
        )
        .unwrap();
        let config = CoordinatorConfig::new("orchestrator", registry)
            .with_max_timeout(Duration::from_secs(10));
        serve(init_coordinator_router(config, ServiceAddress::default()).unwrap()).await
    }

    async fn spawn_worker(role: &str) -> String {
        serve(init_worker_router(WorkerConfig::new(role)).unwrap()).await
    }

    #[tokio::test]
    async fn test_analyze_all_succeed() -> anyhow::Result<()> {
        let coordinator = spawn_coordinator(vec![
            ("research-agent", spawn_worker("research").await),
            ("data-agent", spawn_worker("data").await),
        ])
        .await;

        let response = reqwest::Client::new()
            .post(format!("{coordinator}/analyze"))
            .json(&json!({"task": "summarize X"}))
            .send()
            .await?;

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await?;
        assert_eq!(body["status"], "completed");
        assert_eq!(body["succeeded_count"], 2);
        assert_eq!(body["failed_count"], 0);
        assert_eq!(body["succeeded"]["data-agent"]["agent"], "data");
        Ok(())
    }

    #[tokio::test]
    async fn test_analyze_partial() -> anyhow::Result<()> {
        let coordinator = spawn_coordinator(vec![
            ("research", spawn_worker("research").await),
            ("code", unreachable().await),
        ])
        .await;

        let response = reqwest::Client::new()
            .post(format!("{coordinator}/analyze"))
            .json(&json!({"task": "summarize X", "timeout": 2}))
            .send()
            .await?;

        assert_eq!(response.status().as_u16(), 207);
        let body: Value = response.json().await?;
        assert_eq!(body["status"], "partial");
        assert_eq!(body["succeeded_count"], 1);
        assert_eq!(body["failed_count"], 1);
        assert_eq!(body["failed"]["code"]["kind"], "connection_error");
        assert!(body["succeeded"]["research"]["result"]
            .as_str()
            .unwrap()
            .contains("summarize X"));
        Ok(())
    }

    #[tokio::test]
    async fn test_analyze_zero_timeout() -> anyhow::Result<()> {
        let coordinator =
            spawn_coordinator(vec![("research", spawn_worker("research").await)]).await;

        let response = reqwest::Client::new()
            .post(format!("{coordinator}/analyze"))
            .json(&json!({"task": "X", "timeout": 0}))
            .send()
            .await?;

        assert_eq!(response.status().as_u16(), 207);
        let body: Value = response.json().await?;
        assert_eq!(body["failed"]["research"]["kind"], "timeout");
        assert_eq!(body["succeeded"], json!({}));
        Ok(())
    }

    #[tokio::test]
    async fn test_analyze_empty_body_uses_defaults() -> anyhow::Result<()> {
        let coordinator =
            spawn_coordinator(vec![("research", spawn_worker("research").await)]).await;

        let response = reqwest::Client::new()
            .post(format!("{coordinator}/analyze"))
            .send()
            .await?;

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await?;
        assert_eq!(body["task"], "No task specified");
        Ok(())
    }

    #[tokio::test]
    async fn test_analyze_rejects_bad_timeout() -> anyhow::Result<()> {
        let coordinator = spawn_coordinator(vec![("research", unreachable().await)]).await;
        let client = reqwest::Client::new();

        for timeout in [json!(-1), json!(3600)] {
            let response = client
                .post(format!("{coordinator}/analyze"))
                .json(&json!({"task": "X", "timeout": timeout}))
                .send()
                .await?;
            assert_eq!(response.status().as_u16(), 400);
            let body: Value = response.json().await?;
            assert!(body["error"]
                .as_str()
                .unwrap()
                .to_lowercase()
                .contains("timeout"));
        }
        Ok(())
    }
}
