//! Coordinator side: fan a task out to every registered worker and fold the
//! per-worker outcomes into one [`AggregatedResponse`].

mod aggregate;
mod outcome;

pub use aggregate::{AggregatedResponse, DispatchStatus, WorkerFailure};
pub use outcome::{error_body, error_chain, FailureKind, WorkerCallResult};

use std::time::Duration;

use futures_util::future::join_all;
use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

use crate::contract::{ProcessRequest, TaskRequest, DEFAULT_TIMEOUT};
use crate::error::Result;
use crate::registry::{WorkerEndpoint, WorkerRegistry};

pub const DEFAULT_COORDINATOR_ID: &str = "orchestrator";
pub const DEFAULT_MAX_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Sent to workers as `from` and reported as `origin`.
    pub identity: String,
    pub registry: WorkerRegistry,
    pub default_timeout: Duration,
    pub max_timeout: Duration,
}

impl CoordinatorConfig {
    pub fn new(identity: impl Into<String>, registry: WorkerRegistry) -> Self {
        Self {
            identity: identity.into(),
            registry,
            default_timeout: DEFAULT_TIMEOUT,
            max_timeout: DEFAULT_MAX_TIMEOUT,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_max_timeout(mut self, timeout: Duration) -> Self {
        self.max_timeout = timeout;
        self
    }
}

pub struct Coordinator {
    config: CoordinatorConfig,
    client: Client,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: CoordinatorConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn identity(&self) -> &str {
        &self.config.identity
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.config.registry
    }

    /// Validate the request's timeout and run one dispatch cycle.
    pub async fn dispatch(&self, request: &TaskRequest) -> Result<AggregatedResponse> {
        let timeout =
            request.resolve_timeout(self.config.default_timeout, self.config.max_timeout)?;
        Ok(self.dispatch_task(request.task(), timeout).await)
    }

    /// Call every worker concurrently, each bounded by `timeout`.
    ///
    /// Never fails: every worker ends up in exactly one of the two result
    /// mappings.
    pub async fn dispatch_task(&self, task: &str, timeout: Duration) -> AggregatedResponse {
        let dispatch_id = Uuid::new_v4();
        tracing::info!(
            %dispatch_id,
            task,
            workers = self.config.registry.len(),
            timeout_ms = timeout.as_millis() as u64,
            "Received task"
        );

        let body = ProcessRequest::new(task, &self.config.identity);
        let calls = self
            .config
            .registry
            .iter()
            .map(|worker| self.call_worker(dispatch_id, worker, &body, timeout));
        let results = join_all(calls).await;

        let response =
            AggregatedResponse::from_results(dispatch_id, &self.config.identity, task, results);
        tracing::info!(
            %dispatch_id,
            succeeded = response.succeeded_count,
            failed = response.failed_count,
            "Dispatch finished"
        );
        response
    }

    async fn call_worker(
        &self,
        dispatch_id: Uuid,
        worker: &WorkerEndpoint,
        body: &ProcessRequest,
        timeout: Duration,
    ) -> WorkerCallResult {
        let url = worker.process_url();
        tracing::debug!(%dispatch_id, worker = %worker.id, %url, "Calling worker");

        // A zero budget is a timeout without contacting the worker.
        let outcome = if timeout.is_zero() {
            Err(FailureKind::Timeout)
        } else {
            // Dropping the in-flight request on timeout abandons it; the worker
            // may still finish its own work.
            tokio::time::timeout(timeout, self.post_process(&url, body))
                .await
                .unwrap_or(Err(FailureKind::Timeout))
        };

        match &outcome {
            Ok(_) => tracing::info!(%dispatch_id, worker = %worker.id, "Worker completed successfully"),
            Err(kind) => tracing::error!(%dispatch_id, worker = %worker.id, "Worker failed: {}", kind),
        }

        WorkerCallResult::new(worker.id.clone(), outcome)
    }

    async fn post_process(
        &self,
        url: &str,
        body: &ProcessRequest,
    ) -> std::result::Result<Value, FailureKind> {
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FailureKind::BadStatus {
                status_code: status.as_u16(),
                body: error_body(response).await,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| FailureKind::Other {
            message: format!("Invalid JSON body: {err}"),
        })
    }
}
