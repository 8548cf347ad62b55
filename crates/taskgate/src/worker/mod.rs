//! Worker side: synthetic, deterministic task processing.

mod capability;
mod delay;

pub use capability::{describe_role, render_result, Capability, GENERAL_PURPOSE};
pub use delay::{processing_delay, MAX_DELAY, MIN_DELAY};

use chrono::Utc;
use tokio::time::Instant;

use crate::contract::{ProcessRequest, WorkerResponse};
use crate::registry::ServiceAddress;

pub const DEFAULT_WORKER_ID: &str = "unknown-worker";
pub const COMPLETED: &str = "completed";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Role name, e.g. `research`. Selects the result template.
    pub identity: String,
    /// Used to address peers for the lateral-call probe.
    pub address: ServiceAddress,
}

impl WorkerConfig {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            address: ServiceAddress::default(),
        }
    }

    pub fn with_address(mut self, address: ServiceAddress) -> Self {
        self.address = address;
        self
    }

    /// Name this worker is reachable under, `{role}-agent`.
    pub fn service_name(&self) -> String {
        if self.identity.ends_with("-agent") {
            self.identity.clone()
        } else {
            format!("{}-agent", self.identity)
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerProcessor {
    config: WorkerConfig,
}

impl WorkerProcessor {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn identity(&self) -> &str {
        &self.config.identity
    }

    pub fn capability(&self) -> &'static str {
        describe_role(&self.config.identity)
    }

    /// Sleep for the task's deterministic delay, then answer with the
    /// role-specific result. Never fails.
    pub async fn process(&self, request: ProcessRequest) -> WorkerResponse {
        let role = self.identity();
        tracing::info!(agent = role, from = %request.from, task = %request.task, "Received task");

        let start = Instant::now();
        let delay = processing_delay(&request.task);
        tokio::time::sleep(delay).await;
        let result = render_result(role, &request.task);
        let elapsed = start.elapsed();

        tracing::info!(
            agent = role,
            "Completed task in {:.3}s",
            elapsed.as_secs_f64()
        );

        WorkerResponse {
            agent: role.to_string(),
            capability: self.capability().to_string(),
            task: request.task,
            from: request.from,
            result,
            processing_delay_seconds: delay.as_secs_f64(),
            processing_time_seconds: elapsed.as_secs_f64(),
            request_timestamp: request.timestamp,
            response_timestamp: Utc::now(),
            status: COMPLETED.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn request(task: &str) -> ProcessRequest {
        ProcessRequest {
            task: task.into(),
            from: "orchestrator".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_service_name() {
        assert_eq!(WorkerConfig::new("research").service_name(), "research-agent");
        assert_eq!(WorkerConfig::new("code-agent").service_name(), "code-agent");
    }

    #[tokio::test]
    async fn test_process_research() {
        let processor = WorkerProcessor::new(WorkerConfig::new("research"));
        let response = processor.process(request("X")).await;

        assert_eq!(response.agent, "research");
        assert_eq!(response.status, COMPLETED);
        assert!(response.result.contains("X"));
        assert!(response.result.contains("sources"));
        assert!(response.result.contains("insights"));
        assert_eq!(response.request_timestamp, "2024-01-01T00:00:00Z");
        assert!(response.processing_time_seconds >= response.processing_delay_seconds);
    }

    #[tokio::test]
    async fn test_process_idempotent() {
        let processor = WorkerProcessor::new(WorkerConfig::new("code"));
        let first = processor.process(request("refactor Y")).await;
        let second = processor.process(request("refactor Y")).await;

        assert_eq!(first.result, second.result);
        assert_eq!(first.processing_delay_seconds, second.processing_delay_seconds);
        assert!(second.response_timestamp >= first.response_timestamp);
    }

    #[tokio::test]
    async fn test_process_unknown_role() {
        let processor = WorkerProcessor::new(WorkerConfig::new("translator"));
        let response = processor.process(ProcessRequest::default()).await;

        assert_eq!(response.capability, GENERAL_PURPOSE);
        assert_eq!(response.result, "Worker translator processed: No task provided");
        assert_eq!(response.from, "unknown");
    }
}
