use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::dispatch::outcome::{FailureKind, WorkerCallResult};

/// Overall outcome of a dispatch cycle.
///
/// Any failure makes the cycle partial, including the case where every
/// worker failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Completed,
    Partial,
}

impl DispatchStatus {
    /// 200 OK or 207 Multi-Status.
    pub fn http_status(&self) -> u16 {
        match self {
            DispatchStatus::Completed => 200,
            DispatchStatus::Partial => 207,
        }
    }
}

/// Failure entry in [`AggregatedResponse::failed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerFailure {
    #[serde(flatten)]
    pub kind: FailureKind,
    pub error: String,
}

impl From<FailureKind> for WorkerFailure {
    fn from(kind: FailureKind) -> Self {
        let error = kind.to_string();
        Self { kind, error }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregatedResponse {
    pub dispatch_id: Uuid,
    pub origin: String,
    pub status: DispatchStatus,
    pub task: String,
    pub succeeded: BTreeMap<String, Value>,
    pub failed: BTreeMap<String, WorkerFailure>,
    pub succeeded_count: usize,
    pub failed_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl AggregatedResponse {
    /// Fold the call results of one dispatch cycle.
    pub fn from_results<I>(dispatch_id: Uuid, origin: &str, task: &str, results: I) -> Self
    where
        I: IntoIterator<Item = WorkerCallResult>,
    {
        let mut succeeded = BTreeMap::new();
        let mut failed = BTreeMap::new();

        for result in results {
            match result {
                WorkerCallResult::Success { worker_id, payload } => {
                    failed.remove(&worker_id);
                    succeeded.insert(worker_id, payload);
                }
                WorkerCallResult::Failure { worker_id, kind } => {
                    succeeded.remove(&worker_id);
                    failed.insert(worker_id, WorkerFailure::from(kind));
                }
            }
        }

        let status = if failed.is_empty() {
            DispatchStatus::Completed
        } else {
            DispatchStatus::Partial
        };

        Self {
            dispatch_id,
            origin: origin.to_string(),
            status,
            task: task.to_string(),
            succeeded_count: succeeded.len(),
            failed_count: failed.len(),
            succeeded,
            failed,
            timestamp: Utc::now(),
        }
    }

    pub fn http_status(&self) -> u16 {
        self.status.http_status()
    }
}
