//! Request and response bodies exchanged between clients, the coordinator
//! and the workers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Task text used by the coordinator when the client sends none.
pub const NO_TASK_SPECIFIED: &str = "No task specified";

/// Task text used by a worker when the coordinator sends none.
pub const NO_TASK_PROVIDED: &str = "No task provided";

pub const UNKNOWN: &str = "unknown";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// Per-call timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

impl TaskRequest {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: Some(task.into()),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn task(&self) -> &str {
        self.task.as_deref().unwrap_or(NO_TASK_SPECIFIED)
    }

    /// Resolve the requested timeout, falling back to `default` and
    /// rejecting values that are negative, non-finite or above `max`.
    pub fn resolve_timeout(&self, default: Duration, max: Duration) -> Result<Duration> {
        let Some(seconds) = self.timeout else {
            return Ok(default);
        };

        let timeout =
            Duration::try_from_secs_f64(seconds).map_err(|_| Error::InvalidTimeout(seconds))?;

        if timeout > max {
            return Err(Error::TimeoutTooLarge {
                requested: seconds,
                max: max.as_secs_f64(),
            });
        }

        Ok(timeout)
    }
}

/// Body of the coordinator's outbound `POST /process`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    #[serde(default = "default_task")]
    pub task: String,
    #[serde(default = "default_unknown")]
    pub from: String,
    #[serde(default = "default_unknown")]
    pub timestamp: String,
}

impl ProcessRequest {
    pub fn new(task: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            from: from.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl Default for ProcessRequest {
    fn default() -> Self {
        Self {
            task: default_task(),
            from: default_unknown(),
            timestamp: default_unknown(),
        }
    }
}

fn default_task() -> String {
    NO_TASK_PROVIDED.to_string()
}

fn default_unknown() -> String {
    UNKNOWN.to_string()
}

/// Body returned by a worker's `POST /process`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub agent: String,
    pub capability: String,
    pub task: String,
    pub from: String,
    pub result: String,
    /// Nominal delay derived from the task text.
    pub processing_delay_seconds: f64,
    /// Wall-clock time actually spent processing.
    pub processing_time_seconds: f64,
    pub request_timestamp: String,
    pub response_timestamp: DateTime<Utc>,
    pub status: String,
}
