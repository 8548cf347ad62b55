use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Why a single worker call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    ConnectionError { detail: String },
    BadStatus { status_code: u16, body: String },
    Other { message: String },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "Request timeout"),
            FailureKind::ConnectionError { detail } => write!(f, "Connection error: {detail}"),
            FailureKind::BadStatus { status_code, .. } => {
                write!(f, "Worker returned status {status_code}")
            }
            FailureKind::Other { message } => write!(f, "{message}"),
        }
    }
}

impl From<reqwest::Error> for FailureKind {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_connect() {
            FailureKind::ConnectionError {
                detail: error_chain(&err),
            }
        } else {
            FailureKind::Other {
                message: error_chain(&err),
            }
        }
    }
}

/// Render an error and its sources as `outer: inner: root`.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_str = cause.to_string();
        if !rendered.contains(&cause_str) {
            rendered.push_str(": ");
            rendered.push_str(&cause_str);
        }
        source = cause.source();
    }
    rendered
}

/// Body of a non-2xx response, or a marker when it cannot be read.
pub async fn error_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(err) => format!("<unreadable body: {}>", error_chain(&err)),
    }
}

/// Outcome of one outbound call within a dispatch cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerCallResult {
    Success { worker_id: String, payload: Value },
    Failure { worker_id: String, kind: FailureKind },
}

impl WorkerCallResult {
    pub fn new(worker_id: String, outcome: Result<Value, FailureKind>) -> Self {
        match outcome {
            Ok(payload) => Self::Success { worker_id, payload },
            Err(kind) => Self::Failure { worker_id, kind },
        }
    }

    pub fn worker_id(&self) -> &str {
        match self {
            Self::Success { worker_id, .. } | Self::Failure { worker_id, .. } => worker_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
