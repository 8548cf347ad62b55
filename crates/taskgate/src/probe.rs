//! Connectivity diagnostics.
//!
//! Workers use [`probe_peer`] to check that lateral worker-to-worker calls
//! are blocked by the network policy layer. The coordinator uses
//! [`probe_worker`] to check it can reach a worker's health endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::{error_body, error_chain, FailureKind};

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub enum PeerProbeOutcome {
    /// The peer answered. Lateral movement is possible.
    UnexpectedSuccess { response: Value },
    BlockedAsExpected { error: String },
    TimedOut,
    Failed { error: String },
}

impl PeerProbeOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            Self::UnexpectedSuccess { .. } => "unexpected_success",
            Self::BlockedAsExpected { .. } => "blocked_as_expected",
            Self::TimedOut => "timeout",
            Self::Failed { .. } => "error",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnexpectedSuccess { .. } => 200,
            Self::BlockedAsExpected { .. } | Self::TimedOut => 403,
            Self::Failed { .. } => 500,
        }
    }

    fn message(&self) -> Option<&'static str> {
        match self {
            Self::UnexpectedSuccess { .. } => {
                Some("Worker-to-worker call succeeded! This should be blocked by the service mesh.")
            }
            Self::BlockedAsExpected { .. } => {
                Some("Worker-to-worker communication blocked by service mesh policy")
            }
            Self::TimedOut => Some("Request timed out - likely blocked by service mesh policy"),
            Self::Failed { .. } => None,
        }
    }

    fn security_note(&self) -> Option<&'static str> {
        match self {
            Self::UnexpectedSuccess { .. } => Some(
                "This indicates lateral movement is possible. Check the service mesh policy configuration.",
            ),
            Self::BlockedAsExpected { .. } => Some(
                "This is correct behavior. Workers should only be callable by the coordinator.",
            ),
            Self::TimedOut => Some("Timeout suggests connection was prevented by service mesh."),
            Self::Failed { .. } => None,
        }
    }
}

/// Body returned by a worker's `POST /test-peer-call`.
#[derive(Debug, Clone, Serialize)]
pub struct PeerProbeReport {
    pub status: &'static str,
    pub agent: String,
    pub target: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_note: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PeerProbeReport {
    pub fn new(agent: &str, target: &str, url: &str, outcome: PeerProbeOutcome) -> Self {
        let status = outcome.status();
        let message = outcome.message();
        let security_note = outcome.security_note();
        let (response, error) = match outcome {
            PeerProbeOutcome::UnexpectedSuccess { response } => (Some(response), None),
            PeerProbeOutcome::BlockedAsExpected { error } | PeerProbeOutcome::Failed { error } => {
                (None, Some(error))
            }
            PeerProbeOutcome::TimedOut => (None, None),
        };

        Self {
            status,
            agent: agent.to_string(),
            target: target.to_string(),
            url: url.to_string(),
            message,
            security_note,
            response,
            error,
        }
    }
}

/// Try to reach another worker's health endpoint.
pub async fn probe_peer(client: &Client, url: &str, timeout: Duration) -> PeerProbeOutcome {
    if timeout.is_zero() {
        return PeerProbeOutcome::TimedOut;
    }

    let response = match tokio::time::timeout(timeout, client.get(url).send()).await {
        Err(_) => return PeerProbeOutcome::TimedOut,
        Ok(Err(err)) => return classify_peer_error(err),
        Ok(Ok(response)) => response,
    };

    let ok = response.status().is_success();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return classify_peer_error(err),
    };

    let response = if ok {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    } else {
        Value::String(body)
    };
    PeerProbeOutcome::UnexpectedSuccess { response }
}

fn classify_peer_error(err: reqwest::Error) -> PeerProbeOutcome {
    match FailureKind::from(err) {
        FailureKind::Timeout => PeerProbeOutcome::TimedOut,
        FailureKind::ConnectionError { detail } => {
            PeerProbeOutcome::BlockedAsExpected { error: detail }
        }
        other => PeerProbeOutcome::Failed {
            error: other.to_string(),
        },
    }
}

/// GET a worker's health endpoint and return its JSON body.
pub async fn probe_worker(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<Value, FailureKind> {
    if timeout.is_zero() {
        return Err(FailureKind::Timeout);
    }

    let request = async {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FailureKind::BadStatus {
                status_code: status.as_u16(),
                body: error_body(response).await,
            });
        }
        let body = response.bytes().await?;
        serde_json::from_slice::<Value>(&body).map_err(|err| FailureKind::Other {
            message: error_chain(&err),
        })
    };

    tokio::time::timeout(timeout, request)
        .await
        .unwrap_or(Err(FailureKind::Timeout))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_blocked() {
        let outcome = PeerProbeOutcome::BlockedAsExpected {
            error: "connection refused".into(),
        };
        assert_eq!(outcome.http_status(), 403);

        let report = PeerProbeReport::new(
            "research",
            "code-agent",
            "http://code-agent:8080/health",
            outcome,
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "blocked_as_expected");
        assert_eq!(value["error"], "connection refused");
        assert!(value.get("response").is_none());
    }

    #[test]
    fn test_report_unexpected_success() {
        let outcome = PeerProbeOutcome::UnexpectedSuccess {
            response: json!({"status": "healthy"}),
        };
        assert_eq!(outcome.http_status(), 200);

        let report = PeerProbeReport::new("research", "code-agent", "u", outcome);
        assert_eq!(report.status, "unexpected_success");
        assert_eq!(report.response, Some(json!({"status": "healthy"})));
        assert!(report.security_note.unwrap().contains("lateral movement"));
    }

    #[test]
    fn test_report_timeout_and_error() {
        assert_eq!(PeerProbeOutcome::TimedOut.http_status(), 403);
        assert_eq!(PeerProbeOutcome::TimedOut.status(), "timeout");

        let failed = PeerProbeOutcome::Failed { error: "bad".into() };
        assert_eq!(failed.http_status(), 500);
        let report = PeerProbeReport::new("a", "b", "u", failed);
        assert!(report.message.is_none());
        assert_eq!(report.error.as_deref(), Some("bad"));
    }
}
