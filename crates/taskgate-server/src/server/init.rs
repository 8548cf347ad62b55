use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use clap::Args;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info_span, Span};

use taskgate::dispatch::DEFAULT_COORDINATOR_ID;
use taskgate::registry::DEFAULT_DOMAIN;
use taskgate::worker::DEFAULT_WORKER_ID;
use taskgate::{CoordinatorConfig, ServiceAddress, WorkerConfig, WorkerRegistry};

use crate::server::routes::{analyze, default, probe, process};
use crate::server::state::{CoordinatorState, WorkerState};
use crate::server::utils::{parse_seconds, port_in_range};

/// Worker processing is bounded well below this.
const WORKER_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Slack on top of the longest allowed dispatch timeout.
const COORDINATOR_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

#[derive(Debug, Args)]
pub struct ServiceArgs {
    /// Domain appended to service names, empty to use names as hosts.
    #[clap(long, env = "CONSUL_DOMAIN", default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// Port that services listen on.
    #[arg(value_parser = port_in_range)]
    #[clap(long, env = "SERVICE_PORT", default_value = "8080")]
    pub service_port: u16,
}

impl ServiceArgs {
    fn address(&self) -> ServiceAddress {
        ServiceAddress::new(self.domain.clone(), self.service_port)
    }
}

#[derive(Debug, Args)]
pub struct CoordinatorArgs {
    #[clap(long, env = "AGENT_TYPE", default_value = DEFAULT_COORDINATOR_ID)]
    pub identity: String,

    /// Comma separated worker list. Entries are service names or `name=base-url`.
    #[clap(
        long,
        env = "WORKER_SERVICES",
        default_value = "research-agent,code-agent,data-agent,analysis-agent"
    )]
    pub workers: String,

    /// Per-call timeout in seconds when the request has none.
    #[arg(value_parser = parse_seconds)]
    #[clap(long, env = "DEFAULT_TIMEOUT", default_value = "5")]
    pub default_timeout: Duration,

    /// Largest per-call timeout a request may ask for, in seconds.
    #[arg(value_parser = parse_seconds)]
    #[clap(long, env = "MAX_TIMEOUT", default_value = "60")]
    pub max_timeout: Duration,

    #[clap(flatten)]
    pub service: ServiceArgs,
}

impl CoordinatorArgs {
    pub fn config(&self) -> Result<(CoordinatorConfig, ServiceAddress)> {
        let address = self.service.address();
        let registry = WorkerRegistry::parse(&self.workers, &address)?;

        if self.default_timeout > self.max_timeout {
            anyhow::bail!(
                "default timeout {:?} exceeds max timeout {:?}",
                self.default_timeout,
                self.max_timeout
            );
        }

        let config = CoordinatorConfig::new(self.identity.clone(), registry)
            .with_default_timeout(self.default_timeout)
            .with_max_timeout(self.max_timeout);
        Ok((config, address))
    }
}

#[derive(Debug, Args)]
pub struct WorkerArgs {
    /// Worker role, e.g. `research`, `code`, `data` or `analysis`.
    #[clap(long, env = "AGENT_TYPE", default_value = DEFAULT_WORKER_ID)]
    pub identity: String,

    #[clap(flatten)]
    pub service: ServiceArgs,
}

impl WorkerArgs {
    pub fn config(&self) -> WorkerConfig {
        WorkerConfig::new(self.identity.clone()).with_address(self.service.address())
    }
}

pub fn init_coordinator_router(
    config: CoordinatorConfig,
    address: ServiceAddress,
) -> Result<Router> {
    let request_timeout = config.max_timeout + COORDINATOR_TIMEOUT_MARGIN;
    let state = Arc::new(CoordinatorState::new(config, address)?);

    let router = Router::new()
        .route("/", get(default::coordinator_index))
        .route("/health", get(default::coordinator_health))
        .route("/analyze", post(analyze::analyze))
        .route("/test-worker", post(probe::test_worker))
        .with_state(state);

    Ok(with_layers(router, request_timeout))
}

pub fn init_worker_router(config: WorkerConfig) -> Result<Router> {
    let state = Arc::new(WorkerState::new(config)?);

    let router = Router::new()
        .route("/", get(default::worker_index))
        .route("/health", get(default::worker_health))
        .route("/process", post(process::process))
        .route("/test-peer-call", post(probe::test_peer_call))
        .with_state(state);

    Ok(with_layers(router, WORKER_REQUEST_TIMEOUT))
}

fn with_layers(router: Router, timeout: Duration) -> Router {
    router.layer((
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                // Matched route with placeholders, not the raw path.
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);
                tracing::debug!("{}", request.uri());

                info_span!(
                    "http_request",
                    method = ?request.method(),
                    matched_path,
                    status = tracing::field::Empty,
                )
            })
            .on_response(|response: &axum::response::Response, _latency: Duration, span: &Span| {
                span.record("status", response.status().as_u16());
            }),
        TimeoutLayer::new(timeout),
    ))
}
