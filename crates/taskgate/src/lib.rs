//! # `taskgate`
//!
//! Fan-out task dispatch between a coordinator and a fixed set of HTTP
//! workers.
//!
//! The [`Coordinator`] sends one task to every worker in its
//! [`WorkerRegistry`] concurrently, bounds each call by the same timeout and
//! folds the outcomes into an [`AggregatedResponse`]. A failing worker never
//! aborts the cycle; it is reported in `failed` with a [`FailureKind`].
//!
//! ## Example
//!
//! ```no_run
//! use taskgate::{Coordinator, CoordinatorConfig, ServiceAddress, TaskRequest, WorkerRegistry};
//!
//! # async fn run() -> taskgate::Result<()> {
//! let registry = WorkerRegistry::parse("research-agent,code-agent", &ServiceAddress::default())?;
//! let coordinator = Coordinator::new(CoordinatorConfig::new("orchestrator", registry))?;
//!
//! let response = coordinator.dispatch(&TaskRequest::new("summarize X")).await?;
//! println!("{} succeeded, {} failed", response.succeeded_count, response.failed_count);
//! # Ok(())
//! # }
//! ```

pub mod contract;
pub mod dispatch;
pub mod error;
pub mod probe;
pub mod registry;
pub mod worker;

pub use contract::{ProcessRequest, TaskRequest, WorkerResponse};
pub use dispatch::{
    AggregatedResponse, Coordinator, CoordinatorConfig, DispatchStatus, FailureKind,
    WorkerCallResult,
};
pub use error::{Error, Result};
pub use registry::{ServiceAddress, WorkerEndpoint, WorkerRegistry, WorkerSpec};
pub use worker::{WorkerConfig, WorkerProcessor};
