mod init;
mod state;
pub mod routes;
pub mod utils;

pub use init::{init_coordinator_router, init_worker_router, CoordinatorArgs, WorkerArgs};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
	#[error("Bad request: {0}")]
	BadRequest(String),

	#[error("Internal server error: `{0}`")]
	InternalError(#[from] anyhow::Error),
}

impl From<taskgate::Error> for ServerError {
	fn from(err: taskgate::Error) -> Self {
		match err {
			taskgate::Error::InvalidTimeout(_)
			| taskgate::Error::TimeoutTooLarge { .. }
			| taskgate::Error::InvalidWorkerSpec(_) => ServerError::BadRequest(err.to_string()),
			other => ServerError::InternalError(other.into()),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let status = match self {
			ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ServerError::InternalError(ref err) => {
				tracing::error!("{:#}", err);
				StatusCode::INTERNAL_SERVER_ERROR
			}
		};
		(status, Json(json!({ "error": self.to_string() }))).into_response()
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use axum::Router;
	use tokio::net::TcpListener;

	/// Serve `router` on an ephemeral local port and return its base URL.
	pub(crate) async fn serve(router: Router) -> String {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, router).await.unwrap();
		});
		format!("http://{addr}")
	}

	/// Base URL of a local port nothing listens on.
	pub(crate) async fn unreachable() -> String {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		drop(listener);
		format!("http://{addr}")
	}
}
