use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::server::ServerError;

pub mod analyze;
pub mod default;
pub mod probe;
pub mod process;

/// Decode an optional JSON body. An empty body yields `T::default()`.
pub(crate) fn parse_body<T>(body: &Bytes) -> Result<T, ServerError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body)
        .map_err(|err| ServerError::BadRequest(format!("Invalid JSON body: {err}")))
}
