use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No workers configured")]
    NoWorkers,

    #[error("Duplicate worker id: {0}")]
    DuplicateWorker(String),

    #[error("Invalid worker spec: {0}")]
    InvalidWorkerSpec(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(f64),

    #[error("Timeout of {requested}s exceeds the maximum of {max}s")]
    TimeoutTooLarge { requested: f64, max: f64 },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
