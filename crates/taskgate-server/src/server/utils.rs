use std::ops::RangeInclusive;
use std::result;
use std::time::Duration;
use tokio::signal;

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

const PORT_RANGE: RangeInclusive<u16> = 1..=65535;

pub fn port_in_range(s: &str) -> result::Result<u16, String> {
    let port: u16 = s
        .parse()
        .map_err(|_| format!("`{s}` isn't a port number"))?;
    if PORT_RANGE.contains(&port) {
        Ok(port)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

/// Parse a non-negative number of seconds, e.g. `5` or `0.25`.
pub fn parse_seconds(s: &str) -> result::Result<Duration, String> {
    let seconds: f64 = s
        .parse()
        .map_err(|_| format!("`{s}` isn't a number of seconds"))?;
    Duration::try_from_secs_f64(seconds).map_err(|_| format!("`{s}` isn't a valid duration"))
}
