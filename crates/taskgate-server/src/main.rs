use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod server;
use server::utils::{self, port_in_range};
use server::{init_coordinator_router, init_worker_router, CoordinatorArgs, WorkerArgs};

#[derive(Debug, Parser)]
#[command(version, about = "Fan-out task dispatch gateway")]
pub struct App {
    #[command(subcommand)]
    pub role: Role,

    #[arg(value_parser = port_in_range)]
    #[clap(short, long, env = "PORT", default_value = "8080", global = true)]
    pub port: u16,

    #[clap(long, env = "HOST", default_value = "0.0.0.0", global = true)]
    pub host: IpAddr,
}

#[derive(Debug, Subcommand)]
pub enum Role {
    /// Accept tasks on `/analyze` and fan them out to every worker.
    Coordinator(CoordinatorArgs),
    /// Process tasks sent by the coordinator on `/process`.
    Worker(WorkerArgs),
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<ExitCode> {
    let args = App::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level.
                "taskgate=debug,taskgate_server=debug,tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let router = match &args.role {
        Role::Coordinator(coordinator_args) => {
            let (config, address) = coordinator_args.config()?;
            tracing::info!(
                "Starting {} coordinator, configured workers: {:?}",
                config.identity,
                config.registry.ids().collect::<Vec<_>>()
            );
            init_coordinator_router(config, address)?
        }
        Role::Worker(worker_args) => {
            let config = worker_args.config();
            tracing::info!(
                "Starting {} worker, capability: {}",
                config.identity,
                taskgate::worker::describe_role(&config.identity)
            );
            init_worker_router(config)?
        }
    };

    let listener = TcpListener::bind(SocketAddr::new(args.host, args.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(utils::shutdown_signal())
        .await?;

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::time::Duration;

    #[test]
    fn test_cli_is_valid() {
        App::command().debug_assert();
    }

    #[test]
    fn test_parse_coordinator() -> Result<()> {
        let app = App::try_parse_from([
            "taskgate-server",
            "coordinator",
            "--workers",
            "research-agent,code=http://127.0.0.1:9001",
            "--default-timeout",
            "2.5",
            "--port",
            "9000",
        ])?;
        assert_eq!(app.port, 9000);

        let Role::Coordinator(coordinator_args) = app.role else {
            panic!("expected coordinator role");
        };
        let (config, _) = coordinator_args.config()?;
        assert_eq!(config.default_timeout, Duration::from_millis(2500));
        assert_eq!(config.registry.len(), 2);
        assert_eq!(
            config.registry.get("code").unwrap().process_url(),
            "http://127.0.0.1:9001/process"
        );
        Ok(())
    }

    #[test]
    fn test_parse_worker() -> Result<()> {
        let app = App::try_parse_from([
            "taskgate-server",
            "worker",
            "--identity",
            "research",
            "--domain",
            "svc.local",
        ])?;

        let Role::Worker(worker_args) = app.role else {
            panic!("expected worker role");
        };
        let config = worker_args.config();
        assert_eq!(config.identity, "research");
        assert_eq!(config.address.base_url("code-agent"), "http://code-agent.svc.local:8080");
        Ok(())
    }

    #[test]
    fn test_default_timeout_above_max_is_rejected() -> Result<()> {
        let app = App::try_parse_from([
            "taskgate-server",
            "coordinator",
            "--default-timeout",
            "30",
            "--max-timeout",
            "10",
        ])?;

        let Role::Coordinator(coordinator_args) = app.role else {
            panic!("expected coordinator role");
        };
        assert!(coordinator_args.config().is_err());
        Ok(())
    }
}
