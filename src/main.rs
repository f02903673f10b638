//! relayd - relay server with an operator console.
//!
//! Usage: `relayd [port]`. The config file path is read from `RELAYD_CONFIG`.

use relayd::config::{CONFIG_ENV, Config, validate};
use relayd::console::StdoutConsole;
use relayd::handlers::{Flow, RelayServer, ServerControl};
use relayd::state::{ConnectionRegistry, ServerRuntime};
use relayd::{http, metrics, telemetry};
use relay_proto::SERVER_PREFIX;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing("info");

    let config_path = std::env::var_os(CONFIG_ENV);
    let config = Config::load_or_default(config_path.as_ref()).map_err(|e| {
        error!(path = ?config_path, error = %e, "Failed to load config");
        e
    })?;
    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("invalid configuration ({} errors)", errors.len());
    }

    let console = Arc::new(StdoutConsole::with_prefix(SERVER_PREFIX));

    let port = match std::env::args().nth(1).map(|arg| arg.parse::<u16>()) {
        Some(Ok(port)) => port,
        _ => {
            println!(
                "No valid port specified, so using default port: {}",
                config.server.port
            );
            config.server.port
        }
    };

    metrics::init();
    let shutdown = CancellationToken::new();
    if config.server.metrics_port != 0 {
        tokio::spawn(http::run_http_server(
            config.server.metrics_port,
            shutdown.clone(),
        ));
    }

    let relay = Arc::new(RelayServer::new(
        ConnectionRegistry::new(config.server.unique_logins),
        Arc::new(ServerRuntime::new(port)),
        console,
    )
    .with_max_line_len(config.limits.max_line_len));
    let control = ServerControl::new(
        relay,
        config.server.bind,
        config.limits.clone(),
        shutdown.clone(),
    );

    info!(port, bind = %config.server.bind, "Starting relayd");
    if let Err(e) = control.start().await {
        error!(error = %e, "Failed to start listening");
        anyhow::bail!("Can't setup connection! Terminating server: {e}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if control.handle_line(&line).await == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => {
                    info!("Console closed, shutting down");
                    control.handle_line("#quit").await;
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Unexpected error while reading from console");
                    control.handle_line("#quit").await;
                    break;
                }
            },
        }
    }

    info!("relayd stopped");
    Ok(())
}
