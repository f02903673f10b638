//! relay-client - interactive chat client.
//!
//! Usage: `relay-client <loginId> [host] [port]`.

use relayd::config::{CONFIG_ENV, Config, validate};
use relayd::console::StdoutConsole;
use relayd::handlers::{ChatClient, ClientControl, Flow};
use relayd::state::ClientRuntime;
use relayd::telemetry;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing("warn");

    let config_path = std::env::var_os(CONFIG_ENV);
    let config = Config::load_or_default(config_path.as_ref())?;
    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("invalid configuration ({} errors)", errors.len());
    }

    let mut args = std::env::args().skip(1);
    let Some(login_id) = args.next().filter(|id| !id.trim().is_empty()) else {
        eprintln!("Usage: relay-client <loginId> [host] [port]");
        anyhow::bail!("no login ID specified");
    };
    let host = args.next().unwrap_or_else(|| config.client.host.clone());
    let port = match args.next().map(|arg| arg.parse::<u16>()) {
        None => config.client.port,
        Some(Ok(port)) => port,
        Some(Err(_)) => {
            println!("Invalid port, using default port: {}", config.client.port);
            config.client.port
        }
    };

    let shutdown = CancellationToken::new();
    let client = Arc::new(ChatClient::new(
        Arc::new(ClientRuntime::new(login_id, host, port)),
        Arc::new(StdoutConsole::new()),
    ));
    let control = ClientControl::new(client, config.limits.clone(), shutdown.clone());

    if let Err(e) = control.connect().await {
        error!(error = %e, "Failed to connect");
        println!("Error: Can't setup connection! Terminating client.");
        return Err(e.into());
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

    info!("relay-client stopped");
    Ok(())
}
