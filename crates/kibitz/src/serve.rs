// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kibitz serve`: builds the orchestrator and runs the HTTP gateway.

use kibitz_config::KibitzConfig;
use kibitz_core::KibitzError;
use kibitz_engine::Orchestrator;
use kibitz_gateway::{GatewayState, ServerConfig};
use tracing::info;

use crate::shutdown::install_signal_handler;

/// Runs the gateway until SIGINT or SIGTERM.
pub async fn run_serve(config: KibitzConfig) -> Result<(), KibitzError> {
    init_tracing(&config.server.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        models = config.models.len(),
        "starting kibitz serve"
    );

    let orchestrator = Orchestrator::from_config(&config)?;
    let server = server_config(&config);
    let token = install_signal_handler();

    kibitz_gateway::start_server(&server, GatewayState { orchestrator }, token.cancelled_owned())
        .await?;

    info!("kibitz serve stopped");
    Ok(())
}

fn server_config(config: &KibitzConfig) -> ServerConfig {
    ServerConfig {
        host: config.server.bind_address.clone(),
        port: config.server.port,
        allowed_origins: config.server.allowed_origins.clone(),
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence. Output goes to stderr so `kibitz ask` keeps
/// stdout for frames.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kibitz={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
