// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kibitz - a multi-provider chess move broker.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod ask;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kibitz_config::KibitzConfig;

/// Kibitz - a multi-provider chess move broker.
#[derive(Parser, Debug)]
#[command(name = "kibitz", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Run one exchange and print its canonical frames to stdout.
    Ask(ask::AskArgs),
}

fn load_config(path: Option<&PathBuf>) -> KibitzConfig {
    let loaded = match path {
        Some(path) => kibitz_config::load_and_validate_path(path),
        None => kibitz_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            kibitz_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => {
            let config = load_config(cli.config.as_ref());
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Ask(args)) => {
            let config = load_config(cli.config.as_ref());
            match ask::run_ask(config, args).await {
                Ok(true) => {}
                Ok(false) => std::process::exit(1),
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => {
            println!("kibitz: use --help for available commands");
        }
    }
}
