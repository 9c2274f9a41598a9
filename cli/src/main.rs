use anyhow::Result;
use clap::{Parser, Subcommand};
use relay_core::config;
use std::sync::Arc;

mod chat;
mod onboard;
mod runtime;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "relay - a tool-calling chat agent for local models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive setup; writes ~/.relay/config.toml
    Onboard,
    /// Chat in the terminal, or answer a single message with -m
    Chat {
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Serve POST /api/agent over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Chat { message: None }
        }
    });

    match command {
        Commands::Onboard => {
            let onboard_config = onboard::run_onboard().map_err(|e| {
                eprintln!("❌ Onboarding failed: {}", e);
                anyhow::anyhow!("Onboarding failed: {}", e)
            })?;
            config::save_config(&onboard_config)?;
        }
        Commands::Chat { message } => {
            init_tracing("warn");
            let config = config::Config::load_or_init()?;
            config.validate()?;
            let agent = runtime::build_agent(&config)?;

            match message {
                Some(msg) => chat::run_once(&agent, &msg).await,
                None => chat::run_interactive(&agent).await?,
            }
        }
        Commands::Serve { host, port } => {
            init_tracing("info,tower_http=debug");
            let mut config = config::Config::load_or_init()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let agent = Arc::new(runtime::build_agent(&config)?);
            relay_core::server::serve(agent, &config.server.address()).await?;
        }
    }

    Ok(())
}
