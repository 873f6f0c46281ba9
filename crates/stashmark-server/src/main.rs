use clap::Parser;
use stashmark_core::MemoryBookmarkStore;
use stashmark_server::config::{self, Environment, ServerConfig};
use stashmark_server::logging::init_logging;
use std::path::PathBuf;
use std::sync::Arc;

/// Stashmark bookmark server
#[derive(Parser, Debug)]
#[command(name = "stashmark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on (overrides STASHMARK_ADDRESS)
    #[arg(short, long)]
    address: Option<String>,

    /// Port to listen on (overrides STASHMARK_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Path the app is served under (overrides STASHMARK_ROOT_PATH)
    #[arg(long)]
    root_path: Option<String>,

    /// Read environment variables from this file instead of ./.env
    #[arg(long, value_name = "FILE")]
    env_file: Option<PathBuf>,
}

impl Cli {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(address) = self.address {
            config.address = address;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(root_path) = self.root_path {
            config.root_path = root_path;
        }
        config.normalized()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut cli = Cli::parse();

    match cli.env_file.take() {
        Some(path) => config::load_dotenv_from(path)?,
        None => config::load_dotenv(),
    }

    let env = Environment::current();
    init_logging(&env);

    let config = cli.apply(ServerConfig::from_env()?);
    let addr = config.socket_addr()?;
    tracing::info!(
        environment = %env,
        root_path = %config.root_path,
        version = env!("CARGO_PKG_VERSION"),
        "starting stashmark"
    );

    let store = Arc::new(MemoryBookmarkStore::new());
    let app = stashmark_server::build_app(&config, store)?;

    app.run_with_shutdown(addr, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
