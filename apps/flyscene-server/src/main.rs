use clap::Parser;
use flyscene_http::{DEFAULT_PORT, ServerConfig, ServerMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flyscene-server", about = "Serve the flyscene demo over HTTP")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Run mode; `production` serves the built frontend
    #[arg(long, env = "NODE_ENV")]
    mode: Option<String>,

    /// Static asset directory (production only)
    #[arg(long, default_value = "public")]
    public_dir: PathBuf,

    /// Frontend build directory (production only)
    #[arg(long, default_value = "frontend")]
    frontend_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else {
        "info,tower_http=debug"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = ServerConfig {
        port: cli.port,
        mode: ServerMode::from_node_env(cli.mode.as_deref()),
        public_dir: cli.public_dir,
        frontend_dir: cli.frontend_dir,
    };
    tracing::info!("flyscene-server starting");
    flyscene_http::serve(config).await?;

    Ok(())
}
