use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use search_core::{Config, Engine};
use search_server::build_app;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: String,
    /// JSON config file; defaults apply when it does not exist
    #[arg(long, default_value = "./config.json")]
    config: String,
    /// Stopword list, one word per line (default: <index>/stop_words.txt)
    #[arg(long)]
    stopwords: Option<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = Config::load(&args.config).with_context(|| format!("loading config {}", args.config))?;
    let engine = match &args.stopwords {
        Some(path) => Engine::open_with_stopwords(&args.index, path, config),
        None => Engine::open(&args.index, config),
    }
    .with_context(|| format!("opening index {}", args.index))?;
    let app: Router = build_app(Arc::new(engine), Duration::from_secs(args.timeout_secs));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
