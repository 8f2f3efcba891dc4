//! recolor server binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recolor::{server, ColorizationNet};

/// Colorize photographs over HTTP with a pretrained network.
#[derive(Parser, Debug)]
#[command(name = "recolor")]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8000", value_name = "ADDR")]
    bind: SocketAddr,

    /// Directory holding colorization.onnx and pts_in_hull.npy.
    /// Defaults to a `models` directory next to the executable.
    #[arg(long, value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("recolor={log_level},tower_http={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[tokio::main]
async fn run(args: &Args) -> Result<()> {
    let model_dir = match &args.model_dir {
        Some(dir) => dir.clone(),
        None => default_model_dir()?,
    };

    // A broken model directory keeps the process from serving at all
    let net = ColorizationNet::load(&model_dir).context("Failed to load colorization model")?;

    let app = server::router(Arc::new(net));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    tracing::info!("listening on {}", args.bind);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Model artifacts live beside the installed binary, not in an
/// environment-driven location.
fn default_model_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to resolve executable path")?;
    Ok(exe
        .parent()
        .context("Executable has no parent directory")?
        .join("models"))
}
