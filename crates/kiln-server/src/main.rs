//! Kiln training service.
//!
//! HTTP surface for background training jobs: submit with `POST /train`,
//! poll with `GET /status/{model_id}`.

use clap::Parser;
use kiln_orchestrator::{spawn_worker, JobQueue, PipelineConfig};
use kiln_server::{router, AppState};
use kiln_training::JobStore;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kiln-server", version, about = "Kiln background training service")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Directory that receives `.kiln/artifacts/<job_id>/` trees.
    #[arg(short = 'w', long, default_value = ".")]
    workspace: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = JobStore::new();
    let (queue, receiver) = JobQueue::unbounded();
    let config = PipelineConfig { workspace_root: args.workspace, ..PipelineConfig::default() };
    spawn_worker(receiver, store.clone(), config);

    let app = router(AppState { store, queue }).layer(TraceLayer::new_for_http());
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Kiln training service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
