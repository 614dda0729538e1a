//! meterline exporter
//!
//! - Config: `meterline.yaml`, or the path in `METERLINE_CONFIG`
//! - Metrics endpoint: `server.metrics_path` (default `/metrics`)
//! - Liveness: `/healthz`

use std::error::Error;
use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use meterline_http::{app_state, config, obs, router};

const DEFAULT_CONFIG_PATH: &str = "meterline.yaml";

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "meterline-exporter failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let path = std::env::var("METERLINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.server.listen.parse()?;
    let metrics_path = cfg.server.metrics_path.clone();

    let registry = meterline_core::global();
    obs::register_process_metrics(&registry)?;

    let state = app_state::AppState::new(cfg, registry)?;
    let app = router::build_router(state);

    tracing::info!(%listen, %metrics_path, config = %path, "meterline-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app).await?;
    Ok(())
}
