//! demo-svc server binary.
//!
//! - Canned endpoints: /v1/ok, /v1/user-error, /v1/server-error
//! - Prometheus scrape endpoint: /metrics
//! - Optional `.env` file, then YAML config and environment overrides
//! - Graceful shutdown on Ctrl-C / SIGTERM

use tracing_subscriber::{fmt, EnvFilter};

use demo_svc_core::env;
use demo_svc_core::error::{DemoSvcError, Result};
use demo_svc_server::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.code().as_str(), "demo-svc failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    env::load_dotenv();
    let cfg = config::load()?;
    let listen = cfg.server.listen_addr()?;

    let state = AppState::new(cfg);
    let app = router::build_router(state.clone());

    tracing::info!(%listen, version = state.version(), "demo-svc starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| DemoSvcError::Io(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| DemoSvcError::Io(format!("server failed: {e}")))?;

    tracing::info!("demo-svc stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.metrics().set_draining();
    tracing::info!("shutdown signal received, draining");
}
