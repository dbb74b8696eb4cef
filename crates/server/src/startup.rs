use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::{AppConfig, ServerConfig};
use dotenvy::dotenv;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use service::image_url::ImageUrls;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, ServerState};

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}

/// Serve `app` until `shutdown` resolves. In-flight requests, including
/// uploads still waiting on their create transaction, run to completion.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server drained and stopped");
    Ok(())
}

/// Public entry: build the app and run the HTTP server until a shutdown signal
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_or_env()?;
    common::env::ensure_uploads_dir(&cfg.uploads.dir).await?;

    // DB connection
    let db = connect_with_config(&DatabaseConfig::from_app(&cfg.database)).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!("database migrations applied");
    }

    let state = ServerState::new(db, ImageUrls::new(cfg.uploads.public_url.clone()), &cfg.uploads.dir);
    let app: Router = routes::build_router(state, build_cors(), cfg.uploads.max_bytes);

    // Bind and serve
    let addr = bind_addr(&cfg.server)?;
    info!(%addr, public_url = %cfg.uploads.public_url, uploads_dir = %cfg.uploads.dir, "starting ecoleta server");
    let listener = TcpListener::bind(addr).await?;
    serve(listener, app, shutdown_signal()).await
}
