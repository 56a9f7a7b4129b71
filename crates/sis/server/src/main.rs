//! SIS Server - control plane for managed classroom devices.

use std::net::SocketAddr;

use color_eyre::eyre::WrapErr as _;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("sis-server starting");

    // Storage
    let data_dir = std::env::var("SIS_DATA_DIR").unwrap_or_else(|_| "./_db".to_string());
    let storage =
        sis_storage::FsStorage::new(&data_dir).wrap_err("failed to open data directory")?;

    // Session signing secret. Without a configured secret, sessions do
    // not survive a restart.
    let secret = match std::env::var("SIS_JWT_SECRET") {
        Ok(secret) => secret.into_bytes(),
        Err(_) => {
            tracing::warn!("SIS_JWT_SECRET not set; using an ephemeral signing secret");
            sis_auth::random_signing_secret()
        }
    };
    let sessions = sis_auth::SessionKeys::new(&secret, sis_auth::DEFAULT_TTL_SECS);

    // Control plane
    let plane = sis_service::ControlPlane::new(storage, sessions);
    plane
        .ensure_roles_seeded()
        .wrap_err("failed to seed role table")?;

    // Router
    let app = sis_http::router(plane).layer(TraceLayer::new_for_http());

    // Serve
    let addr: SocketAddr = std::env::var("SIS_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
        .parse()
        .wrap_err("invalid SIS_ADDR")?;
    tracing::info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err("failed to bind")?;

    axum::serve(listener, app).await.wrap_err("server error")?;

    Ok(())
}
