use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod settings;
mod views;

use api::build_router;
use app_state::AppState;
use settings::load_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    let state = AppState::from_settings(&settings).await?;
    let app = build_router(state);

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, storage = ?settings.storage, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
