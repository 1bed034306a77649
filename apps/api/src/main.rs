mod config;
mod errors;
mod layout;
mod preview;
mod programme;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::preview::verify_a5_dimensions;
use crate::preview::A5;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Playbill v{}", env!("CARGO_PKG_VERSION"));

    config.ensure_dirs()?;
    info!(
        uploads = %config.upload_dir.display(),
        theme_assets = %config.theme_assets_dir.display(),
        "storage directories ready"
    );

    let dimensions = verify_a5_dimensions();
    if dimensions.is_correct {
        info!(
            width_px = dimensions.width_px,
            height_px = dimensions.height_px,
            "A5 preview dimensions verified"
        );
    } else {
        tracing::warn!(
            difference = dimensions.difference,
            "A5 preview box does not match the paper ratio"
        );
    }

    let state = AppState {
        config: config.clone(),
        template: A5,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
