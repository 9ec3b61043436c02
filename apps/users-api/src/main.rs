//! Users API - REST server

use axum_helpers::server::{create_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod api;
mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let routes = api::routes(&config).await?;

    let router = create_router::<openapi::ApiDoc>(routes.api, &config.server)?;
    let app = router
        .merge(health_router(config.app))
        .merge(routes.ready);

    info!(
        store = ?config.store,
        "Starting Users API on port {}",
        config.server.port
    );

    create_app(app, &config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
