use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_pricing::{
    HttpLocationProvider, LocationResolver, PgLockRepository, PricingCatalog, PricingService,
    ServiceOptions,
};
use migration::Migrator;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    observability::init_metrics()?;

    // Catalog problems must stop startup before the listener binds
    let catalog = PricingCatalog::load(&config.pricing)?;

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
    database::postgres::run_migrations::<Migrator>(&db, config.app.name).await?;

    let provider = HttpLocationProvider::new(&config.location)?;
    let pricing = PricingService::new(
        &catalog,
        PgLockRepository::new(db.clone()),
        LocationResolver::new(provider, config.location.timeout),
        ServiceOptions::from(&config.pricing),
    )?;

    let state = AppState { config, db, pricing };

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ops_router(state.clone()));

    info!(
        port = state.config.server.port,
        special_region = %catalog.special_region,
        "Starting pricing API"
    );

    let server_config = state.config.server.clone();
    let db = state.db.clone();
    drop(state);

    create_production_app(
        app,
        &server_config,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing database connections");
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Pricing API shutdown complete");
    Ok(())
}
