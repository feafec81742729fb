use std::sync::Arc;

use salvo::conn::TcpListener;
use salvo::{Listener, Server};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use gatehouse_app::app::router;
use gatehouse_app::shutdown;
use gatehouse_core::clock::SystemClock;
use gatehouse_core::config::load_config;
use gatehouse_db::db::connection::create_pool;
use gatehouse_db::db::migrate::run_migrations;
use gatehouse_db::store::pg::PgStore;
use gatehouse_service::context::AppServices;
use gatehouse_service::seed::seed_defaults;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting gatehouse admin server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.logging.level.as_str()));
    match filter {
        Ok(filter) => {
            if let Err(e) = filter_handle.modify(|current| *current = filter) {
                tracing::warn!(error = %e, "Failed to update log filter from config");
            }
        }
        Err(e) => {
            tracing::warn!(level = %config.logging.level, error = %e, "Invalid log level in config, keeping info");
        }
    }

    let pool = create_pool(&config.database).await?;

    run_migrations(&config.database.url).await?;

    let store = Arc::new(PgStore::new(pool));
    if seed_defaults(store.as_ref(), &config.system).await? {
        tracing::info!("Seeded empty database");
    }

    let services = Arc::new(AppServices::new(
        &config,
        store,
        Arc::new(SystemClock),
    )?);

    match services.revocation.load_from_store().await {
        Ok(cached) => tracing::info!(cached, "Revoked tokens loaded"),
        Err(e) => tracing::error!(error = %e, "Failed to load revoked tokens, continuing"),
    }
    let _sweeper = services.revocation.clone().spawn_sweeper();
    let _janitor = services.spawn_login_state_janitor();

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let server = Server::new(acceptor);
    let handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = shutdown::listen(handle).await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
    });

    tracing::info!("Server listening on {bind_addr}");

    server.serve(router(services, &config.server)).await;

    tracing::info!("Server stopped");

    Ok(())
}
