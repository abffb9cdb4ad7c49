use std::future::IntoFuture as _;

use application::{log, router, Args, Config};
use service::{
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    log::init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args {
        config,
        migrate_only,
    } = Args::parse().map_err(|e| {
        tracing::error!("failed to parse command line arguments: {e}");
    })?;

    let Config {
        postgres,
        service,
        server,
        log: log_config,
    } = Config::new(config).map_err(|e| {
        tracing::error!("failed to load `Config`: {e}");
    })?;

    log::set_max_level(log_config.level);

    let mut postgres = Postgres::new(&postgres.into()).map_err(|e| {
        tracing::error!("failed to initialize `Postgres` client: {e}");
    })?;

    let report = migrations::runner()
        .run_async(&mut postgres)
        .await
        .map_err(|e| {
            tracing::error!("failed to run database migrations: {e}");
        })?;
    tracing::info!(
        "applied {} database migrations",
        report.applied_migrations().len(),
    );
    if migrate_only {
        return Ok(());
    }

    let cors = server.cors.layer().map_err(|e| {
        tracing::error!("invalid CORS origin: {e}");
    })?;
    let (service, background) = Service::new(service.into(), postgres);
    let app = router(service, cors);

    let listener = TcpListener::bind((server.host.clone(), server.port))
        .await
        .map_err(|e| {
            tracing::error!(
                "failed to listen on `{}:{}`: {e}",
                server.host,
                server.port,
            );
        })?;
    tracing::info!("listening on `{}:{}`", server.host, server.port);

    let serve = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {e}");
            }
            tracing::info!("shutting down");
        })
        .into_future();

    tokio::select! {
        res = serve => res.map_err(|e| {
            tracing::error!("webserver failed: {e}");
        }),
        res = background.into_future() => res.map_err(|e| {
            tracing::error!("background task failed: {e}");
        }),
    }
}
