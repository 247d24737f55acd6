use std::{process, sync::Arc};

use storefront::{
    application::{error::AppError, maintenance::MaintenanceService, repos::RepositorySet},
    cache::{self, CacheClient, CacheConfig},
    config,
    infra::{
        cache_warmer::CacheWarmer,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState, session},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Initialize(_) => run_initialize(settings).await,
    }
}

struct Stores {
    repos: RepositorySet,
    cache: CacheClient,
    cache_config: CacheConfig,
}

async fn init_stores(settings: &config::Settings) -> Result<Stores, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    let cache_config = CacheConfig::from(&settings.cache);
    let store = cache::connect(&cache_config)
        .await
        .map_err(|err| AppError::from(InfraError::cache(err.to_string())))?;
    info!(
        target = "storefront::bootstrap",
        backend = cache_config.backend.name(),
        persist_comments = cache_config.persist_comments,
        "cache store ready"
    );

    Ok(Stores {
        repos: RepositorySet::from_shared(Arc::new(PostgresRepositories::new(pool))),
        cache: CacheClient::new(store),
        cache_config,
    })
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let stores = init_stores(&settings).await?;
    let warmer = Arc::new(CacheWarmer::new(&stores.repos, stores.cache.clone()));

    // Populate before binding so no request observes half-built lists.
    if stores.cache_config.warm_on_startup {
        warmer.populate().await?;
    } else {
        warn!(
            target = "storefront::bootstrap",
            "startup cache population disabled"
        );
    }

    let state = HttpState::new(
        &stores.repos,
        stores.cache,
        warmer,
        &stores.cache_config,
        session::session_key(&settings.session.secret),
    );

    serve_http(&settings, state).await
}

async fn run_initialize(settings: config::Settings) -> Result<(), AppError> {
    let stores = init_stores(&settings).await?;
    let shared_cache = stores.cache_config.backend.is_shared();
    let warmer = Arc::new(CacheWarmer::new(&stores.repos, stores.cache));
    let maintenance = MaintenanceService::new(stores.repos.maintenance.clone(), warmer);

    // A memory cache dies with this process; the server populates its own on startup.
    if !shared_cache {
        let reset = maintenance.reset().await?;
        warn!(
            target = "storefront::initialize",
            backend = stores.cache_config.backend.name(),
            "cache population skipped, backend is local to this process"
        );
        info!(
            target = "storefront::initialize",
            users_removed = reset.users,
            products_removed = reset.products,
            comments_removed = reset.comments,
            histories_removed = reset.histories,
            "Finish"
        );
        return Ok(());
    }

    let report = maintenance.initialize().await?;
    info!(
        target = "storefront::initialize",
        users_removed = report.reset.users,
        products_removed = report.reset.products,
        comments_removed = report.reset.comments,
        histories_removed = report.reset.histories,
        entries_written = report.warm.entries_written(),
        "Finish"
    );
    Ok(())
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "storefront::bootstrap",
        addr = %settings.server.addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            target = "storefront::bootstrap",
            error = %err,
            "failed to listen for shutdown signal"
        );
        std::future::pending::<()>().await;
    }
    info!(target = "storefront::bootstrap", "shutdown requested");
}
