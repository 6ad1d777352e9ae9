use std::{process, sync::Arc};

use recensio::{
    application::{
        aggregate::RatingAggregator,
        error::AppError,
        products::ProductCatalogService,
        repos::{ProductsRepo, ProductsWriteRepo, ReviewsRepo, ReviewsWriteRepo},
        reviews::ReviewLifecycleService,
    },
    cache::{CacheCoherenceManager, CacheConfig, MemoryCache},
    config,
    infra::{db::PostgresRepositories, error::InfraError, http, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
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
    let (_cli, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    let repositories = init_repositories(&settings).await?;
    let state = build_api_state(repositories, &settings);

    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.listen_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(addr = %settings.server.listen_addr, "recensio listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_api_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> http::ApiState {
    let reviews_repo: Arc<dyn ReviewsRepo> = repositories.clone();
    let reviews_write_repo: Arc<dyn ReviewsWriteRepo> = repositories.clone();
    let products_repo: Arc<dyn ProductsRepo> = repositories.clone();
    let products_write_repo: Arc<dyn ProductsWriteRepo> = repositories.clone();

    let cache_config = CacheConfig::from(&settings.cache);
    let backend = Arc::new(MemoryCache::new(&cache_config));
    let cache = Arc::new(CacheCoherenceManager::new(cache_config, backend));

    let aggregator = Arc::new(RatingAggregator::new(
        reviews_repo.clone(),
        products_write_repo.clone(),
        cache.clone(),
    ));

    let reviews = Arc::new(ReviewLifecycleService::new(
        reviews_repo,
        reviews_write_repo,
        products_repo.clone(),
        aggregator,
        cache.clone(),
    ));

    let products = Arc::new(ProductCatalogService::new(
        products_repo,
        products_write_repo,
        cache,
    ));

    http::ApiState { products, reviews }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install shutdown signal handler");
    }
}
