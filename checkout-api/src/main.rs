use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use checkout_api::{app, middleware::HttpMetrics, AppState};
use checkout_core::OrderRepository;
use checkout_order::{AggregatorConfig, OrderAggregator, ResourceFetcher, WorkerPool};
use checkout_store::{
    Config, DbClient, HttpRemoteClient, InMemoryOrderRepository, PgOrderRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "checkout_api=debug,checkout_order=debug,checkout_store=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting {} on port {}", config.server.service_name, config.server.port);

    let repository: Arc<dyn OrderRepository> = match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Arc::new(PgOrderRepository::new(db.pool.clone()))
        }
        None => {
            tracing::warn!("No database.url configured, orders are kept in memory");
            Arc::new(InMemoryOrderRepository::new())
        }
    };

    let proxy = config.proxy_url();
    if let Some(proxy) = &proxy {
        tracing::info!("Routing outbound calls through proxy {}", proxy);
    }
    let client = HttpRemoteClient::new(proxy.as_deref()).context("Failed to build HTTP client")?;
    let fetcher = ResourceFetcher::new(Arc::new(client), WorkerPool::new(config.worker_pool.size));

    let aggregator_config =
        AggregatorConfig::new(config.payment_uri(), config.shipping_uri(), config.timeout());
    tracing::info!(
        payment = %aggregator_config.payment_uri,
        shipping = %aggregator_config.shipping_uri,
        timeout = ?aggregator_config.timeout,
        "Order aggregator configured"
    );
    let aggregator = OrderAggregator::new(fetcher, repository.clone(), aggregator_config);

    let metrics =
        HttpMetrics::new(&config.server.service_name).context("Failed to register metrics")?;

    let app_state = AppState {
        aggregator: Arc::new(aggregator),
        repository,
        metrics: Arc::new(metrics),
        service_name: config.server.service_name.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
