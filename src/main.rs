//! Service entry point: configuration, storage, HTTP router, and the
//! periodic expiry sweep.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use vpn_api::adapters::http::payments::{payments_router, PaymentsAppState};
use vpn_api::adapters::iap::{
    AppleIapConfig, AppleReceiptValidator, GoogleIapConfig, GoogleReceiptValidator,
    ProviderDispatchValidator,
};
use vpn_api::adapters::postgres::{
    PostgresPaymentLedger, PostgresSubscriptionStore, PostgresTariffReader, PostgresUserDirectory,
};
use vpn_api::application::handlers::payments::SweepExpiredSubscriptionsHandler;
use vpn_api::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.iap.verify_timeout_secs))
        .build()?;

    let apple = Arc::new(AppleReceiptValidator::new(
        AppleIapConfig::new(config.iap.apple_shared_secret.clone()),
        http_client.clone(),
    ));
    let google = Arc::new(GoogleReceiptValidator::new(
        GoogleIapConfig::new(config.iap.google_access_token.clone()),
        http_client,
    ));

    let subscription_store = Arc::new(PostgresSubscriptionStore::new(pool.clone()));

    let state = PaymentsAppState {
        receipt_validator: Arc::new(ProviderDispatchValidator::new(apple, google)),
        catalog: Arc::new(config.iap.product_catalog()),
        tariff_reader: Arc::new(PostgresTariffReader::new(pool.clone())),
        user_directory: Arc::new(PostgresUserDirectory::new(pool.clone())),
        ledger: Arc::new(PostgresPaymentLedger::new(pool.clone())),
        subscription_store: subscription_store.clone(),
        default_bundle_id: config.iap.default_bundle_id.clone(),
    };

    spawn_periodic_sweep(subscription_store, config.iap.sweep_interval_secs);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", payments_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .with_state(state);

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// Safety net behind the per-webhook sweep: catches grants that lapse while
/// no webhooks arrive.
fn spawn_periodic_sweep(
    store: Arc<PostgresSubscriptionStore>,
    interval_secs: u64,
) {
    let handler = SweepExpiredSubscriptionsHandler::new(store);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // First tick fires immediately; skip it so startup isn't serialized
        // behind a sweep.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = handler.handle().await {
                tracing::warn!(error = %e, "periodic expiry sweep failed");
            }
        }
    });
}
