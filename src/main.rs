//! Patronage server entrypoint.
//!
//! Startup order: configuration, tracing, database, runtime settings, outbound
//! queue, HTTP state, workers, then the listener. On SIGINT/SIGTERM the workers
//! are stopped first and the HTTP server drains afterwards.

use std::error::Error;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use patronage::adapters::http::{app_router, AppState, Ports};
use patronage::adapters::notifications::{
    LogTransport, OutboundQueue, OutboundQueueConfig, RedisNotificationTransport,
    TracingDeadLetters,
};
use patronage::adapters::postgres::{
    self, PostgresContentRepository, PostgresEntitlementStore, PostgresInvoiceRepository,
    PostgresReconciliationStore,
};
use patronage::adapters::robokassa::RobokassaGateway;
use patronage::adapters::service_client::{
    CommentsClient, HttpEntitlementGranter, ServiceClient, UsersWalletClient,
};
use patronage::adapters::settings_feed::RedisSettingsFeed;
use patronage::application::handlers::billing::PaymentLinkSettings;
use patronage::application::workers::{
    spawn_worker, CommentsWorker, GoalsWorker, IncomeForwardingWorker, LikesWorker,
    SubscriptionExpiryWorker,
};
use patronage::config::{spawn_settings_writer, AppConfig, RuntimeSettings, SettingsStore};
use patronage::ports::{EntitlementGranter, NotificationTransport, ReconciliationStore};

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        workers = config.workers.enabled,
        redis = config.redis.is_some(),
        "Starting patronage"
    );

    // Database
    let pool = postgres::connect(&config.database).await?;
    if config.database.run_migrations {
        postgres::run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut background: Vec<JoinHandle<()>> = Vec::new();

    // Runtime settings
    let settings = Arc::new(SettingsStore::new(RuntimeSettings::from_config(
        &config.limits,
        &config.payment,
    )));
    let (settings_tx, settings_writer) = spawn_settings_writer(settings.clone(), 64);

    // Redis-backed feed and notification transport, or local fallbacks
    let transport: Arc<dyn NotificationTransport> = match &config.redis {
        Some(redis_config) => {
            let client = redis::Client::open(redis_config.url.as_str())?;
            let conn = client.get_multiplexed_async_connection().await?;
            let feed = RedisSettingsFeed::new(client, redis_config.settings_channel.clone());
            background.push(feed.spawn(settings_tx, shutdown_rx.clone()));
            Arc::new(RedisNotificationTransport::new(
                conn,
                redis_config.notification_channel.clone(),
            ))
        }
        None => {
            tracing::warn!("Redis not configured: settings are static, notifications are only logged");
            drop(settings_tx);
            Arc::new(LogTransport)
        }
    };
    let (queue, queue_task) = OutboundQueue::spawn(
        transport,
        Arc::new(TracingDeadLetters),
        OutboundQueueConfig::default(),
    );
    let queue = Arc::new(queue);

    // HTTP state
    let services = &config.services;
    let remote_granter: Option<Arc<dyn EntitlementGranter>> = match &services.content_url {
        Some(url) => Some(Arc::new(HttpEntitlementGranter::new(ServiceClient::new(
            "content",
            url.clone(),
            services.service_user_id,
            services.timeout(),
        )?))),
        None => None,
    };
    let gateway = RobokassaGateway::new(
        config.payment.credentials(),
        config.payment.api_base_url.clone(),
        settings.clone(),
        services.timeout(),
    )?;
    let entitlements = Arc::new(PostgresEntitlementStore::new(pool.clone()));
    let state = AppState::build(
        Ports {
            invoices: Arc::new(PostgresInvoiceRepository::new(pool.clone())),
            gateway: Arc::new(gateway),
            content: Arc::new(PostgresContentRepository::new(pool.clone())),
            entitlements,
            notifications: queue.clone(),
            remote_granter,
        },
        config.payment.credentials(),
        settings.clone(),
        PaymentLinkSettings {
            payment_link_prefix: config.payment.payment_link_prefix.clone(),
            invoice_ttl_secs: config.payment.invoice_ttl_secs,
        },
    );

    // Workers
    let mut workers: Vec<JoinHandle<()>> = Vec::new();
    if config.workers.enabled {
        let store: Arc<dyn ReconciliationStore> =
            Arc::new(PostgresReconciliationStore::new(pool.clone()));
        let comments = CommentsClient::new(ServiceClient::new(
            "comments",
            services.comments_url.clone(),
            services.service_user_id,
            services.timeout(),
        )?);
        let wallet = UsersWalletClient::new(ServiceClient::new(
            "users",
            services.users_url.clone(),
            services.service_user_id,
            services.timeout(),
        )?);

        let workers_config = &config.workers;
        workers.push(spawn_worker(
            Arc::new(CommentsWorker::new(store.clone(), Arc::new(comments))),
            workers_config.comments_interval(),
            shutdown_rx.clone(),
        ));
        workers.push(spawn_worker(
            Arc::new(LikesWorker::new(store.clone())),
            workers_config.likes_interval(),
            shutdown_rx.clone(),
        ));
        workers.push(spawn_worker(
            Arc::new(GoalsWorker::new(store.clone())),
            workers_config.goals_interval(),
            shutdown_rx.clone(),
        ));
        workers.push(spawn_worker(
            Arc::new(SubscriptionExpiryWorker::new(store.clone())),
            workers_config.subscription_expiry_interval(),
            shutdown_rx.clone(),
        ));
        workers.push(spawn_worker(
            Arc::new(IncomeForwardingWorker::new(store, Arc::new(wallet))),
            workers_config.income_forwarding_interval(),
            shutdown_rx.clone(),
        ));
    }

    // HTTP server
    let addr = config.server.socket_addr()?;
    let app = app_router(state, config.server.request_timeout());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown requested, stopping workers");
            let _ = shutdown_tx.send(true);
            for handle in workers {
                let _ = handle.await;
            }
            tracing::info!("Workers stopped, draining HTTP server");
        })
        .await?;

    // Flush what the handlers queued, then stop the background tasks.
    drop(queue);
    let _ = queue_task.await;
    for handle in background {
        let _ = handle.await;
    }
    let _ = settings_writer.await;
    pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
