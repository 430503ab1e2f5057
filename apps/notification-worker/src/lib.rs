//! Notification Worker
//!
//! A background worker that subscribes to task events on the bus and
//! reacts by issuing notification commands.
//!
//! ## Architecture
//!
//! ```text
//! NATS (events.entity.Task.*.*)
//!   ↓ (EventStream<TaskEvent>)
//! NotificationService<PgNotificationRepository>
//!   ↓ (CreateNotification command)
//! PostgreSQL + NATS (events.entity.Notification.*.*)
//! ```
//!
//! One bad event never takes down the subscription loop: handler failures
//! are caught per event and logged with the full event dump.

pub mod service;

use core_config::{
    Environment, FromEnv,
    database::DatabaseConfig,
    nats::NatsConfig,
};
use domain_notifications::PgNotificationRepository;
use domain_tasks::TaskEvent;
use event_sourcing::{DomainEvent, EventStoreClient, Subscription};
use eyre::{Result, WrapErr};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use crate::service::NotificationService;

/// Run the notification worker until SIGINT/SIGTERM or stream closure.
pub async fn run() -> Result<()> {
    core_config::tracing::install_color_eyre();
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    info!("Starting notification worker. Environment: {:?}", environment);

    let db_config = DatabaseConfig::from_env().wrap_err("Failed to load database configuration")?;
    let nats_config = NatsConfig::from_env().wrap_err("Failed to load NATS configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .connect(&db_config.url)
        .await
        .wrap_err("Failed to connect to PostgreSQL")?;
    info!("Connected to PostgreSQL");

    let mut event_store = EventStoreClient::new(&nats_config.url);
    event_store
        .connect()
        .await
        .wrap_err("Failed to connect to the event store")?;

    let subscription =
        Subscription::for_event_class(TaskEvent::EVENT_CLASS).entity_type(TaskEvent::ENTITY_TYPE);
    let mut events = event_store
        .subscribe::<TaskEvent>(&subscription)
        .await
        .wrap_err("Failed to subscribe to task events")?;

    let service = NotificationService::new(pool, PgNotificationRepository::new());

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    info!("Listening for task events");
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("Shutdown requested, draining subscription");
                break;
            }
            event = events.next() => {
                let Some(event) = event else {
                    info!("Event stream closed");
                    break;
                };
                if let Err(err) = service.handle_event(&event_store, &event).await {
                    error!(error = %err, ?event, "failed to handle task event");
                }
            }
        }
    }

    event_store.close_subscriptions();
    event_store
        .disconnect()
        .await
        .wrap_err("Failed to disconnect from the event store")?;

    info!("Notification worker stopped");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        },
    }
}
