//! Deposit Ledger Bot - Main Application Entry Point
//!
//! Runs the Telegram bot, the daily accrual scheduler and a small HTTP
//! server (health checks and, in push mode, the webhook) in one process.
//!
//! # Architecture
//!
//! - **Bot**: teloxide `Dispatcher`, updates handled one at a time
//! - **Web Framework**: Axum (health endpoints, teloxide's webhook route)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Scheduling**: tokio-cron-scheduler (daily accrual, keep-alive)
//!
//! # Startup Flow
//!
//! 1. Load configuration and the plan catalog
//! 2. Create database connection pool and run migrations
//! 3. Start the scheduler
//! 4. Register the webhook, or switch to long polling
//! 5. Start the HTTP server, then run the dispatcher until Ctrl-C

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use teloxide::{
    prelude::*,
    update_listeners::{Polling, webhooks},
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use deposit_ledger_bot::{
    bot::{self, BotState, conversation::Sessions},
    config::{Catalog, Config, WEBHOOK_PATH},
    db, handlers,
    services::{
        scheduler,
        verification::{ExplorerEndpoints, VerificationDispatcher},
    },
};

/// Long-poll timeout for `getUpdates`.
const POLL_TIMEOUT: Duration = Duration::from_secs(10);

async fn serve<F>(listener: TcpListener, app: Router, shutdown: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        tracing::error!(error = %e, "HTTP server stopped");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG, defaults to "info"; teloxide's `log` records are
    // forwarded to the same subscriber
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let catalog = Catalog::load(&config.catalog_path)
        .with_context(|| format!("loading catalog from {}", config.catalog_path))?;
    let catalog = Arc::new(catalog);
    tracing::info!(plans = catalog.plans.len(), "Catalog loaded");

    let webhook_url = config.webhook_url()?;
    let webhook_secret = config.webhook_secret()?.map(str::to_string);
    let support_url = config.support_url()?;

    let pool = db::connect(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::migrate(&pool).await?;

    let verifier = VerificationDispatcher::new(
        config.explorer_keys(),
        ExplorerEndpoints::default(),
        config.explorer_timeout(),
    )?;

    let telegram = Bot::new(&config.bot_token);
    let state = Arc::new(BotState {
        bot: telegram.clone(),
        pool: pool.clone(),
        catalog: catalog.clone(),
        verifier,
        sessions: Sessions::new(),
        admin_id: config.admin_id,
        support_url,
    });
    let mut dispatcher = bot::dispatcher(state);

    // Keep the scheduler alive for the lifetime of the process
    let _scheduler = scheduler::start(pool.clone(), catalog, &config.accrual_cron).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let tcp = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    match webhook_url {
        Some(url) => {
            let mut options = webhooks::Options::new(addr, url.clone())
                .path(WEBHOOK_PATH.to_string())
                .drop_pending_updates();
            if let Some(secret) = webhook_secret {
                // Already checked against Telegram's alphabet by Config
                options = options.secret_token(secret);
            }

            let (listener, stopped, webhook) = webhooks::axum_to_router(telegram, options)
                .await
                .context("registering webhook")?;
            tracing::info!(%url, "Running in webhook mode");

            tokio::spawn(serve(tcp, handlers::webhook_router(pool, webhook), stopped));
            dispatcher
                .try_dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("Webhook listener error"),
                )
                .await
                .context("fetching bot identity")?;
        }
        None => {
            let listener = Polling::builder(telegram)
                .timeout(POLL_TIMEOUT)
                .drop_pending_updates()
                .delete_webhook()
                .await
                .build();
            tracing::info!("Running in polling mode");

            tokio::spawn(serve(tcp, handlers::router(pool), std::future::pending()));
            dispatcher
                .try_dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("Long polling error"),
                )
                .await
                .context("fetching bot identity")?;
        }
    }

    tracing::info!("Dispatcher stopped");
    Ok(())
}
