//! HTTP endpoints served next to the bot.
//!
//! - `GET /healthz`: fixed liveness answer
//! - `GET /health`: database round trip with pool figures
//! - `POST /telegram/webhook`: Telegram updates, only in push mode
//!
//! The webhook route itself belongs to teloxide's update listener, which
//! checks the secret token and feeds the dispatcher. It is mounted here so
//! both share one port.

/// Liveness and health endpoints
pub mod health;

use std::convert::Infallible;

use axum::{
    Router,
    extract::Request,
    response::IntoResponse,
    routing::get,
};
use tower::Service;
use tower_http::trace::TraceLayer;

use crate::{config::WEBHOOK_PATH, db::DbPool};

fn routes(pool: DbPool) -> Router {
    Router::new()
        .route("/healthz", get(health::liveness))
        .route("/health", get(health::health_check))
        .with_state(pool)
}

/// Router for polling mode: health endpoints only.
pub fn router(pool: DbPool) -> Router {
    routes(pool).layer(TraceLayer::new_for_http())
}

/// Router for push mode: health endpoints plus the webhook service
/// returned by teloxide's listener.
pub fn webhook_router<W>(pool: DbPool, webhook: W) -> Router
where
    W: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
    W::Response: IntoResponse,
    W::Future: Send + 'static,
{
    routes(pool)
        .route_service(WEBHOOK_PATH, webhook)
        .layer(TraceLayer::new_for_http())
}
