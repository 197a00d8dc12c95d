//! Liveness and health endpoints.

use std::time::Instant;

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{db::DbPool, error::AppError};

/// `GET /healthz`: answers `OK` while the process runs.
pub async fn liveness() -> &'static str {
    "OK"
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    /// Rows in the ledger, read to prove the schema is in place
    pub accounts: i64,
    pub db_latency_ms: u64,
    pub pool_connections: u32,
    pub pool_idle: usize,
    pub checked_at: DateTime<Utc>,
}

/// `GET /health`: counts ledger rows and reports pool usage.
///
/// A failed query is answered by `AppError`, i.e. `500` with
/// `internal_error` and no details.
pub async fn health_check(State(pool): State<DbPool>) -> Result<Json<HealthReport>, AppError> {
    let started = Instant::now();
    let accounts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
        .fetch_one(&pool)
        .await?;

    Ok(Json(HealthReport {
        status: "ok",
        accounts,
        db_latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        pool_connections: pool.size(),
        pool_idle: pool.num_idle(),
        checked_at: Utc::now(),
    }))
}
