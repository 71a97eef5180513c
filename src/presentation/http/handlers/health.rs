//! Health checks
//!
//! `/health` and `/health/live` only prove the process answers. `/health/ready`
//! checks the collaborators the real-time core depends on: PostgreSQL for
//! frame persistence, Redis when the bus carries the fanout, and the hub itself.

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::FanoutMode;
use crate::startup::AppState;

const DATABASE_BUDGET: Duration = Duration::from_millis(100);
const BUS_BUDGET: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Outcome of one dependency check.
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RealtimeHealth {
    pub fanout: FanoutMode,
    pub active_sessions: usize,
    pub online_users: usize,
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: CheckResult,
    /// Absent with the local fanout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<CheckResult>,
    pub realtime: RealtimeHealth,
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: HealthStatus,
    pub version: &'static str,
    pub checks: ReadinessChecks,
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy", "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn liveness() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}

/// 503 only when the database is down; a slow or lost bus degrades
/// cross-process fanout but local sessions keep working.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let database = timed_check(
        DATABASE_BUDGET,
        sqlx::query("SELECT 1").execute(&state.db),
    )
    .await;

    let redis = match state.redis.clone() {
        Some(mut conn) => Some(
            timed_check(BUS_BUDGET, async move {
                redis::cmd("PING").query_async::<String>(&mut conn).await
            })
            .await,
        ),
        None => None,
    };

    let registry = state.realtime.registry();
    let realtime = RealtimeHealth {
        fanout: state.realtime.fanout_mode(),
        active_sessions: registry.session_count(),
        online_users: registry.online_user_ids().len(),
    };

    let status = overall(&database, redis.as_ref());
    let code = if status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        code,
        Json(Readiness {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks: ReadinessChecks {
                database,
                redis,
                realtime,
            },
        }),
    )
}

/// Time `check`; over `budget` counts as degraded.
async fn timed_check<T, E: Display>(
    budget: Duration,
    check: impl Future<Output = Result<T, E>>,
) -> CheckResult {
    let started = Instant::now();
    match check.await {
        Ok(_) => {
            let elapsed = started.elapsed();
            CheckResult {
                status: if elapsed < budget {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Degraded
                },
                latency_ms: Some(elapsed.as_millis() as u64),
                message: None,
            }
        }
        Err(e) => CheckResult {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some(e.to_string()),
        },
    }
}

fn overall(database: &CheckResult, redis: Option<&CheckResult>) -> HealthStatus {
    match (database.status, redis.map(|r| r.status)) {
        (HealthStatus::Unhealthy, _) => HealthStatus::Unhealthy,
        (HealthStatus::Healthy, None | Some(HealthStatus::Healthy)) => HealthStatus::Healthy,
        _ => HealthStatus::Degraded,
    }
}
