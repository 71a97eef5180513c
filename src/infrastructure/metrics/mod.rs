//! Prometheus Metrics Module
//!
//! Process-wide metrics for the real-time core.
//!
//! # Metrics Collected
//! - Active websocket sessions
//! - Per-session fanout outcomes
//! - Dropped inbound frames by reason
//! - Bus resubscriptions

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

const NAMESPACE: &str = "chat_realtime";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Live sessions held by this process's registry
pub static WEBSOCKET_SESSIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_sessions_active",
            "Number of live websocket sessions in this process",
        )
        .namespace(NAMESPACE),
    )
    .expect("Failed to create WEBSOCKET_SESSIONS_ACTIVE metric")
});

/// Per-session delivery outcomes ("delivered", "failed")
pub static FANOUT_DELIVERIES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "fanout_deliveries_total",
            "Frames queued to sessions by fanout, by outcome",
        )
        .namespace(NAMESPACE),
        &["outcome"],
    )
    .expect("Failed to create FANOUT_DELIVERIES_TOTAL metric")
});

/// Inbound frames that were logged and dropped
pub static FRAMES_DROPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("frames_dropped_total", "Inbound frames dropped, by reason").namespace(NAMESPACE),
        &["reason"],
    )
    .expect("Failed to create FRAMES_DROPPED_TOTAL metric")
});

pub static BUS_RESUBSCRIBES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new(
            "bus_resubscribes_total",
            "Times the bus subscription loop was torn down and retried",
        )
        .namespace(NAMESPACE),
    )
    .expect("Failed to create BUS_RESUBSCRIBES_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(WEBSOCKET_SESSIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_SESSIONS_ACTIVE");
    registry
        .register(Box::new(FANOUT_DELIVERIES_TOTAL.clone()))
        .expect("Failed to register FANOUT_DELIVERIES_TOTAL");
    registry
        .register(Box::new(FRAMES_DROPPED_TOTAL.clone()))
        .expect("Failed to register FRAMES_DROPPED_TOTAL");
    registry
        .register(Box::new(BUS_RESUBSCRIBES_TOTAL.clone()))
        .expect("Failed to register BUS_RESUBSCRIBES_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

pub fn set_active_sessions(count: usize) {
    WEBSOCKET_SESSIONS_ACTIVE.set(count as i64);
}

/// Helper to record the outcome of one fanout
pub fn record_deliveries(delivered: usize, failed: usize) {
    if delivered > 0 {
        FANOUT_DELIVERIES_TOTAL
            .with_label_values(&["delivered"])
            .inc_by(delivered as u64);
    }
    if failed > 0 {
        FANOUT_DELIVERIES_TOTAL
            .with_label_values(&["failed"])
            .inc_by(failed as u64);
    }
}

pub fn record_dropped_frame(reason: &str) {
    FRAMES_DROPPED_TOTAL.with_label_values(&[reason]).inc();
}

pub fn record_bus_resubscribe() {
    BUS_RESUBSCRIBES_TOTAL.inc();
}
