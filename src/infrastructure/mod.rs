//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Distributed fanout over Redis pub/sub
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod pubsub;
pub mod repositories;
