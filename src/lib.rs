//! # Chat Realtime Library
//!
//! The real-time core of a chat/voice backend:
//! - Connection registry and presence derived from it
//! - Channel broadcast, per-user routing and call-signal relay
//! - Voice channel rosters
//! - Local or Redis pub/sub backed fanout across processes
//! - WebSocket protocol handler wiring frames to persistence and fanout
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Persisted entities and repository traits
//! - **Application Layer**: The real-time hub and its fanout interface
//! - **Infrastructure Layer**: PostgreSQL repositories, Redis bus, metrics
//! - **Presentation Layer**: HTTP routes and the WebSocket handler
//!
//! ## Module Structure
//!
//! ```text
//! chat_realtime/
//! +-- config/         Configuration management
//! +-- domain/         Entities and repository traits
//! +-- application/    Registry, presence, voice, fanout
//! +-- infrastructure/ Database, pub/sub and metrics
//! +-- presentation/   HTTP routes and WebSocket handler
//! +-- shared/         Error types
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Real-time core
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared error types
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
