//! Presentation Layer
//!
//! HTTP routes and the websocket protocol handler.

pub mod http;
pub mod middleware;
pub mod websocket;
