//! WebSocket Protocol Handler
//!
//! Real-time connections: handshake authentication, inbound frame parsing
//! and dispatch into the real-time hub.

pub mod auth;
pub mod dispatch;
pub mod handler;
pub mod messages;

pub use auth::{authenticate, Claims};
pub use dispatch::FrameDispatcher;
pub use handler::ws_handler;
pub use messages::InboundFrame;
