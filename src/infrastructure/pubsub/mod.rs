//! Pub/Sub Module
//!
//! Redis-backed distributed fanout.
//!
//! # Architecture
//!
//! ```text
//! +-------------------+        PUBLISH channel:<id> / user:<id> / broadcast
//! |   RedisFanout     | ------------------------------+
//! +-------------------+                               |
//!                                                     v
//!                                            +-----------------+
//!                                            |      Redis      |
//!                                            +-----------------+
//!                                                     |
//! +-------------------+   PSUBSCRIBE channel:*, user:*|  SUBSCRIBE broadcast
//! |  BusSubscriber    | <-----------------------------+
//! +-------------------+
//!          |
//!          v  dispatch_incoming
//! +-------------------+
//! | ConnectionRegistry|  <-- this process's sessions only
//! +-------------------+
//! ```
//!
//! Every process publishes and every process (including the publisher)
//! delivers from its own subscription loop.

mod redis_bus;

pub use redis_bus::{
    dispatch_incoming, encode_envelope, BusEnvelope, BusSubscriber, RedisFanout,
};

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Open a Redis client without connecting. The subscriber needs the client
/// itself to open dedicated pub/sub connections.
pub fn open_client(settings: &RedisSettings) -> Result<Client, redis::RedisError> {
    Client::open(settings.url.as_str())
}

/// Creates a Redis connection manager with automatic reconnection.
///
/// # Returns
/// * `Ok(ConnectionManager)` - On successful connection
/// * `Err(redis::RedisError)` - If connection fails
#[instrument(skip(client))]
pub async fn create_redis_client(client: Client) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}
