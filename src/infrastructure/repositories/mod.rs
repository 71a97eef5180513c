//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **UserRepository** - Account lookup at the websocket handshake
//! - **MessageRepository** - Channel messages sent over the websocket
//! - **DirectMessageRepository** - Direct messages sent over the websocket
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{
//!     PgDirectMessageRepository, PgMessageRepository, PgUserRepository,
//! };
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let users = PgUserRepository::new(pool.clone());
//!     let messages = PgMessageRepository::new(pool.clone());
//!     let direct_messages = PgDirectMessageRepository::new(pool);
//! }
//! ```

mod direct_message_repository;
mod message_repository;
mod user_repository;

pub use direct_message_repository::PgDirectMessageRepository;
pub use message_repository::PgMessageRepository;
pub use user_repository::PgUserRepository;
