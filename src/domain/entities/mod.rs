//! # Domain Entities
//!
//! The persisted entities the real-time core touches. Each one is created by
//! an external collaborator before any fanout happens; the core itself never
//! stores them.
//!
//! - **User**: account identity, display info and active flag
//! - **Message**: a text message sent in a channel
//! - **DirectMessage**: a one-to-one message between users
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod direct_message;
mod message;
mod user;

pub use direct_message::{DirectMessage, DirectMessageRepository, NewDirectMessage};
pub use message::{Message, MessageRepository, NewMessage};
pub use user::{User, UserProfile, UserRepository};
