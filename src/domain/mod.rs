//! # Domain Layer
//!
//! Entities and repository contracts for the persistence collaborators the
//! real-time core calls into. Independent of infrastructure and
//! presentation concerns.

pub mod entities;

pub use entities::*;
