//! HTTP Layer
//!
//! Routes and handlers for the operational endpoints.

pub mod handlers;
pub mod routes;
