//! HTTP server implementation
//!
//! The governor runs as actix-web middleware in front of every route; this crate itself only
//! serves health and introspection endpoints, embedding applications add their own.

pub mod middleware;
pub mod routes;

pub mod builder;
pub mod server;
pub mod state;
