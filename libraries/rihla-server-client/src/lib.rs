//! HTTP client for the Rihla hosted backend.
//!
//! Implements the capability traits from `rihla-core` against the managed
//! backend: auth/session queries, role-scoped dashboard functions, and
//! SSE-backed change feeds.

#![forbid(unsafe_code)]

mod auth;
mod client;
mod dashboard;
mod error;
mod realtime;
mod types;

pub use client::RihlaServerClient;
pub use error::{Result, ServerClientError};
pub use types::ServerConfig;
