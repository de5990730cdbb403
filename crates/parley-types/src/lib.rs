//! Shared types for Parley: stored entities as the repositories return them,
//! and the request/response bodies exchanged with HTTP clients.

pub mod api;
pub mod models;
