//! # Veribot Gateway
//!
//! Minimal HTTP API for the assistant: chat, status, statistics, knowledge
//! search and record management.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
