//! # Veribot Core
//!
//! Shared foundation for the veribot workspace: configuration, the error
//! type, chat message types, and the collaborator traits (LLM provider,
//! document source).

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
