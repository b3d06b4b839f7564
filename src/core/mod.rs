//! Client-side state: session, directory, conversation, and the orchestrator
//! that reconciles them against the remote API.

pub mod app;
pub mod config;
pub mod conversation;
pub mod directory;
pub mod session;
pub mod session_store;
