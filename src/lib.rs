//! Chatline is a terminal client for one-to-one chat servers that expose a
//! REST API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the wire payloads, the error taxonomy, and the
//!   [`api::ChatApi`] gateway trait with its reqwest implementation.
//! - [`core`] owns client-side state: the session (who is signed in), the
//!   user directory, the active conversation, the persisted session file,
//!   and the [`core::app::ChatApp`] orchestrator that reconciles them
//!   against the gateway.
//! - [`cli`] is the thin line-based front end; it dispatches intents and
//!   renders snapshots, holding no state of its own.
//!
//! The binary entrypoint (`src/main.rs`) parses flags and routes into
//! [`cli::run`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
