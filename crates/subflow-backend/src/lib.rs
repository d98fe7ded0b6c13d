//! Engine runtime entry point and public API surface.
//!
//! This crate owns the engine lifecycle: it routes bridge messages to
//! services, drives the status-poll and runtime-ticker loops, and manages
//! the shared session state together with its durable snapshots.

mod api;
mod app;
mod bootstrap;
mod config;
mod poller;
mod runtime;
mod services;
mod session;
mod state;
mod timer;

pub(crate) use crate::app::AppContext;
pub use crate::runtime::run;
pub use crate::session::{SessionSnapshot, SessionStore, StoreError};
