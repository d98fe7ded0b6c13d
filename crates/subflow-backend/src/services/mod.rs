//! Engine service handlers for frontend-driven requests.
//!
//! This module groups async request handlers that operate on the shared
//! `AppContext`, perform side effects (network, filesystem), and emit
//! progress or notifications back to the frontend.

pub mod config_service;
pub mod export_service;
pub mod media_service;
pub mod playback_service;
pub mod session_service;
pub mod transcription_service;
pub mod translation_service;

use crate::session::{SessionSnapshot, SessionStore};

/// Represents a type that is used in all handlers as an application context.
pub(crate) type AppContextHandle = std::sync::Arc<crate::AppContext>;

/// Saves a snapshot, logging (but never surfacing) persistence failures.
/// Losing a snapshot degrades restart recovery, not the live session.
pub(crate) async fn persist(store: &SessionStore, snapshot: &SessionSnapshot) {
    if let Err(err) = store.save(snapshot).await {
        log::error!("Failed to persist session snapshot: {err}");
    }
}
