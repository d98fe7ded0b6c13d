//! Playback-clock projection of the subtitle tracks.

use subflow_bridge::MessageFromBackend;
use subflow_timeline::overlay::{self, DisplayMode};

/// Handles a playback position report: projects both tracks onto the
/// position under the current display mode and ships the overlay text.
pub async fn handle_playback_position(context: super::AppContextHandle, seconds: f64) {
    let text = {
        let state = context.state.read().await;
        overlay::compose(&state.timeline, seconds, state.display_mode)
    };
    context.send(MessageFromBackend::OverlayUpdate { text }).await;
}

/// Handles an overlay policy switch.
pub async fn handle_display_mode_change(context: super::AppContextHandle, mode: DisplayMode) {
    {
        let mut state = context.state.write().await;
        state.display_mode = mode;
    }
    context.send(MessageFromBackend::DisplayModeChanged(mode)).await;
}
