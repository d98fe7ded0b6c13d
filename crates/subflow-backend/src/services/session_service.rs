//! Session-wide commands: credentials and the full reset.

use subflow_bridge::MessageFromBackend;

use crate::session::SessionSnapshot;
use crate::state::Session;

/// Handles a credential update. The key lives in state for this run and in
/// the store for the next one. An empty key is stored as-is and ignored at
/// the next startup, so clearing the field does not resurrect an old key.
pub async fn handle_remember_api_key(context: super::AppContextHandle, key: String) {
    let store = {
        let mut state = context.state.write().await;
        state.api_key = if key.is_empty() { None } else { Some(key.clone()) };
        state.store.clone()
    };
    super::persist(
        &store,
        &SessionSnapshot {
            api_key: Some(key),
            ..Default::default()
        },
    )
    .await;
}

/// Handles a full session reset.
///
/// Server-side cleanup (cancelling the task, releasing the speech model) is
/// fired and forgotten; the local reset never waits on the network. The
/// remembered credential survives.
pub async fn handle_new_project(context: super::AppContextHandle) {
    let (client, task_id, store) = {
        let state = context.state.read().await;
        (
            state.client.clone(),
            state.session.task_id.clone(),
            state.store.clone(),
        )
    };

    if let Some(task_id) = task_id {
        let cancel_client = client.clone();
        tokio::spawn(async move {
            if let Err(err) = cancel_client.cancel(&task_id).await {
                log::warn!("Best-effort cancel of task {task_id} failed: {err}");
            }
        });
    }
    tokio::spawn(async move {
        if let Err(err) = client.release_model().await {
            log::warn!("Best-effort model release failed: {err}");
        }
    });

    // The in-memory session empties before the store does: a poll cycle
    // landing mid-reset fails the task-id check and persists nothing.
    {
        let mut state = context.state.write().await;
        if let Some(poll) = state.poll.take() {
            poll.stop();
        }
        if let Some(ticker) = state.runtime_timer.take() {
            ticker.stop();
        }
        state.session = Session::default();
        state.timeline.clear();
        state.display_mode = state.config.default_display_mode;
        state.generation = state.generation.wrapping_add(1);
    }

    if let Err(err) = store.clear().await {
        log::error!("Failed to clear the session store: {err}");
    }

    log::info!("Session reset, credential retained");
    context.send(MessageFromBackend::SessionCleared).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RemoteStatus, TaskStatus};
    use crate::services::testing;
    use crate::state::TaskPhase;
    use subflow_timeline::SubtitleEntry;
    use subflow_timeline::overlay::DisplayMode;
    use subflow_timeline::store::TrackKind;

    #[tokio::test]
    async fn reset_clears_everything_but_the_credential() {
        let (context, mut rx, _dir) = testing::context().await;
        {
            let mut state = context.state.write().await;
            state.session.task_id = Some(String::from("t-1"));
            state.session.media_filename = Some(String::from("clip.mp4"));
            state.session.phase = TaskPhase::Completed;
            state.session.started_at_ms = Some(1);
            state.api_key = Some(String::from("sk-key"));
            state.display_mode = DisplayMode::BilingualOriginalFirst;
            state
                .timeline
                .replace(TrackKind::Original, vec![SubtitleEntry::new(0.0, 1.0, "hi")]);
            let snapshot = state.snapshot();
            state.store.save(&snapshot).await.unwrap();
        }
        let generation_before = context.state.read().await.generation;

        handle_new_project(context.clone()).await;

        {
            let state = context.state.read().await;
            assert_eq!(state.session.task_id, None);
            assert_eq!(state.session.phase, TaskPhase::Idle);
            assert!(state.timeline.entries(TrackKind::Original).is_empty());
            assert_eq!(state.display_mode, DisplayMode::Original);
            assert_eq!(state.api_key.as_deref(), Some("sk-key"));
            assert_eq!(state.generation, generation_before + 1);

            let stored = state.store.load().await;
            assert_eq!(stored.task_id, None);
            assert_eq!(stored.original_track, None);
            assert_eq!(stored.api_key.as_deref(), Some("sk-key"));
        }
        let events = testing::drain(&mut rx);
        assert!(events
            .iter()
            .any(|event| matches!(event, MessageFromBackend::SessionCleared)));
    }

    #[tokio::test]
    async fn late_poll_result_cannot_repopulate_a_cleared_store() {
        let (context, mut rx, _dir) = testing::context().await;
        {
            let mut state = context.state.write().await;
            state.session.task_id = Some(String::from("t-1"));
            state.session.phase = TaskPhase::Transcribing;
            let snapshot = state.snapshot();
            state.store.save(&snapshot).await.unwrap();
        }

        handle_new_project(context.clone()).await;
        testing::drain(&mut rx);

        // A status fetch armed before the reset delivers its payload late.
        let late = TaskStatus {
            status: RemoteStatus::Completed,
            subtitles: vec![SubtitleEntry::new(0.0, 2.0, "stale line")],
            translated_subtitles: None,
            error: None,
            download_url: None,
        };
        let mut partial_seen = false;
        let flow = crate::poller::apply_status(&context, "t-1", late, &mut partial_seen).await;
        assert!(flow.is_break());

        let state = context.state.read().await;
        assert_eq!(state.session.task_id, None);
        assert!(state.timeline.entries(TrackKind::Original).is_empty());
        let stored = state.store.load().await;
        assert_eq!(stored.task_id, None);
        assert_eq!(stored.original_track, None);
        assert!(testing::drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn empty_key_clears_the_live_and_stored_copies() {
        let (context, _rx, _dir) = testing::context().await;

        handle_remember_api_key(context.clone(), String::from("sk-key")).await;
        assert_eq!(
            context.state.read().await.api_key.as_deref(),
            Some("sk-key")
        );

        handle_remember_api_key(context.clone(), String::new()).await;
        let state = context.state.read().await;
        assert_eq!(state.api_key, None);
        // The stored key is now blank, which restoration skips.
        assert_eq!(state.store.load().await.api_key.as_deref(), Some(""));
    }
}
