//! Session restoration at engine startup.
//!
//! Replays whatever the previous run left in the session store: credential
//! first, then the timing anchor, the tracks and finally the media source.
//! When a task id and media filename both survive, polling resumes so a
//! transcription that kept running on the service picks up where it left
//! off.

use subflow_bridge::MessageFromBackend;
use subflow_bridge::workflow::WorkflowStep;
use subflow_timeline::store::TrackKind;

use crate::poller;
use crate::services::AppContextHandle;
use crate::state::TaskPhase;

pub(crate) async fn restore(context: &AppContextHandle) {
    let store = {
        let state = context.state.read().await;
        state.store.clone()
    };
    let snapshot = store.load().await;

    if let Some(key) = snapshot.api_key.filter(|key| !key.is_empty()) {
        {
            let mut state = context.state.write().await;
            state.api_key = Some(key.clone());
        }
        context.send(MessageFromBackend::CredentialLoaded(key)).await;
    }

    if let Some(anchor) = snapshot.started_at_ms {
        let mut state = context.state.write().await;
        state.session.started_at_ms = Some(anchor);
    }

    if let Some(entries) = snapshot.original_track {
        {
            let mut state = context.state.write().await;
            state.timeline.replace(TrackKind::Original, entries.clone());
        }
        let present = !entries.is_empty();
        context
            .send(MessageFromBackend::TrackUpdated {
                track: TrackKind::Original,
                entries,
            })
            .await;
        if present {
            context
                .send(MessageFromBackend::WorkflowStepChanged(WorkflowStep::Results))
                .await;
        }
    }

    if let Some(entries) = snapshot.translated_track {
        {
            let mut state = context.state.write().await;
            state.timeline.replace(TrackKind::Translated, entries.clone());
        }
        context
            .send(MessageFromBackend::TrackUpdated {
                track: TrackKind::Translated,
                entries,
            })
            .await;
    }

    let (task_id, filename) = match (snapshot.task_id, snapshot.media_filename) {
        (Some(task_id), Some(filename)) => (task_id, filename),
        // Without both halves there is nothing to re-attach or poll.
        _ => return,
    };

    let stream_url = {
        let mut state = context.state.write().await;
        state.session.task_id = Some(task_id.clone());
        state.session.media_filename = Some(filename.clone());
        state.session.original_upload_filename = snapshot
            .original_upload_filename
            .or_else(|| Some(filename.clone()));
        state.session.phase = TaskPhase::Transcribing;
        state.client.stream_url(&filename)
    };
    context
        .send(MessageFromBackend::MediaSourceChanged {
            url: stream_url,
            filename,
        })
        .await;

    log::info!("Resuming status polling for restored task {task_id}");
    let poll = poller::spawn_status_poll(context.clone(), task_id);
    let mut state = context.state.write().await;
    state.poll = Some(poll);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;
    use crate::session::SessionSnapshot;
    use subflow_timeline::SubtitleEntry;

    #[tokio::test]
    async fn empty_store_restores_nothing() {
        let (context, mut rx, _dir) = testing::context().await;
        restore(&context).await;

        assert!(testing::drain(&mut rx).is_empty());
        let state = context.state.read().await;
        assert_eq!(state.session.phase, TaskPhase::Idle);
        assert!(state.poll.is_none());
    }

    #[tokio::test]
    async fn blank_stored_credential_is_ignored() {
        let (context, mut rx, _dir) = testing::context().await;
        {
            let state = context.state.read().await;
            state
                .store
                .save(&SessionSnapshot {
                    api_key: Some(String::new()),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        restore(&context).await;

        assert!(testing::drain(&mut rx).is_empty());
        assert_eq!(context.state.read().await.api_key, None);
    }

    #[tokio::test]
    async fn tracks_and_credential_come_back() {
        let (context, mut rx, _dir) = testing::context().await;
        {
            let state = context.state.read().await;
            state
                .store
                .save(&SessionSnapshot {
                    api_key: Some(String::from("sk-key")),
                    original_track: Some(vec![SubtitleEntry::new(0.0, 1.0, "hi")]),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        restore(&context).await;

        {
            let state = context.state.read().await;
            assert_eq!(state.api_key.as_deref(), Some("sk-key"));
            assert_eq!(state.timeline.entries(TrackKind::Original).len(), 1);
            // No stored task, so nothing to poll.
            assert!(state.poll.is_none());
        }
        let events = testing::drain(&mut rx);
        assert!(events.iter().any(|event| matches!(
            event,
            MessageFromBackend::CredentialLoaded(key) if key == "sk-key"
        )));
        assert!(events.iter().any(|event| matches!(
            event,
            MessageFromBackend::WorkflowStepChanged(WorkflowStep::Results)
        )));
    }

    #[tokio::test]
    async fn stored_task_resumes_media_and_polling() {
        let (context, mut rx, _dir) = testing::context().await;
        {
            let state = context.state.read().await;
            state
                .store
                .save(&SessionSnapshot {
                    task_id: Some(String::from("t-9")),
                    media_filename: Some(String::from("stored_clip.mp4")),
                    started_at_ms: Some(123_000),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        restore(&context).await;

        {
            let mut state = context.state.write().await;
            assert_eq!(state.session.task_id.as_deref(), Some("t-9"));
            assert_eq!(state.session.phase, TaskPhase::Transcribing);
            assert_eq!(state.session.started_at_ms, Some(123_000));
            // Falls back to the server-side name for export naming.
            assert_eq!(
                state.session.original_upload_filename.as_deref(),
                Some("stored_clip.mp4")
            );
            let poll = state.poll.take();
            assert!(poll.is_some());
            if let Some(poll) = poll {
                poll.stop();
            }
        }
        let events = testing::drain(&mut rx);
        assert!(events.iter().any(|event| matches!(
            event,
            MessageFromBackend::MediaSourceChanged { filename, .. } if filename == "stored_clip.mp4"
        )));
    }
}
