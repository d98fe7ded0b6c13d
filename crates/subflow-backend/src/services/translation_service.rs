//! Translation of the original track.

use subflow_bridge::{MessageFromBackend, TranslateRequest};
use subflow_bridge::notification::NotificationType;
use subflow_timeline::overlay::DisplayMode;
use subflow_timeline::store::TrackKind;

use crate::api;
use crate::session::SessionSnapshot;

/// Handles a translation request (see
/// [`subflow_bridge::MessageToBackend::StartTranslation`]).
///
/// The original track is sent inline so translation works for imported
/// subtitles as well as transcribed ones. The service call itself runs on a
/// spawned task; a session reset while it is in flight discards the result.
pub async fn handle_translate_request(context: super::AppContextHandle, request: TranslateRequest) {
    let (client, task_id, entries, remembered_key, generation) = {
        let state = context.state.read().await;
        (
            state.client.clone(),
            state.session.task_id.clone(),
            state.timeline.entries(TrackKind::Original).to_vec(),
            state.api_key.clone(),
            state.generation,
        )
    };

    if entries.is_empty() {
        context
            .send_notification(
                NotificationType::Error,
                "No subtitles to translate yet, transcribe or import first",
            )
            .await;
        return;
    }

    let supplied_key = request.api_key.clone().filter(|key| !key.is_empty());
    let api_key = supplied_key.clone().or(remembered_key);
    if request.provider.requires_api_key() && api_key.is_none() {
        context
            .send_notification(NotificationType::Error, "A DeepSeek API key is required")
            .await;
        return;
    }

    // A key typed into the request sticks around for later sessions.
    if let Some(key) = supplied_key {
        let store = {
            let mut state = context.state.write().await;
            state.api_key = Some(key.clone());
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

    let subtitles_json =
        serde_json::to_string(&entries).expect("subtitle entries always serialize");

    log::info!(
        "Translating {} lines to {} via {:?}",
        entries.len(),
        request.target_language,
        request.provider
    );
    // The request can take a while on long tracks, so it runs off the dispatch
    // loop and playback reports keep flowing in the meantime.
    tokio::spawn(async move {
        let response = client
            .translate(api::TranslationRequest {
                task_id: task_id.as_deref(),
                subtitles_json,
                target_language: &request.target_language,
                provider: request.provider,
                api_key: api_key.as_deref().unwrap_or(""),
                system_prompt: request.system_prompt.as_deref(),
            })
            .await;

        let translated = match response {
            Ok(result) => result.translated_subtitles,
            Err(err) => {
                context
                    .send_notification(
                        NotificationType::Error,
                        format!("Translation failed: {err}"),
                    )
                    .await;
                return;
            }
        };

        let applied = {
            let mut state = context.state.write().await;
            if state.generation != generation {
                None
            } else {
                state
                    .timeline
                    .replace(TrackKind::Translated, translated.clone());
                state.display_mode = DisplayMode::BilingualOriginalFirst;
                Some((state.store.clone(), state.snapshot()))
            }
        };
        let Some((store, snapshot)) = applied else {
            log::info!("Discarding a translation that finished after a session reset");
            return;
        };
        super::persist(&store, &snapshot).await;

        context
            .send(MessageFromBackend::TrackUpdated {
                track: TrackKind::Translated,
                entries: translated,
            })
            .await;
        context
            .send(MessageFromBackend::DisplayModeChanged(
                DisplayMode::BilingualOriginalFirst,
            ))
            .await;
        context
            .send_notification(NotificationType::Success, "Translation finished")
            .await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;
    use subflow_bridge::config::Provider;
    use subflow_timeline::SubtitleEntry;

    fn request(provider: Provider, api_key: Option<&str>) -> TranslateRequest {
        TranslateRequest {
            target_language: String::from("Chinese"),
            provider,
            api_key: api_key.map(String::from),
            system_prompt: None,
        }
    }

    async fn seed_original(context: &crate::services::AppContextHandle) {
        let mut state = context.state.write().await;
        state
            .timeline
            .replace(TrackKind::Original, vec![SubtitleEntry::new(0.0, 1.0, "hi")]);
    }

    #[tokio::test]
    async fn empty_original_track_is_rejected() {
        let (context, mut rx, _dir) = testing::context().await;

        handle_translate_request(context.clone(), request(Provider::Deepseek, Some("sk-key")))
            .await;

        let events = testing::drain(&mut rx);
        assert!(events.iter().any(|event| matches!(
            event,
            MessageFromBackend::NotificationMessage(note)
                if note.message.starts_with("No subtitles to translate")
        )));
        assert!(context
            .state
            .read()
            .await
            .timeline
            .entries(TrackKind::Translated)
            .is_empty());
    }

    #[tokio::test]
    async fn deepseek_without_any_key_is_rejected() {
        let (context, mut rx, _dir) = testing::context().await;
        seed_original(&context).await;

        handle_translate_request(context.clone(), request(Provider::Deepseek, None)).await;

        let events = testing::drain(&mut rx);
        assert!(events.iter().any(|event| matches!(
            event,
            MessageFromBackend::NotificationMessage(note)
                if note.message.contains("API key is required")
        )));
    }

    #[tokio::test]
    async fn remembered_key_satisfies_deepseek() {
        let (context, mut rx, _dir) = testing::context().await;
        seed_original(&context).await;
        context.state.write().await.api_key = Some(String::from("sk-remembered"));

        // Gets past both checks and dies at the unreachable service.
        handle_translate_request(context.clone(), request(Provider::Deepseek, None)).await;

        let event = rx.recv().await.expect("channel stays open");
        assert!(matches!(
            event,
            MessageFromBackend::NotificationMessage(ref note)
                if note.message.starts_with("Translation failed")
        ));
    }

    #[tokio::test]
    async fn local_provider_needs_no_key() {
        let (context, mut rx, _dir) = testing::context().await;
        seed_original(&context).await;

        handle_translate_request(context.clone(), request(Provider::Local, None)).await;

        // No precondition failure: the request went out (and hit the
        // unreachable test service).
        let event = rx.recv().await.expect("channel stays open");
        assert!(matches!(
            event,
            MessageFromBackend::NotificationMessage(ref note)
                if note.message.starts_with("Translation failed")
        ));
    }

    #[tokio::test]
    async fn supplied_key_is_remembered_and_persisted() {
        let (context, _rx, _dir) = testing::context().await;
        seed_original(&context).await;

        handle_translate_request(context.clone(), request(Provider::Deepseek, Some("sk-new")))
            .await;

        // The key sticks before the service call even starts.
        let state = context.state.read().await;
        assert_eq!(state.api_key.as_deref(), Some("sk-new"));
        let stored = state.store.load().await;
        assert_eq!(stored.api_key.as_deref(), Some("sk-new"));
    }
}
