//! Transcription submission and the loops attached to it.

use subflow_bridge::MessageFromBackend;
use subflow_bridge::notification::NotificationType;

use crate::poller;
use crate::state::TaskPhase;
use crate::timer;

/// Handles a transcription request for the uploaded media: submits the job,
/// anchors the runtime timer and arms the status poll loop.
pub async fn handle_transcribe_request(
    context: super::AppContextHandle,
    language: String,
    max_line_width: u32,
) {
    let (client, filename) = {
        let state = context.state.read().await;
        (state.client.clone(), state.session.media_filename.clone())
    };
    let Some(filename) = filename else {
        context
            .send_notification(
                NotificationType::Error,
                "Upload a media file before transcribing",
            )
            .await;
        return;
    };

    context
        .send(MessageFromBackend::TranscriptionProgress {
            percent: 10,
            message: String::from("Requesting transcription..."),
        })
        .await;

    log::info!("Submitting transcription of {filename} (language {language}, width {max_line_width})");
    let response = match client
        .submit_transcription(&filename, &language, max_line_width)
        .await
    {
        Ok(response) => response,
        Err(err) => {
            context
                .send_notification(
                    NotificationType::Error,
                    format!("Failed to start transcription: {err}"),
                )
                .await;
            return;
        }
    };

    let anchor = timer::now_epoch_ms();
    let (store, snapshot) = {
        let mut state = context.state.write().await;
        // A resubmission replaces any loops from the previous task.
        if let Some(old) = state.poll.take() {
            old.stop();
        }
        if let Some(old) = state.runtime_timer.take() {
            old.stop();
        }
        state.session.task_id = Some(response.task_id.clone());
        state.session.phase = TaskPhase::Transcribing;
        state.session.started_at_ms = Some(anchor);
        (state.store.clone(), state.snapshot())
    };
    super::persist(&store, &snapshot).await;

    let ticker = timer::spawn_runtime_ticker(context.clone(), anchor);
    let poll = poller::spawn_status_poll(context.clone(), response.task_id.clone());
    {
        let mut state = context.state.write().await;
        state.runtime_timer = Some(ticker);
        state.poll = Some(poll);
    }

    context
        .send(MessageFromBackend::TranscriptionStarted {
            task_id: response.task_id,
        })
        .await;
}
