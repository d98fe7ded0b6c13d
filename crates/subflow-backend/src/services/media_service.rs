//! Media and subtitle-file intake.

use std::path::{Path, PathBuf};

use subflow_bridge::MessageFromBackend;
use subflow_bridge::notification::NotificationType;
use subflow_bridge::workflow::WorkflowStep;
use subflow_timeline::store::TrackKind;

use crate::state::TaskPhase;

/// Handles a media upload: hands the file to the processing service and, on
/// success, adopts the returned task identity and stream source.
///
/// A failed upload leaves whatever session existed before fully intact.
pub async fn handle_media_upload(context: super::AppContextHandle, path: PathBuf) {
    let client = {
        let state = context.state.read().await;
        state.client.clone()
    };
    let original_name = upload_name(&path);

    log::info!("Uploading media {path:?}");
    context
        .send_notification(NotificationType::Info, "Uploading media...")
        .await;

    let response = match client.upload_media(&path).await {
        Ok(response) => response,
        Err(err) => {
            context
                .send_notification(NotificationType::Error, format!("Upload failed: {err}"))
                .await;
            return;
        }
    };

    let (store, snapshot, stream_url) = {
        let mut state = context.state.write().await;
        state.session.task_id = Some(response.task_id.clone());
        state.session.media_filename = Some(response.filename.clone());
        state.session.original_upload_filename = Some(original_name);
        state.session.phase = TaskPhase::Uploading;
        (
            state.store.clone(),
            state.snapshot(),
            state.client.absolute_url(&response.url),
        )
    };
    super::persist(&store, &snapshot).await;

    context
        .send(MessageFromBackend::MediaSourceChanged {
            url: stream_url,
            filename: response.filename,
        })
        .await;
    context
        .send_notification(NotificationType::Success, "Upload complete")
        .await;
    context
        .send(MessageFromBackend::WorkflowStepChanged(WorkflowStep::Transcribe))
        .await;
}

/// Handles importing an existing `.srt` file. The service parses it into a
/// completed task, so the session jumps straight to results.
pub async fn handle_subtitle_import(context: super::AppContextHandle, path: PathBuf) {
    let is_srt = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("srt"))
        .unwrap_or(false);
    if !is_srt {
        context
            .send_notification(NotificationType::Error, "Please choose a .srt subtitle file")
            .await;
        return;
    }

    let client = {
        let state = context.state.read().await;
        state.client.clone()
    };

    log::info!("Importing subtitle file {path:?}");
    let response = match client.upload_subtitle(&path).await {
        Ok(response) => response,
        Err(err) => {
            context
                .send_notification(NotificationType::Error, format!("Import failed: {err}"))
                .await;
            return;
        }
    };

    let (store, snapshot) = {
        let mut state = context.state.write().await;
        state.session.task_id = Some(response.task_id.clone());
        state.session.media_filename = Some(response.filename.clone());
        state.session.phase = TaskPhase::Completed;
        state
            .timeline
            .replace(TrackKind::Original, response.subtitles.clone());
        state.timeline.replace(TrackKind::Translated, Vec::new());
        (state.store.clone(), state.snapshot())
    };
    super::persist(&store, &snapshot).await;

    context
        .send(MessageFromBackend::TrackUpdated {
            track: TrackKind::Original,
            entries: response.subtitles,
        })
        .await;
    context
        .send(MessageFromBackend::TrackUpdated {
            track: TrackKind::Translated,
            entries: Vec::new(),
        })
        .await;
    context
        .send_notification(NotificationType::Success, "Subtitle file imported")
        .await;
    context
        .send(MessageFromBackend::WorkflowStepChanged(WorkflowStep::Results))
        .await;
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("upload"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;

    #[tokio::test]
    async fn non_srt_imports_are_rejected_locally() {
        let (context, mut rx, _dir) = testing::context().await;

        handle_subtitle_import(context.clone(), PathBuf::from("notes.txt")).await;

        let events = testing::drain(&mut rx);
        assert!(events.iter().any(|event| matches!(
            event,
            MessageFromBackend::NotificationMessage(note)
                if note.notification_type == NotificationType::Error
        )));

        let state = context.state.read().await;
        assert_eq!(state.session.task_id, None);
        assert!(state.timeline.entries(TrackKind::Original).is_empty());
    }

    #[tokio::test]
    async fn extension_check_ignores_case() {
        let (context, mut rx, _dir) = testing::context().await;

        // Passes the local check, then fails at the unreachable service.
        handle_subtitle_import(context.clone(), PathBuf::from("movie.SRT")).await;

        let events = testing::drain(&mut rx);
        assert!(events.iter().any(|event| matches!(
            event,
            MessageFromBackend::NotificationMessage(note)
                if note.message.starts_with("Import failed")
        )));
    }

    #[test]
    fn upload_name_falls_back() {
        assert_eq!(upload_name(Path::new("/tmp/a clip.mp4")), "a clip.mp4");
        assert_eq!(upload_name(Path::new("/")), "upload");
    }
}
