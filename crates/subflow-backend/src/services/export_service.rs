//! Server-side rendering and download of subtitle files.

use subflow_bridge::MessageFromBackend;
use subflow_bridge::notification::NotificationType;
use subflow_timeline::naming::{self, ExportFormat};

/// Handles an export request: the service renders the file, the engine only
/// picks its local name.
pub async fn handle_export_request(
    context: super::AppContextHandle,
    format: ExportFormat,
    target_language: String,
) {
    let (client, task_id, base_name) = {
        let state = context.state.read().await;
        let base = state
            .session
            .original_upload_filename
            .clone()
            .or_else(|| state.session.media_filename.clone());
        (state.client.clone(), state.session.task_id.clone(), base)
    };
    let Some(task_id) = task_id else {
        context
            .send_notification(NotificationType::Error, "Nothing to export yet")
            .await;
        return;
    };

    let data = match client.export(&task_id, format).await {
        Ok(data) => data,
        Err(err) => {
            context
                .send_notification(NotificationType::Error, format!("Export failed: {err}"))
                .await;
            return;
        }
    };

    let base = base_name.unwrap_or_else(|| String::from("subtitles"));
    let filename = naming::download_filename(&base, format, &target_language);
    log::info!("Export of task {task_id} finished, {} bytes as {filename}", data.len());
    context
        .send(MessageFromBackend::ExportFinished { filename, data })
        .await;
}
