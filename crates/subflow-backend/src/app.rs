//! Application context and message dispatching utilities.
//!
//! The context contains the shared state and provides helpers for sending
//! responses and notifications back to the frontend bridge.

use std::sync::Arc;

use subflow_bridge::{MessageFromBackend, MessageToBackend};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::services;
use crate::state::SharedState;

/// Shared application context passed to services and message handlers.
pub(crate) struct AppContext {
    /// Mutable runtime application state shared across services.
    pub state: SharedState,
    /// Outbound channel to the frontend bridge.
    pub tx: Sender<MessageFromBackend>,
}

impl AppContext {
    /// Read and dispatch messages from the frontend bridge until it closes.
    pub async fn consume_bridge_messages(self: &Arc<Self>, mut rx: Receiver<MessageToBackend>) {
        while let Some(message) = rx.recv().await {
            log::debug!("Got a frontend message: {message:?}");
            self.dispatch_message(message).await;
        }
    }

    /// Dispatches the received message from frontend down to individual
    /// service handlers.
    async fn dispatch_message(self: &Arc<Self>, message: MessageToBackend) {
        match message {
            MessageToBackend::ConfigurationRequest => {
                services::config_service::handle_config_request(self.clone()).await;
            }
            MessageToBackend::UpdateConfiguration(config) => {
                services::config_service::handle_config_update(self.clone(), config).await;
            }
            MessageToBackend::UploadMedia { path } => {
                services::media_service::handle_media_upload(self.clone(), path).await;
            }
            MessageToBackend::ImportSubtitleFile { path } => {
                services::media_service::handle_subtitle_import(self.clone(), path).await;
            }
            MessageToBackend::StartTranscription {
                language,
                max_line_width,
            } => {
                services::transcription_service::handle_transcribe_request(
                    self.clone(),
                    language,
                    max_line_width,
                )
                .await;
            }
            MessageToBackend::StartTranslation(request) => {
                services::translation_service::handle_translate_request(self.clone(), request)
                    .await;
            }
            MessageToBackend::ExportSubtitles {
                format,
                target_language,
            } => {
                services::export_service::handle_export_request(
                    self.clone(),
                    format,
                    target_language,
                )
                .await;
            }
            MessageToBackend::SetDisplayMode(mode) => {
                services::playback_service::handle_display_mode_change(self.clone(), mode).await;
            }
            MessageToBackend::PlaybackPosition(seconds) => {
                services::playback_service::handle_playback_position(self.clone(), seconds).await;
            }
            MessageToBackend::RememberApiKey(key) => {
                services::session_service::handle_remember_api_key(self.clone(), key).await;
            }
            MessageToBackend::NewProject => {
                services::session_service::handle_new_project(self.clone()).await;
            }
        }
    }

    /// Send a message to the frontend bridge.
    pub async fn send(&self, message: MessageFromBackend) {
        self.tx
            .send(message)
            .await
            .expect("failed to send message to frontend");
    }

    /// Send a notification message to the frontend bridge.
    pub async fn send_notification(
        &self,
        notification_type: subflow_bridge::notification::NotificationType,
        content: impl Into<String>,
    ) {
        self.send(MessageFromBackend::NotificationMessage(
            subflow_bridge::notification::NotificationMessage {
                notification_type,
                message: content.into(),
            },
        ))
        .await;
    }
}
