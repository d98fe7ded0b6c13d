//! Communication bridge between the frontend and the engine of the
//! application.
//!
//! The two sides run on different threads and talk exclusively through the
//! paired channels created here, so every interaction is spelled out as a
//! message type in this crate. Frontends stay free of engine internals and
//! the engine stays free of rendering concerns.

pub mod config;
pub mod notification;
pub mod workflow;

use std::path::PathBuf;

use subflow_timeline::SubtitleEntry;
use subflow_timeline::naming::ExportFormat;
use subflow_timeline::overlay::DisplayMode;
use subflow_timeline::store::TrackKind;
use tokio::sync::mpsc::{Receiver, Sender, channel};

/// Messages, sent from the engine to update the frontend's state.
#[derive(Debug, Clone)]
pub enum MessageFromBackend {
    /// Show a notification to the user.
    NotificationMessage(notification::NotificationMessage),
    /// Current configuration, sent on request and after updates.
    ConfigurationResponse(config::Config),
    /// The media player should (re)attach to this source.
    MediaSourceChanged { url: String, filename: String },
    /// The authoring workflow advanced to another step.
    WorkflowStepChanged(workflow::WorkflowStep),
    /// A remembered credential was recovered during startup.
    CredentialLoaded(String),
    /// The service accepted a transcription job.
    TranscriptionStarted { task_id: String },
    /// Coarse progress of the in-flight job.
    TranscriptionProgress { percent: u8, message: String },
    /// Elapsed wall-clock time of the running job, once per second.
    RuntimeTimerTick { elapsed_secs: u64 },
    /// A track was replaced wholesale; frontends re-render the full list.
    TrackUpdated {
        track: TrackKind,
        entries: Vec<SubtitleEntry>,
    },
    /// The active job finished successfully.
    TranscriptionCompleted {
        elapsed_secs: Option<u64>,
        download_url: Option<String>,
    },
    /// The active job failed; the message comes verbatim from the service.
    TranscriptionFailed { error: String },
    /// The overlay policy changed on the engine side.
    DisplayModeChanged(DisplayMode),
    /// Overlay text for the latest playback position; `None` hides it.
    OverlayUpdate { text: Option<String> },
    /// A subtitle file was rendered; `data` is its full content.
    ExportFinished { filename: String, data: Vec<u8> },
    /// The session was reset to a blank state.
    SessionCleared,
}

/// Parameters of a translation request.
#[derive(Debug, Clone)]
pub struct TranslateRequest {
    pub target_language: String,
    pub provider: config::Provider,
    /// Credential for providers that need one. Absent falls back to the
    /// remembered key.
    pub api_key: Option<String>,
    /// Optional instruction override forwarded to the translation model.
    pub system_prompt: Option<String>,
}

/// Messages, sent from the frontend to trigger some actions in the engine.
#[derive(Debug, Clone)]
pub enum MessageToBackend {
    /// Ask the engine to send the current configuration.
    ConfigurationRequest,
    /// Replace and persist the configuration.
    UpdateConfiguration(config::Config),
    /// Upload a local media file to the processing service.
    UploadMedia { path: PathBuf },
    /// Import an existing `.srt` file instead of transcribing.
    ImportSubtitleFile { path: PathBuf },
    /// Start transcribing the uploaded media.
    StartTranscription { language: String, max_line_width: u32 },
    /// Translate the original track.
    StartTranslation(TranslateRequest),
    /// Render and download the subtitles in the given format.
    ExportSubtitles {
        format: ExportFormat,
        target_language: String,
    },
    /// Switch the overlay policy.
    SetDisplayMode(DisplayMode),
    /// Latest playback position of the frontend's media player, in seconds.
    PlaybackPosition(f64),
    /// Persist a translation credential for later sessions.
    RememberApiKey(String),
    /// Discard the current session and start over.
    NewProject,
}

/// Represents a structure to hold both senders and receivers of the channels.
pub struct BridgeChannels {
    pub backend_tx: Sender<MessageFromBackend>,
    pub backend_rx: Receiver<MessageToBackend>,
    pub frontend_tx: Sender<MessageToBackend>,
    pub frontend_rx: Receiver<MessageFromBackend>,
}

impl BridgeChannels {
    /// Creates channels with the given buffer size.
    pub fn new(buffer: usize) -> Self {
        let (backend_tx, frontend_rx) = channel(buffer);
        let (frontend_tx, backend_rx) = channel(buffer);
        Self {
            backend_tx,
            backend_rx,
            frontend_tx,
            frontend_rx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
