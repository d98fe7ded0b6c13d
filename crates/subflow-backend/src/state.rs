use subflow_bridge::config::Config;
use subflow_timeline::overlay::DisplayMode;
use subflow_timeline::store::{TimelineStore, TrackKind};

use crate::api::ServiceClient;
use crate::session::{SessionSnapshot, SessionStore};
use crate::timer::{self, TickHandle};

/// Client-side lifecycle stages of the single active task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskPhase {
    /// No task exists yet.
    #[default]
    Idle,
    /// Media was submitted, no processing has been requested.
    Uploading,
    /// A transcription job is running (or being resumed) on the service.
    Transcribing,
    /// Terminal: results are final.
    Completed,
    /// Terminal: the service reported an error.
    Failed,
}

/// Identity and progress anchor of the single active task.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Opaque task identifier assigned by the processing service.
    pub task_id: Option<String>,
    /// Server-side filename of the uploaded media, used as stream source.
    pub media_filename: Option<String>,
    /// The local name the file was uploaded under, kept for export naming.
    pub original_upload_filename: Option<String>,
    /// Where the task currently stands.
    pub phase: TaskPhase,
    /// Epoch milliseconds at which transcription was requested.
    pub started_at_ms: Option<u64>,
}

impl Session {
    /// Seconds since transcription was requested, when an anchor exists.
    pub fn elapsed_secs(&self) -> Option<u64> {
        self.started_at_ms
            .map(|anchor| timer::now_epoch_ms().saturating_sub(anchor) / 1000)
    }
}

/// The core application state that holds configuration, the session and
/// other shared resources.
///
/// This struct contains all the data that needs to be shared across async
/// tasks in the engine. It is designed to be wrapped in thread-safe,
/// async-friendly concurrency primitives (see [`SharedState`]) to allow safe
/// concurrent reads and occasional writes from multiple tasks.
///
/// Writers hold the lock only across synchronous mutation, never across
/// network awaits.
#[derive(Debug)]
pub struct State {
    /// The loaded application configuration.
    pub config: Config,
    /// Durable key/value snapshot of the session.
    pub store: SessionStore,
    /// Shared HTTP client for the remote processing service.
    pub client: ServiceClient,
    /// The single active task of this session.
    pub session: Session,
    /// Both subtitle tracks.
    pub timeline: TimelineStore,
    /// Overlay policy for playback projection.
    pub display_mode: DisplayMode,
    /// Remembered translation credential.
    pub api_key: Option<String>,
    /// Handle of the running status-poll loop, if any.
    pub poll: Option<TickHandle>,
    /// Handle of the one-second runtime ticker, if any.
    pub runtime_timer: Option<TickHandle>,
    /// Bumped on every session reset. Async results captured before the bump
    /// compare against it and discard themselves.
    pub generation: u64,
}

impl State {
    /// Point-in-time copy of everything worth persisting.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            task_id: self.session.task_id.clone(),
            media_filename: self.session.media_filename.clone(),
            original_upload_filename: self.session.original_upload_filename.clone(),
            started_at_ms: self.session.started_at_ms,
            original_track: Some(self.timeline.entries(TrackKind::Original).to_vec()),
            translated_track: Some(self.timeline.entries(TrackKind::Translated).to_vec()),
            api_key: self.api_key.clone(),
        }
    }
}

/// Thread-safe, async-friendly shared reference to the application [`State`].
///
/// This is the recommended way to pass state into async handlers, background
/// tasks, or any context where multiple tasks need read access (and
/// occasional write access).
pub type SharedState = std::sync::Arc<tokio::sync::RwLock<State>>;
