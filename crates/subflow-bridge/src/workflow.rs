/// Sequential stages of the subtitle-authoring workflow.
///
/// The engine announces transitions; frontends use them to focus the
/// matching view. Steps only ever advance within one session, a reset is
/// the way back to `Upload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    /// Waiting for media or an imported subtitle file.
    Upload,
    /// Media is available, transcription can be requested.
    Transcribe,
    /// Subtitles exist, translation and export are meaningful.
    Results,
}

impl WorkflowStep {
    /// Short lowercase label for logs and text frontends.
    pub fn label(self) -> &'static str {
        match self {
            WorkflowStep::Upload => "upload",
            WorkflowStep::Transcribe => "transcribe",
            WorkflowStep::Results => "results",
        }
    }
}
