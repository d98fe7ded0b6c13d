//! Application configuration, shared between the engine and frontends.

use serde::{Deserialize, Serialize};
use subflow_timeline::overlay::DisplayMode;

/// Translation backends selectable per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Hosted DeepSeek API. Needs a per-user API key.
    Deepseek,
    /// Translation model hosted by the processing service itself.
    Local,
}

impl Provider {
    /// Whether requests through this provider need a user credential.
    pub fn requires_api_key(self) -> bool {
        matches!(self, Provider::Deepseek)
    }

    /// Identifier sent in the translation form.
    pub fn as_form_value(self) -> &'static str {
        match self {
            Provider::Deepseek => "deepseek",
            Provider::Local => "local",
        }
    }
}

/// Global configuration of the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the remote processing service.
    pub service_url: String,
    /// Language hint submitted with transcription requests.
    pub default_source_language: String,
    /// Target language preselected for translation and export naming.
    pub default_target_language: String,
    /// Upper bound on characters per generated subtitle line.
    pub default_max_line_width: u32,
    /// Translation backend used when a request does not name one.
    pub default_provider: Provider,
    /// Overlay policy applied to fresh sessions.
    pub default_display_mode: DisplayMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: String::from("http://127.0.0.1:8000"),
            default_source_language: String::from("auto"),
            default_target_language: String::from("Chinese"),
            default_max_line_width: 40,
            default_provider: Provider::Deepseek,
            default_display_mode: DisplayMode::Original,
        }
    }
}
