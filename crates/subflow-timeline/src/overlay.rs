//! Projection of the subtitle tracks onto a playback position.

use serde::{Deserialize, Serialize};

use crate::SubtitleEntry;
use crate::store::{TimelineStore, TrackKind};

/// Overlay policy for the playback-synchronized subtitle text.
///
/// The serialized names double as the wire values understood by the
/// processing service's export endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Only the original track.
    #[serde(rename = "original")]
    Original,
    /// Only the translated track.
    #[serde(rename = "translated")]
    Translated,
    /// Both tracks, original line above the translation.
    #[serde(rename = "bilingual_orig_trans")]
    BilingualOriginalFirst,
    /// Both tracks, translation above the original line.
    #[serde(rename = "bilingual_trans_orig")]
    BilingualTranslatedFirst,
}

/// Computes the overlay text for `position` under `mode`.
///
/// Pure function of its inputs. `None` means the overlay should be hidden:
/// no entry is active, or the selected track has no text there. Bilingual
/// modes degrade to the track that does have an active entry.
pub fn compose(store: &TimelineStore, position: f64, mode: DisplayMode) -> Option<String> {
    let original = store.find_active(TrackKind::Original, position);
    let translated = store.find_active(TrackKind::Translated, position);

    let text = match mode {
        DisplayMode::Original => original.map(|entry| entry.text.clone()),
        DisplayMode::Translated => translated.map(|entry| entry.text.clone()),
        DisplayMode::BilingualOriginalFirst => stack(original, translated),
        DisplayMode::BilingualTranslatedFirst => stack(translated, original),
    };
    text.filter(|text| !text.is_empty())
}

fn stack(upper: Option<&SubtitleEntry>, lower: Option<&SubtitleEntry>) -> Option<String> {
    match (upper, lower) {
        (Some(upper), Some(lower)) => Some(format!("{}\n{}", upper.text, lower.text)),
        (Some(upper), None) => Some(upper.text.clone()),
        (None, Some(lower)) => Some(lower.text.clone()),
        (None, None) => None,
    }
}
