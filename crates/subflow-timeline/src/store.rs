//! In-memory storage for the two subtitle tracks of a session.

use serde::{Deserialize, Serialize};

use crate::SubtitleEntry;

/// Names one of the two subtitle tracks of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Original,
    Translated,
}

/// Holder of the session's subtitle tracks.
///
/// Tracks are replaced wholesale on every update. Entries keep the order
/// they arrived in and are never re-sorted, so lookups resolve overlaps by
/// stored order.
#[derive(Debug, Clone, Default)]
pub struct TimelineStore {
    original: Vec<SubtitleEntry>,
    translated: Vec<SubtitleEntry>,
}

impl TimelineStore {
    /// Replaces a track with a new ordered sequence of entries.
    pub fn replace(&mut self, track: TrackKind, entries: Vec<SubtitleEntry>) {
        match track {
            TrackKind::Original => self.original = entries,
            TrackKind::Translated => self.translated = entries,
        }
    }

    /// The entries of a track, in stored order.
    pub fn entries(&self, track: TrackKind) -> &[SubtitleEntry] {
        match track {
            TrackKind::Original => &self.original,
            TrackKind::Translated => &self.translated,
        }
    }

    pub fn is_empty(&self, track: TrackKind) -> bool {
        self.entries(track).is_empty()
    }

    /// First entry of a track whose display window contains `position`.
    ///
    /// Scans in stored order, so when windows overlap the earliest stored
    /// entry wins.
    pub fn find_active(&self, track: TrackKind, position: f64) -> Option<&SubtitleEntry> {
        self.entries(track)
            .iter()
            .find(|entry| entry.contains(position))
    }

    /// Drops both tracks.
    pub fn clear(&mut self) {
        self.original.clear();
        self.translated.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_track() -> Vec<SubtitleEntry> {
        vec![
            SubtitleEntry::new(0.0, 2.5, "first"),
            SubtitleEntry::new(2.0, 4.0, "second"),
            SubtitleEntry::new(6.0, 8.0, "third"),
        ]
    }

    #[test]
    fn replace_is_wholesale() {
        let mut store = TimelineStore::default();
        store.replace(TrackKind::Original, sample_track());
        assert_eq!(store.entries(TrackKind::Original).len(), 3);

        store.replace(
            TrackKind::Original,
            vec![SubtitleEntry::new(1.0, 2.0, "only")],
        );
        assert_eq!(store.entries(TrackKind::Original).len(), 1);
        assert_eq!(store.entries(TrackKind::Original)[0].text, "only");

        store.replace(TrackKind::Original, Vec::new());
        assert!(store.is_empty(TrackKind::Original));
        assert!(store.find_active(TrackKind::Original, 1.5).is_none());
    }

    #[test]
    fn tracks_are_independent() {
        let mut store = TimelineStore::default();
        store.replace(TrackKind::Translated, sample_track());
        assert!(store.is_empty(TrackKind::Original));
        assert_eq!(store.entries(TrackKind::Translated).len(), 3);
    }

    #[test]
    fn find_active_bounds_are_inclusive() {
        let mut store = TimelineStore::default();
        store.replace(TrackKind::Original, sample_track());
        assert_eq!(store.find_active(TrackKind::Original, 0.0).unwrap().text, "first");
        assert_eq!(store.find_active(TrackKind::Original, 8.0).unwrap().text, "third");
        assert!(store.find_active(TrackKind::Original, 5.0).is_none());
        assert!(store.find_active(TrackKind::Original, 8.1).is_none());
    }

    #[test]
    fn overlap_resolves_to_first_stored() {
        let mut store = TimelineStore::default();
        store.replace(TrackKind::Original, sample_track());
        // 2.0..=2.5 is covered by both "first" and "second".
        assert_eq!(store.find_active(TrackKind::Original, 2.25).unwrap().text, "first");
    }

    #[test]
    fn clear_empties_both_tracks() {
        let mut store = TimelineStore::default();
        store.replace(TrackKind::Original, sample_track());
        store.replace(TrackKind::Translated, sample_track());
        store.clear();
        assert!(store.is_empty(TrackKind::Original));
        assert!(store.is_empty(TrackKind::Translated));
    }
}
