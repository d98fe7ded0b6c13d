//! Durable session snapshots.
//!
//! The session is persisted as a flat set of small files, one per key, under
//! the application's data directory. Saving is sparse: only the keys a
//! snapshot actually carries get written, everything else keeps its stored
//! value. That lets callers persist a single field (say, the credential)
//! without first reading the rest back.

use std::path::PathBuf;

use subflow_timeline::SubtitleEntry;
use tokio::fs;

const KEY_TASK_ID: &str = "task_id";
const KEY_MEDIA_FILENAME: &str = "media_filename";
const KEY_ORIGINAL_FILENAME: &str = "original_filename";
const KEY_START_TIME: &str = "start_time";
const KEY_ORIGINAL_TRACK: &str = "original_track.json";
const KEY_TRANSLATED_TRACK: &str = "translated_track.json";
const KEY_API_KEY: &str = "api_key";

/// Errors raised while writing the session store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred while touching the store directory.
    #[error("failed to access the session store: {0}")]
    Io(#[from] std::io::Error),
    /// A track could not be encoded for storage.
    #[error("failed to encode a stored track: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Point-in-time copy of everything a session needs to survive a restart.
///
/// Every field is optional: a snapshot may describe any subset of the
/// session, and [`SessionStore::save`] only touches the keys that are
/// present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub task_id: Option<String>,
    pub media_filename: Option<String>,
    pub original_upload_filename: Option<String>,
    pub started_at_ms: Option<u64>,
    pub original_track: Option<Vec<SubtitleEntry>>,
    pub translated_track: Option<Vec<SubtitleEntry>>,
    pub api_key: Option<String>,
}

impl SessionSnapshot {
    /// Overlays `newer` onto `self`, overwriting only the fields `newer`
    /// actually carries. Mirrors what saving `newer` on top of a stored
    /// `self` would leave on disk.
    pub fn merge_present(&mut self, newer: SessionSnapshot) {
        if newer.task_id.is_some() {
            self.task_id = newer.task_id;
        }
        if newer.media_filename.is_some() {
            self.media_filename = newer.media_filename;
        }
        if newer.original_upload_filename.is_some() {
            self.original_upload_filename = newer.original_upload_filename;
        }
        if newer.started_at_ms.is_some() {
            self.started_at_ms = newer.started_at_ms;
        }
        if newer.original_track.is_some() {
            self.original_track = newer.original_track;
        }
        if newer.translated_track.is_some() {
            self.translated_track = newer.translated_track;
        }
        if newer.api_key.is_some() {
            self.api_key = newer.api_key;
        }
    }
}

/// Flat key/value store holding one file per session key.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Writes the present fields of `snapshot`. Absent fields leave their
    /// stored keys untouched; empty tracks count as absent.
    pub async fn save(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;

        if let Some(value) = &snapshot.task_id {
            self.write_key(KEY_TASK_ID, value).await?;
        }
        if let Some(value) = &snapshot.media_filename {
            self.write_key(KEY_MEDIA_FILENAME, value).await?;
        }
        if let Some(value) = &snapshot.original_upload_filename {
            self.write_key(KEY_ORIGINAL_FILENAME, value).await?;
        }
        if let Some(anchor) = snapshot.started_at_ms {
            self.write_key(KEY_START_TIME, &anchor.to_string()).await?;
        }
        if let Some(track) = &snapshot.original_track {
            if !track.is_empty() {
                self.write_key(KEY_ORIGINAL_TRACK, &serde_json::to_string(track)?)
                    .await?;
            }
        }
        if let Some(track) = &snapshot.translated_track {
            if !track.is_empty() {
                self.write_key(KEY_TRANSLATED_TRACK, &serde_json::to_string(track)?)
                    .await?;
            }
        }
        if let Some(value) = &snapshot.api_key {
            self.write_key(KEY_API_KEY, value).await?;
        }

        Ok(())
    }

    /// Reads whatever subset of the snapshot is stored. Keys that are
    /// missing, unreadable or corrupted degrade to absent fields, they never
    /// fail the whole load.
    pub async fn load(&self) -> SessionSnapshot {
        SessionSnapshot {
            task_id: self.read_key(KEY_TASK_ID).await,
            media_filename: self.read_key(KEY_MEDIA_FILENAME).await,
            original_upload_filename: self.read_key(KEY_ORIGINAL_FILENAME).await,
            started_at_ms: self.read_anchor().await,
            original_track: self.read_track(KEY_ORIGINAL_TRACK).await,
            translated_track: self.read_track(KEY_TRANSLATED_TRACK).await,
            api_key: self.read_key(KEY_API_KEY).await,
        }
    }

    /// Removes every session key except the remembered credential.
    pub async fn clear(&self) -> Result<(), StoreError> {
        for key in [
            KEY_TASK_ID,
            KEY_MEDIA_FILENAME,
            KEY_ORIGINAL_FILENAME,
            KEY_START_TIME,
            KEY_ORIGINAL_TRACK,
            KEY_TRANSLATED_TRACK,
        ] {
            match fs::remove_file(self.dir.join(key)).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    async fn write_key(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::write(self.dir.join(key), value).await?;
        Ok(())
    }

    async fn read_key(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.dir.join(key)).await {
            Ok(value) => Some(value),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                log::warn!("Failed to read session key {key}: {err}");
                None
            }
        }
    }

    async fn read_anchor(&self) -> Option<u64> {
        let raw = self.read_key(KEY_START_TIME).await?;
        match raw.trim().parse() {
            Ok(anchor) => Some(anchor),
            Err(err) => {
                log::warn!("Discarding unparsable start time {raw:?}: {err}");
                None
            }
        }
    }

    async fn read_track(&self, key: &str) -> Option<Vec<SubtitleEntry>> {
        let raw = self.read_key(key).await?;
        match serde_json::from_str(&raw) {
            Ok(entries) => Some(entries),
            Err(err) => {
                log::warn!("Discarding corrupted track under {key}: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> Vec<SubtitleEntry> {
        vec![
            SubtitleEntry::new(0.0, 1.5, "one"),
            SubtitleEntry::new(2.0, 3.5, "two"),
        ]
    }

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("session"))
    }

    #[tokio::test]
    async fn round_trips_present_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let snapshot = SessionSnapshot {
            task_id: Some("abc-1".into()),
            media_filename: Some("clip.mp4".into()),
            started_at_ms: Some(1_700_000_000_000),
            original_track: Some(sample_entries()),
            ..Default::default()
        };
        store.save(&snapshot).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.task_id.as_deref(), Some("abc-1"));
        assert_eq!(loaded.media_filename.as_deref(), Some("clip.mp4"));
        assert_eq!(loaded.started_at_ms, Some(1_700_000_000_000));
        assert_eq!(loaded.original_track, Some(sample_entries()));
        assert_eq!(loaded.translated_track, None);
    }

    #[tokio::test]
    async fn sparse_save_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .save(&SessionSnapshot {
                task_id: Some("abc-1".into()),
                original_track: Some(sample_entries()),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .save(&SessionSnapshot {
                api_key: Some("sk-key".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.task_id.as_deref(), Some("abc-1"));
        assert_eq!(loaded.original_track, Some(sample_entries()));
        assert_eq!(loaded.api_key.as_deref(), Some("sk-key"));
    }

    #[tokio::test]
    async fn empty_track_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .save(&SessionSnapshot {
                original_track: Some(sample_entries()),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .save(&SessionSnapshot {
                original_track: Some(Vec::new()),
                ..Default::default()
            })
            .await
            .unwrap();

        // The empty save must not have clobbered the stored track.
        let loaded = store.load().await;
        assert_eq!(loaded.original_track, Some(sample_entries()));
    }

    #[tokio::test]
    async fn corrupted_track_degrades_to_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .save(&SessionSnapshot {
                task_id: Some("abc-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("session").join("original_track.json"), "{oops")
            .await
            .unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.original_track, None);
        assert_eq!(loaded.task_id.as_deref(), Some("abc-1"));
    }

    #[tokio::test]
    async fn clear_keeps_the_credential() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store
            .save(&SessionSnapshot {
                task_id: Some("abc-1".into()),
                started_at_ms: Some(42),
                original_track: Some(sample_entries()),
                api_key: Some("sk-key".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        store.clear().await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.api_key.as_deref(), Some("sk-key"));
        assert_eq!(loaded.task_id, None);
        assert_eq!(loaded.started_at_ms, None);
        assert_eq!(loaded.original_track, None);
    }

    #[tokio::test]
    async fn clear_on_a_fresh_store_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).clear().await.unwrap();
    }

    #[test]
    fn merge_present_overlays_only_present_fields() {
        let mut base = SessionSnapshot {
            task_id: Some("old".into()),
            media_filename: Some("old.mp4".into()),
            api_key: Some("sk-key".into()),
            ..Default::default()
        };
        base.merge_present(SessionSnapshot {
            task_id: Some("new".into()),
            started_at_ms: Some(7),
            ..Default::default()
        });

        assert_eq!(base.task_id.as_deref(), Some("new"));
        assert_eq!(base.media_filename.as_deref(), Some("old.mp4"));
        assert_eq!(base.api_key.as_deref(), Some("sk-key"));
        assert_eq!(base.started_at_ms, Some(7));
    }
}
