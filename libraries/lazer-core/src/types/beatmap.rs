/// Beatmap domain types
use crate::error::{CoreError, Result};
use crate::types::BeatmapSetId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key for the audio a beatmap plays
///
/// Two beatmaps with equal identities play the same audio stream, so
/// switching between them never needs a new track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioIdentity(String);

impl AudioIdentity {
    /// Create a new audio identity
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the inner key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One playable beatmap (difficulty) inside a set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatmapInfo {
    /// Difficulty name
    pub version: String,

    /// Audio this beatmap plays
    pub audio: AudioIdentity,

    /// Audio length in milliseconds
    pub length_ms: f64,
}

impl BeatmapInfo {
    /// Create a new beatmap
    pub fn new(version: impl Into<String>, audio: AudioIdentity, length_ms: f64) -> Self {
        Self {
            version: version.into(),
            audio,
            length_ms,
        }
    }
}

/// Beatmap set
///
/// The unit the music controller navigates between. Always holds at least
/// one beatmap; the first one is the one that gets played.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeatmapSet {
    /// Unique set identifier
    pub id: BeatmapSetId,

    /// Song title (playlist sort key)
    pub title: String,

    /// Song artist
    pub artist: String,

    /// Playable beatmaps, never empty
    beatmaps: Vec<BeatmapInfo>,
}

impl BeatmapSet {
    /// Create a new beatmap set
    ///
    /// # Errors
    /// Returns `CoreError::EmptyBeatmapSet` if `beatmaps` is empty
    pub fn new(
        id: BeatmapSetId,
        title: impl Into<String>,
        artist: impl Into<String>,
        beatmaps: Vec<BeatmapInfo>,
    ) -> Result<Self> {
        if beatmaps.is_empty() {
            return Err(CoreError::EmptyBeatmapSet(id));
        }

        Ok(Self {
            id,
            title: title.into(),
            artist: artist.into(),
            beatmaps,
        })
    }

    /// Get all beatmaps of the set
    pub fn beatmaps(&self) -> &[BeatmapInfo] {
        &self.beatmaps
    }

    /// Get the beatmap that plays when this set is selected
    pub fn first_beatmap(&self) -> &BeatmapInfo {
        // Non-empty by construction
        &self.beatmaps[0]
    }

    /// Get the audio identity of the played beatmap
    pub fn audio_identity(&self) -> &AudioIdentity {
        &self.first_beatmap().audio
    }

    /// Check if both sets play the same audio
    pub fn audio_equals(&self, other: &BeatmapSet) -> bool {
        self.audio_identity() == other.audio_identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beatmap(version: &str, audio: &str) -> BeatmapInfo {
        BeatmapInfo::new(version, AudioIdentity::new(audio), 90_000.0)
    }

    #[test]
    fn empty_set_is_rejected() {
        let result = BeatmapSet::new(BeatmapSetId::new(3), "Title", "Artist", vec![]);
        assert!(matches!(result, Err(CoreError::EmptyBeatmapSet(id)) if id.get() == 3));
    }

    #[test]
    fn first_beatmap_drives_audio_identity() {
        let set = BeatmapSet::new(
            BeatmapSetId::new(1),
            "Title",
            "Artist",
            vec![beatmap("Hard", "a.mp3"), beatmap("Easy", "b.mp3")],
        )
        .unwrap();

        assert_eq!(set.first_beatmap().version, "Hard");
        assert_eq!(set.audio_identity().as_str(), "a.mp3");
        assert_eq!(set.beatmaps().len(), 2);
    }

    #[test]
    fn audio_equality_ignores_set_identity() {
        let a = BeatmapSet::new(BeatmapSetId::new(1), "A", "X", vec![beatmap("1", "song.ogg")])
            .unwrap();
        let b = BeatmapSet::new(BeatmapSetId::new(2), "B", "Y", vec![beatmap("2", "song.ogg")])
            .unwrap();
        let c = BeatmapSet::new(BeatmapSetId::new(3), "C", "Z", vec![beatmap("3", "other.ogg")])
            .unwrap();

        assert!(a.audio_equals(&b));
        assert!(!a.audio_equals(&c));
    }
}
