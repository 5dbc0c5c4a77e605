/// Beatmap set manifest
///
/// TOML description of the playlist the player loads:
///
/// ```toml
/// [[sets]]
/// id = 1
/// title = "Blue Zenith"
/// artist = "xi"
///
/// [[sets.beatmaps]]
/// version = "FOUR DIMENSIONS"
/// audio = "blue-zenith.mp3"
/// length_ms = 213000.0
/// ```
use anyhow::{Context, Result};
use lazer_core::{AudioIdentity, BeatmapInfo, BeatmapSet, BeatmapSetId, InMemoryLibrary};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub sets: Vec<SetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetEntry {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub beatmaps: Vec<BeatmapEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BeatmapEntry {
    pub version: String,
    pub audio: String,
    pub length_ms: f64,
}

impl Manifest {
    /// Read a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest = Self::parse(&text)
            .with_context(|| format!("Invalid manifest {}", path.display()))?;

        info!(
            "Loaded manifest {} with {} beatmap sets",
            path.display(),
            manifest.sets.len()
        );
        Ok(manifest)
    }

    /// Parse manifest text
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Build the library the controller loads from
    ///
    /// Fails on sets without beatmaps.
    pub fn into_library(self) -> Result<InMemoryLibrary> {
        self.sets
            .into_iter()
            .map(SetEntry::into_beatmap_set)
            .collect()
    }
}

impl SetEntry {
    fn into_beatmap_set(self) -> Result<BeatmapSet> {
        let beatmaps = self
            .beatmaps
            .into_iter()
            .map(|b| BeatmapInfo::new(b.version, AudioIdentity::new(b.audio), b.length_ms))
            .collect();

        BeatmapSet::new(BeatmapSetId::new(self.id), self.title, self.artist, beatmaps)
            .with_context(|| format!("Beatmap set {} is unusable", self.id))
    }
}
