//! In-memory playlist source

use crate::error::Result;
use crate::traits::PlaylistSource;
use crate::types::BeatmapSet;

/// Playlist source backed by a fixed list of sets
///
/// Used by hosts that already hold their library in memory (a parsed
/// manifest, test fixtures).
#[derive(Debug, Clone, Default)]
pub struct InMemoryLibrary {
    sets: Vec<BeatmapSet>,
}

impl InMemoryLibrary {
    /// Create a library over the given sets
    pub fn new(sets: Vec<BeatmapSet>) -> Self {
        Self { sets }
    }

    /// Add a set to the library
    pub fn push(&mut self, set: BeatmapSet) {
        self.sets.push(set);
    }

    /// Number of sets held
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Check if the library holds no sets
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl PlaylistSource for InMemoryLibrary {
    fn playable_sets(&self) -> Result<Vec<BeatmapSet>> {
        Ok(self.sets.clone())
    }
}

impl FromIterator<BeatmapSet> for InMemoryLibrary {
    fn from_iter<I: IntoIterator<Item = BeatmapSet>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
