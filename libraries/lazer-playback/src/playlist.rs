//! Playlist order and navigation
//!
//! The playlist is fixed once loaded: sorted by title, identifiers unique.
//! Navigation helpers never move when the reference set is not in the list.

use crate::error::{PlaybackError, Result};
use lazer_core::{BeatmapSet, BeatmapSetId, PlaylistSource};
use std::collections::HashSet;
use std::sync::Arc;

/// Ordered, immutable list of playable beatmap sets
///
/// ```text
/// index:  0        1        2
///        [Alpha]  [Bravo]  [Charlie]     (sorted by title)
///
/// set_after(Charlie, wrap = true)  -> Alpha
/// set_before(Alpha, wrap = true)   -> Charlie
/// set_after(Charlie, wrap = false) -> None
/// ```
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    sets: Vec<Arc<BeatmapSet>>,
}

impl Playlist {
    /// Build a playlist from the source's playable sets
    pub fn load(source: &dyn PlaylistSource) -> Result<Self> {
        Self::from_sets(source.playable_sets()?)
    }

    /// Build a playlist from a list of sets
    ///
    /// Sets are stable-sorted by title, so equal titles keep source order.
    ///
    /// # Errors
    /// Returns `PlaybackError::DuplicateBeatmapSet` if two sets share an id
    pub fn from_sets(mut sets: Vec<BeatmapSet>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(sets.len());
        for set in &sets {
            if !seen.insert(set.id) {
                return Err(PlaybackError::DuplicateBeatmapSet(set.id));
            }
        }

        sets.sort_by(|a, b| a.title.cmp(&b.title));

        Ok(Self {
            sets: sets.into_iter().map(Arc::new).collect(),
        })
    }

    /// Get position of a set in the playlist
    pub fn position_of(&self, id: BeatmapSetId) -> Option<usize> {
        self.sets.iter().position(|set| set.id == id)
    }

    /// Count sets that come before `id`
    ///
    /// Returns the playlist length when `id` is not in the playlist.
    pub fn count_preceding(&self, id: BeatmapSetId) -> usize {
        self.position_of(id).unwrap_or(self.sets.len())
    }

    /// Get the set following `id`
    ///
    /// With `wrap`, the last set is followed by the first one.
    pub fn set_after(&self, id: BeatmapSetId, wrap: bool) -> Option<&Arc<BeatmapSet>> {
        let index = self.position_of(id)?;

        match self.sets.get(index + 1) {
            Some(set) => Some(set),
            None if wrap => self.first(),
            None => None,
        }
    }

    /// Get the set preceding `id`
    ///
    /// With `wrap`, the first set is preceded by the last one.
    pub fn set_before(&self, id: BeatmapSetId, wrap: bool) -> Option<&Arc<BeatmapSet>> {
        let index = self.position_of(id)?;

        if index > 0 {
            self.sets.get(index - 1)
        } else if wrap {
            self.last()
        } else {
            None
        }
    }

    /// Get a set by id
    pub fn get(&self, id: BeatmapSetId) -> Option<&Arc<BeatmapSet>> {
        self.sets.iter().find(|set| set.id == id)
    }

    /// Get the first set
    pub fn first(&self) -> Option<&Arc<BeatmapSet>> {
        self.sets.first()
    }

    /// Get the last set
    pub fn last(&self) -> Option<&Arc<BeatmapSet>> {
        self.sets.last()
    }

    /// Number of sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Check if the playlist is empty
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Iterate sets in playlist order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<BeatmapSet>> {
        self.sets.iter()
    }
}
