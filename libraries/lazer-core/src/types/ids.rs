/// ID types for Lazer Player entities
use serde::{Deserialize, Serialize};
use std::fmt;

/// Beatmap set identifier
///
/// Stable for the lifetime of a session; the playlist orders and looks up
/// sets by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeatmapSetId(i64);

impl BeatmapSetId {
    /// Create a new beatmap set ID
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for BeatmapSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BeatmapSetId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
