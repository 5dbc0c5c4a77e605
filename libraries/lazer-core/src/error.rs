/// Core error types for Lazer Player
use crate::types::BeatmapSetId;
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Lazer Player
#[derive(Error, Debug)]
pub enum CoreError {
    /// A beatmap set was built without any playable beatmap
    #[error("Beatmap set {0} has no playable beatmaps")]
    EmptyBeatmapSet(BeatmapSetId),
}
