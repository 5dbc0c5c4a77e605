//! Error types for playback management

use lazer_core::{BeatmapSetId, CoreError};
use thiserror::Error;

/// Playback errors
///
/// Transport and navigation never fail; these cover loading, configuration
/// and writes to a locked selection.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Playlist accessed before the controller was loaded
    #[error("Beatmap sets should not be accessed before the music controller is loaded")]
    NotLoaded,

    /// Two sets in the playlist share an identifier
    #[error("Duplicate beatmap set in playlist: {0}")]
    DuplicateBeatmapSet(BeatmapSetId),

    /// The selection binding is disabled (read-only)
    #[error("Selection is disabled")]
    SelectionDisabled,

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error from the core crate (playlist source, set construction)
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
