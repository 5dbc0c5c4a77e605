//! Core types for playback management

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// Restart cutoff in milliseconds
///
/// Pressing "previous" past this point restarts the current track instead
/// of going back a set.
pub const RESTART_CUTOFF_MS: f64 = 5000.0;

/// Length of the placeholder track used while nothing is selected
pub const VIRTUAL_TRACK_LENGTH_MS: f64 = 1000.0;

/// Classification of a current-set change, for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackChangeDirection {
    /// No direction (same audio, or first selection)
    None,

    /// Moved forward in the playlist
    Next,

    /// Moved backward in the playlist
    Previous,
}

/// Outcome of a "previous" request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviousTrackResult {
    /// Nothing happened (selection disabled, empty playlist)
    None,

    /// Current track was past the cutoff and got restarted
    Restart,

    /// Moved to the previous set (or wrapped to the last one)
    Previous,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop at the end of the playlist
    None,

    /// Wrap from the last set to the first
    List,

    /// Loop the current track
    Solo,
}

/// Whether auto-advance ran off the end of the playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaylistState {
    /// Playing through the list
    Playing,

    /// Last set completed with repeat off
    EndOfList,
}

/// Configuration for the music controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Position past which "previous" restarts instead (default: 5000)
    #[serde(default = "default_restart_cutoff_ms")]
    pub restart_cutoff_ms: f64,

    /// Repeat mode (default: List)
    #[serde(default = "default_repeat")]
    pub repeat: RepeatMode,

    /// Length of the placeholder track (default: 1000)
    #[serde(default = "default_virtual_track_length_ms")]
    pub virtual_track_length_ms: f64,
}

impl ControllerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.restart_cutoff_ms.is_finite() || self.restart_cutoff_ms < 0.0 {
            return Err(PlaybackError::InvalidConfig(format!(
                "restart_cutoff_ms must be a non-negative number, got {}",
                self.restart_cutoff_ms
            )));
        }

        if !self.virtual_track_length_ms.is_finite() || self.virtual_track_length_ms <= 0.0 {
            return Err(PlaybackError::InvalidConfig(format!(
                "virtual_track_length_ms must be positive, got {}",
                self.virtual_track_length_ms
            )));
        }

        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            restart_cutoff_ms: default_restart_cutoff_ms(),
            repeat: default_repeat(),
            virtual_track_length_ms: default_virtual_track_length_ms(),
        }
    }
}

fn default_restart_cutoff_ms() -> f64 {
    RESTART_CUTOFF_MS
}

fn default_repeat() -> RepeatMode {
    RepeatMode::List
}

fn default_virtual_track_length_ms() -> f64 {
    VIRTUAL_TRACK_LENGTH_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.restart_cutoff_ms, 5000.0);
        assert_eq!(config.repeat, RepeatMode::List);
        assert_eq!(config.virtual_track_length_ms, 1000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ControllerConfig = serde_json::from_str(r#"{"repeat":"solo"}"#).unwrap();
        assert_eq!(config.repeat, RepeatMode::Solo);
        assert_eq!(config.restart_cutoff_ms, RESTART_CUTOFF_MS);
    }

    #[test]
    fn rejects_bad_values() {
        let config = ControllerConfig {
            restart_cutoff_ms: -1.0,
            ..ControllerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PlaybackError::InvalidConfig(_))
        ));

        let config = ControllerConfig {
            virtual_track_length_ms: f64::NAN,
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
