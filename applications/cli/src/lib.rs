/// Lazer Player - headless host for the playback controller
///
/// Loads a beatmap set manifest, wires a [`MusicController`] to silent
/// virtual tracks, and drives it from line commands.
///
/// [`MusicController`]: lazer_playback::MusicController
pub mod commands;
pub mod config;
pub mod manifest;
pub mod session;

pub use commands::{Command, CommandError};
pub use config::PlayerConfig;
pub use manifest::Manifest;
pub use session::Session;
