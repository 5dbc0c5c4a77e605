//! Lazer Player - Playback Control
//!
//! Keeps track of which beatmap set is current and owns the lifecycle of
//! its audio track.
//!
//! This crate provides:
//! - Current set tracking with transition direction (next/previous/none)
//! - Transport control (play, pause, stop, toggle, debounced seek)
//! - Playlist navigation with wraparound and a restart cutoff for "previous"
//! - Track handle swapping with deferred disposal of superseded tracks
//! - Repeat modes (None, List, Solo)
//! - Change notifications for presentation layers
//!
//! # Architecture
//!
//! `lazer-playback` does no decoding and no output. Its collaborators come
//! in through traits:
//! - [`PlaylistSource`](lazer_core::PlaylistSource) supplies the sets once
//! - [`TrackFactory`] turns a set into a playable [`Track`]
//! - [`SelectionBinding`] is the "selected set" cell shared with the UI
//!
//! Every mutating navigation call is deferred to the next
//! [`MusicController::update`] tick, so a track is never replaced or
//! disposed while the current frame may still use it.
//!
//! # Example
//!
//! ```rust
//! use lazer_core::{AudioIdentity, BeatmapInfo, BeatmapSet, BeatmapSetId, InMemoryLibrary};
//! use lazer_playback::{
//!     ControllerConfig, MusicController, SelectionBinding, TrackChangeDirection,
//!     VirtualTrackFactory,
//! };
//!
//! let sets = (1..=3)
//!     .map(|i| {
//!         BeatmapSet::new(
//!             BeatmapSetId::new(i),
//!             format!("Song {}", i),
//!             "Artist",
//!             vec![BeatmapInfo::new(
//!                 "Normal",
//!                 AudioIdentity::new(format!("{}.mp3", i)),
//!                 90_000.0,
//!             )],
//!         )
//!         .unwrap()
//!     })
//!     .collect::<InMemoryLibrary>();
//!
//! let mut controller = MusicController::new(
//!     ControllerConfig::default(),
//!     VirtualTrackFactory,
//!     SelectionBinding::new(),
//! );
//! controller.load(&sets).unwrap();
//!
//! controller.next_track();
//! controller.tick(); // navigation runs here
//! controller.tick(); // old track disposed, new one restarted
//!
//! assert_eq!(controller.current_id(), Some(BeatmapSetId::new(1)));
//! assert!(controller.is_playing());
//! ```

mod controller;
mod error;
mod events;
mod playlist;
mod scheduler;
mod selection;
mod track;
pub mod types;

// Public exports
pub use controller::MusicController;
pub use error::{PlaybackError, Result};
pub use events::{EventHub, PlaybackEvent};
pub use playlist::Playlist;
pub use scheduler::{Scheduler, TaskToken};
pub use selection::{SelectionBinding, SelectionChanged};
pub use track::{
    CompletionNotifier, HandleId, HandleState, Track, TrackCompleted, TrackFactory, TrackHandle,
    VirtualTrack, VirtualTrackFactory,
};
pub use types::{
    ControllerConfig, PlaylistState, PreviousTrackResult, RepeatMode, TrackChangeDirection,
    RESTART_CUTOFF_MS,
};
