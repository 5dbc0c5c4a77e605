//! Playback Events
//!
//! Event-based communication for presentation layers. Events are emitted
//! when:
//! - The current beatmap set changes (with direction, for transitions)
//! - The current track starts or stops, whatever caused it
//! - The current track reaches its end
//! - Auto-advance runs off the end of the playlist

use crate::types::TrackChangeDirection;
use crossbeam_channel::{unbounded, Receiver, Sender};
use lazer_core::{BeatmapSet, BeatmapSetId};
use std::sync::Arc;

/// Events emitted by the music controller
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    /// Current set changed
    ///
    /// Emitted once per settled change, after the track was swapped.
    TrackChanged {
        /// New current set (`None` when the selection was cleared)
        set: Option<Arc<BeatmapSet>>,
        /// Direction for transition effects
        direction: TrackChangeDirection,
    },

    /// Current track started or stopped
    ///
    /// Reported for transport commands, scheduled restarts, natural ends
    /// and swaps to a track that is not running yet.
    StateChanged {
        /// Whether the track is now running
        running: bool,
    },

    /// Current track finished playing naturally
    TrackCompleted {
        /// Set whose track finished
        set_id: BeatmapSetId,
    },

    /// Last set completed and repeat is off
    PlaylistEnded,
}

impl PlaybackEvent {
    /// Id of the new set for `TrackChanged`, if any
    pub fn changed_set_id(&self) -> Option<BeatmapSetId> {
        match self {
            PlaybackEvent::TrackChanged { set, .. } => set.as_ref().map(|s| s.id),
            _ => None,
        }
    }
}

/// Event fan-out
///
/// Keeps a pending list for hosts that poll (`drain`) and forwards every
/// event to channel subscribers.
#[derive(Debug, Default)]
pub struct EventHub {
    pending: Vec<PlaybackEvent>,
    subscribers: Vec<Sender<PlaybackEvent>>,
}

impl EventHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and broadcast an event
    pub fn emit(&mut self, event: PlaybackEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        self.pending.push(event);
    }

    /// Take all pending events
    pub fn drain(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Check if there are pending events
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Subscribe to all future events
    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_pending() {
        let mut hub = EventHub::new();
        hub.emit(PlaybackEvent::StateChanged { running: true });
        hub.emit(PlaybackEvent::PlaylistEnded);

        assert!(hub.has_pending());
        assert_eq!(hub.drain().len(), 2);
        assert!(!hub.has_pending());
    }

    #[test]
    fn subscribers_see_events_independently_of_drain() {
        let mut hub = EventHub::new();
        let rx = hub.subscribe();

        hub.emit(PlaybackEvent::TrackCompleted {
            set_id: BeatmapSetId::new(5),
        });
        hub.drain();

        match rx.try_recv().unwrap() {
            PlaybackEvent::TrackCompleted { set_id } => assert_eq!(set_id.get(), 5),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn changed_set_id_only_for_track_changes() {
        let event = PlaybackEvent::TrackChanged {
            set: None,
            direction: TrackChangeDirection::Previous,
        };
        assert_eq!(event.changed_set_id(), None);
        assert_eq!(PlaybackEvent::PlaylistEnded.changed_set_id(), None);
    }
}
