//! Property-based tests for the music controller
//!
//! Uses proptest to check navigation and seek invariants across random
//! playlists and command sequences.

use lazer_core::{AudioIdentity, BeatmapInfo, BeatmapSet, BeatmapSetId, InMemoryLibrary};
use lazer_playback::{
    ControllerConfig, HandleState, MusicController, PreviousTrackResult, SelectionBinding,
    VirtualTrackFactory, RESTART_CUTOFF_MS,
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ===== Helpers =====

/// Playlist of `count` sets whose title order matches id order
fn playlist(count: usize) -> Vec<BeatmapSet> {
    (1..=count as i64)
        .rev()
        .map(|i| {
            BeatmapSet::new(
                BeatmapSetId::new(i),
                format!("Song {:03}", i),
                "Artist",
                vec![BeatmapInfo::new(
                    "Normal",
                    AudioIdentity::new(format!("{}.mp3", i)),
                    600_000.0,
                )],
            )
            .unwrap()
        })
        .collect()
}

fn controller_at(sets: Vec<BeatmapSet>, start: Option<usize>) -> MusicController {
    let selected = start.and_then(|index| sets.iter().find(|s| s.id.get() == index as i64 + 1));
    let selection = match selected {
        Some(set) => SelectionBinding::with_value(Arc::new(set.clone())),
        None => SelectionBinding::new(),
    };

    let mut controller =
        MusicController::new(ControllerConfig::default(), VirtualTrackFactory, selection);
    controller.load(&InMemoryLibrary::new(sets)).unwrap();
    controller.tick();
    controller.tick();
    controller
}

fn arbitrary_start() -> impl Strategy<Value = (usize, usize)> {
    (1usize..20).prop_flat_map(|count| (Just(count), 0..count))
}

// ===== Property Tests =====

proptest! {
    /// Property: N next calls on an N-set playlist come back to the start
    #[test]
    fn next_wraps_around_to_start((count, start) in arbitrary_start()) {
        let mut controller = controller_at(playlist(count), Some(start));
        let initial = controller.current_id();
        prop_assert!(initial.is_some());

        for _ in 0..count {
            controller.next_track();
            controller.tick();
        }

        prop_assert_eq!(controller.current_id(), initial);
    }

    /// Property: next visits sets in title order
    #[test]
    fn next_follows_playlist_order(count in 1usize..20) {
        let mut controller = controller_at(playlist(count), None);
        let mut visited = Vec::new();

        for _ in 0..count {
            controller.next_track();
            controller.tick();
            visited.push(controller.current_id().unwrap().get());
        }

        let expected: Vec<i64> = (1..=count as i64).collect();
        prop_assert_eq!(visited, expected);
    }

    /// Property: next then previous at the start of the track is a round trip
    #[test]
    fn next_then_previous_returns((count, start) in arbitrary_start()) {
        let mut controller = controller_at(playlist(count), Some(start));
        let initial = controller.current_id();

        controller.next_track();
        controller.tick();
        controller.tick();

        controller.previous_track();
        controller.tick();

        prop_assert_eq!(controller.current_id(), initial);
    }

    /// Property: only the last of a burst of seeks lands
    #[test]
    fn rapid_seeks_collapse_to_last(
        positions in prop::collection::vec(0.0f64..500_000.0, 1..10)
    ) {
        let mut controller = controller_at(playlist(3), Some(0));

        for position in &positions {
            controller.seek_to(*position);
        }
        prop_assert_eq!(controller.pending_task_count(), 1);

        controller.tick();
        prop_assert_eq!(
            controller.current_track().current_time(),
            *positions.last().unwrap()
        );
    }

    /// Property: previous restarts exactly when the position reached the cutoff
    #[test]
    fn previous_restarts_past_cutoff(position_ms in 0u64..10_000) {
        let mut controller = controller_at(playlist(3), Some(1));
        controller.play(false);
        controller.update(Duration::from_millis(position_ms));

        let result = Arc::new(Mutex::new(None));
        let slot = result.clone();
        controller.previous_track_then(move |r| *slot.lock().unwrap() = Some(r));
        controller.tick();

        let expected = if position_ms as f64 >= RESTART_CUTOFF_MS {
            PreviousTrackResult::Restart
        } else {
            PreviousTrackResult::Previous
        };
        prop_assert_eq!(*result.lock().unwrap(), Some(expected));
    }

    /// Property: after any command sequence the live handle, the current set
    /// and the selection binding agree
    #[test]
    fn state_stays_consistent(
        count in 1usize..8,
        operations in prop::collection::vec((0u8..7, 0usize..8), 1..40)
    ) {
        let mut controller = controller_at(playlist(count), None);

        for (op, arg) in operations {
            match op {
                0 => controller.next_track(),
                1 => controller.previous_track(),
                2 => controller.seek_to(arg as f64 * 1000.0),
                3 => {
                    controller.select_set(BeatmapSetId::new(arg as i64 + 1));
                }
                4 => {
                    controller.toggle_play();
                }
                5 => controller.update(Duration::from_millis(arg as u64 * 700)),
                _ => controller.tick(),
            }

            let track = controller.current_track();
            prop_assert_ne!(track.state(), HandleState::Disposed);
            prop_assert_eq!(track.set_id(), controller.current_id());
            prop_assert_eq!(controller.selection().value_id(), controller.current_id());
        }
    }
}
