//! Music controller - core orchestration
//!
//! Tracks the current beatmap set, owns the live track handle, and turns
//! transport and navigation requests into deferred work on the scheduling
//! tick.

use crate::{
    error::{PlaybackError, Result},
    events::{EventHub, PlaybackEvent},
    playlist::Playlist,
    scheduler::{Scheduler, TaskToken},
    selection::{SelectionBinding, SelectionChanged},
    track::{HandleId, TrackCompleted, TrackFactory, TrackHandle},
    types::{ControllerConfig, PlaylistState, PreviousTrackResult, RepeatMode, TrackChangeDirection},
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use lazer_core::{BeatmapSet, BeatmapSetId, PlaylistSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

type NextCallback = Box<dyn FnOnce() + Send>;
type PreviousCallback = Box<dyn FnOnce(PreviousTrackResult) + Send>;

/// Work deferred to the next scheduling tick
enum ScheduledAction {
    /// Debounced seek of the current track
    Seek(f64),

    /// Advance to the following set
    Next {
        wrap: bool,
        on_success: Option<NextCallback>,
    },

    /// Go back a set, or restart past the cutoff
    Previous { on_success: Option<PreviousCallback> },

    /// Restart whatever track is current when this runs
    Restart,

    /// Dispose superseded handles and settle the incoming one
    Swap {
        incoming: HandleId,
        retiring: Vec<TrackHandle>,
    },
}

/// Central playback control
///
/// Owns:
/// - The current beatmap set and its track handle (a silent placeholder
///   while nothing is selected)
/// - The deferred task queue (seek, navigation, track swap)
/// - The one-shot direction hint used by next/previous
///
/// All state changes happen on the thread calling [`update`](Self::update).
/// Completion signals from track handles may arrive from any thread and
/// are validated against the current handle before acting on them.
pub struct MusicController {
    config: ControllerConfig,
    factory: Box<dyn TrackFactory>,
    playlist: Option<Playlist>,

    // Selection binding shared with the presentation layer
    selection: SelectionBinding,
    selection_rx: Receiver<SelectionChanged>,
    acknowledged_selection: u64,

    // Current state
    current: Option<Arc<BeatmapSet>>,
    current_track: TrackHandle,
    next_handle_id: u64,
    queued_direction: Option<TrackChangeDirection>,
    playlist_state: PlaylistState,
    was_running: bool,

    // Deferred work
    scheduler: Scheduler<ScheduledAction>,
    pending_seek: Option<TaskToken>,
    pending_swap: Option<TaskToken>,
    tick_boundary: Option<TaskToken>,

    // End-of-media signals from handles
    completion_tx: Sender<TrackCompleted>,
    completion_rx: Receiver<TrackCompleted>,

    events: EventHub,
}

impl MusicController {
    /// Create a controller bound to a track factory and selection binding
    ///
    /// The playlist is empty until [`load`](Self::load) is called.
    pub fn new(
        config: ControllerConfig,
        factory: impl TrackFactory + 'static,
        selection: SelectionBinding,
    ) -> Self {
        let (completion_tx, completion_rx) = unbounded();

        let mut current_track = TrackHandle::new_virtual(
            HandleId::new(0),
            config.virtual_track_length_ms,
            completion_tx.clone(),
        );
        current_track.attach();

        let selection_rx = selection.subscribe();
        let acknowledged_selection = selection.version();

        Self {
            config,
            factory: Box::new(factory),
            playlist: None,
            selection,
            selection_rx,
            acknowledged_selection,
            current: None,
            current_track,
            next_handle_id: 1,
            queued_direction: None,
            playlist_state: PlaylistState::Playing,
            was_running: false,
            scheduler: Scheduler::new(),
            pending_seek: None,
            pending_swap: None,
            tick_boundary: None,
            completion_tx,
            completion_rx,
            events: EventHub::new(),
        }
    }

    /// Load the playlist and apply the current selection
    ///
    /// Sets are sorted by title once here; the order does not change for
    /// the rest of the session.
    pub fn load(&mut self, source: &dyn PlaylistSource) -> Result<()> {
        self.config.validate()?;

        let playlist = Playlist::load(source)?;
        info!("Loaded {} beatmap sets", playlist.len());
        self.playlist = Some(playlist);

        self.acknowledged_selection = self.selection.version();
        let selected = self.selection.value();
        self.change_set(selected);

        Ok(())
    }

    /// Get the playlist
    ///
    /// # Errors
    /// Returns `PlaybackError::NotLoaded` before [`load`](Self::load)
    pub fn beatmap_sets(&self) -> Result<&Playlist> {
        self.playlist.as_ref().ok_or(PlaybackError::NotLoaded)
    }

    // ===== Transport =====

    /// Start playback, from the beginning if `restart`
    ///
    /// A track that already played to its end starts over. Always succeeds;
    /// the placeholder track accepts it as a no-op.
    pub fn play(&mut self, restart: bool) -> bool {
        if restart || self.current_track.has_completed() {
            self.current_track.restart();
        } else {
            self.current_track.start();
        }

        self.sync_running_state();
        true
    }

    /// Pause playback, keeping the position
    pub fn pause(&mut self) {
        self.current_track.stop();
        self.sync_running_state();
    }

    /// Pause and seek back to the start
    pub fn stop(&mut self) -> bool {
        self.pause();
        self.seek_to(0.0);
        true
    }

    /// Pause if playing, play otherwise
    pub fn toggle_play(&mut self) -> bool {
        if self.current_track.is_running() {
            self.pause();
        } else {
            self.play(false);
        }

        true
    }

    /// Seek the current track on the next tick
    ///
    /// Cancels any seek still waiting, so rapid calls collapse to the last.
    pub fn seek_to(&mut self, position_ms: f64) {
        if let Some(token) = self.pending_seek.take() {
            self.scheduler.cancel(token);
        }

        self.pending_seek = Some(self.scheduler.schedule(ScheduledAction::Seek(position_ms)));
    }

    // ===== Navigation =====

    /// Advance to the next set on the next tick, wrapping at the end
    pub fn next_track(&mut self) {
        self.schedule_next(None);
    }

    /// Like [`next_track`](Self::next_track), calling `on_success` if the
    /// advance happened
    pub fn next_track_then(&mut self, on_success: impl FnOnce() + Send + 'static) {
        self.schedule_next(Some(Box::new(on_success)));
    }

    /// Go to the previous set on the next tick
    ///
    /// Past the restart cutoff the current track restarts instead. Does
    /// nothing while the selection is disabled.
    pub fn previous_track(&mut self) {
        self.schedule_previous(None);
    }

    /// Like [`previous_track`](Self::previous_track), calling `on_success`
    /// with the outcome unless it was [`PreviousTrackResult::None`]
    pub fn previous_track_then(
        &mut self,
        on_success: impl FnOnce(PreviousTrackResult) + Send + 'static,
    ) {
        self.schedule_previous(Some(Box::new(on_success)));
    }

    /// Select a set from the playlist, as a playlist list click does
    ///
    /// Selecting the current set seeks it to the start. Returns false for
    /// unknown sets or while the selection is disabled.
    pub fn select_set(&mut self, id: BeatmapSetId) -> bool {
        let Some(set) = self.playlist.as_ref().and_then(|p| p.get(id)).cloned() else {
            debug!("Ignoring selection of unknown beatmap set {}", id);
            return false;
        };

        if self.current_id() == Some(id) {
            self.current_track.seek(0.0);
            return true;
        }

        if self.selection.is_disabled() {
            return false;
        }

        self.change_set(Some(set));
        self.playlist_state = PlaylistState::Playing;
        self.scheduler.schedule(ScheduledAction::Restart);
        true
    }

    // ===== Scheduling tick =====

    /// Run one scheduling tick
    ///
    /// In order: pick up external selection changes, run the tasks that were
    /// queued before this tick, advance the current track by `elapsed`, and
    /// act on completion signals. Anything scheduled during the tick, swaps
    /// caused by external selection changes included, runs on the next one.
    pub fn update(&mut self, elapsed: Duration) {
        let boundary = self.scheduler.boundary();
        self.tick_boundary = Some(boundary);

        self.apply_selection_changes();
        self.run_scheduled(boundary);
        self.current_track.update(elapsed);
        self.process_completions();
        self.sync_running_state();

        self.tick_boundary = None;
    }

    /// Run one scheduling tick without advancing time
    pub fn tick(&mut self) {
        self.update(Duration::ZERO);
    }

    fn run_scheduled(&mut self, boundary: TaskToken) {
        while let Some((token, action)) = self.scheduler.pop_due(boundary) {
            self.run_action(token, action);
        }
    }

    fn run_action(&mut self, token: TaskToken, action: ScheduledAction) {
        match action {
            ScheduledAction::Seek(position_ms) => {
                if self.pending_seek == Some(token) {
                    self.pending_seek = None;
                }
                trace!("Seeking to {:.0}ms", position_ms);
                self.current_track.seek(position_ms);
            }
            ScheduledAction::Next { wrap, on_success } => {
                if self.run_next(wrap) {
                    if let Some(callback) = on_success {
                        callback();
                    }
                }
            }
            ScheduledAction::Previous { on_success } => {
                let result = self.run_previous();
                if result != PreviousTrackResult::None {
                    if let Some(callback) = on_success {
                        callback(result);
                    }
                }
            }
            ScheduledAction::Restart => self.current_track.restart(),
            ScheduledAction::Swap { incoming, retiring } => {
                if self.pending_swap == Some(token) {
                    self.pending_swap = None;
                }

                for mut handle in retiring {
                    handle.dispose();
                }

                if self.current_track.id() == incoming {
                    self.current_track.attach();
                }
            }
        }
    }

    fn schedule_next(&mut self, on_success: Option<NextCallback>) {
        self.scheduler.schedule(ScheduledAction::Next {
            wrap: true,
            on_success,
        });
    }

    fn schedule_previous(&mut self, on_success: Option<PreviousCallback>) {
        if self.selection.is_disabled() {
            debug!("Selection disabled, ignoring previous track request");
            return;
        }

        self.scheduler
            .schedule(ScheduledAction::Previous { on_success });
    }

    fn run_next(&mut self, wrap: bool) -> bool {
        if self.selection.is_disabled() {
            debug!("Selection disabled, ignoring next track request");
            return false;
        }

        let Some(playlist) = self.playlist.as_ref() else {
            return false;
        };

        let target = match &self.current {
            None => playlist.first(),
            Some(current) => playlist.set_after(current.id, wrap),
        };

        let Some(target) = target.cloned() else {
            let at_end = playlist.last().map(|s| s.id) == self.current_id();
            if !wrap && at_end && !playlist.is_empty() {
                self.end_of_list();
            }
            return false;
        };

        self.navigate_to(target, TrackChangeDirection::Next);
        true
    }

    fn run_previous(&mut self) -> PreviousTrackResult {
        if self.selection.is_disabled() {
            return PreviousTrackResult::None;
        }

        if self.current_track.current_time() >= self.config.restart_cutoff_ms {
            self.seek_to(0.0);
            return PreviousTrackResult::Restart;
        }

        let target = self.playlist.as_ref().and_then(|playlist| match &self.current {
            None => playlist.last(),
            Some(current) => playlist.set_before(current.id, true),
        });

        let Some(target) = target.cloned() else {
            return PreviousTrackResult::None;
        };

        self.navigate_to(target, TrackChangeDirection::Previous);
        PreviousTrackResult::Previous
    }

    fn navigate_to(&mut self, target: Arc<BeatmapSet>, direction: TrackChangeDirection) {
        self.queued_direction = Some(direction);
        self.change_set(Some(target));
        // A no-op change must not leave the hint for an unrelated one
        self.queued_direction = None;

        self.playlist_state = PlaylistState::Playing;
        self.scheduler.schedule(ScheduledAction::Restart);
    }

    fn end_of_list(&mut self) {
        if self.playlist_state == PlaylistState::EndOfList {
            return;
        }

        info!("Reached end of playlist");
        self.playlist_state = PlaylistState::EndOfList;
        self.events.emit(PlaybackEvent::PlaylistEnded);
    }

    // ===== Current set changes =====

    fn change_set(&mut self, new: Option<Arc<BeatmapSet>>) {
        let new_id = new.as_ref().map(|s| s.id);
        if new_id == self.current_id() {
            return;
        }

        let audio_equals = match (&self.current, &new) {
            (Some(current), Some(new)) => current.audio_equals(new),
            _ => false,
        };

        let direction = match &self.current {
            None => TrackChangeDirection::None,
            Some(_) if audio_equals => TrackChangeDirection::None,
            Some(current) => {
                let current_id = current.id;
                match self.queued_direction.take() {
                    Some(queued) => queued,
                    None => self.infer_direction(current_id, new_id),
                }
            }
        };

        self.current = new;

        if !audio_equals || self.current_track.is_virtual() {
            self.change_track();
        } else if let Some(id) = new_id {
            // Same audio: keep the live track, only re-point it
            self.current_track.rebind(id);
        }

        match new_id {
            Some(id) => debug!("Current beatmap set is now {} ({:?})", id, direction),
            None => debug!("Current beatmap set cleared"),
        }

        self.events.emit(PlaybackEvent::TrackChanged {
            set: self.current.clone(),
            direction,
        });

        self.queued_direction = None;
        self.sync_selection();
    }

    /// Direction from relative playlist position
    ///
    /// A set missing from the playlist counts as after every listed set, a
    /// cleared selection as before all of them.
    fn infer_direction(
        &self,
        old: BeatmapSetId,
        new: Option<BeatmapSetId>,
    ) -> TrackChangeDirection {
        let Some(new) = new else {
            return TrackChangeDirection::Previous;
        };

        let (last, next) = match &self.playlist {
            Some(playlist) => (playlist.count_preceding(old), playlist.count_preceding(new)),
            None => (0, 0),
        };

        if last > next {
            TrackChangeDirection::Previous
        } else {
            TrackChangeDirection::Next
        }
    }

    fn change_track(&mut self) {
        let incoming = self.load_handle();
        let incoming_id = incoming.id();
        let outgoing = std::mem::replace(&mut self.current_track, incoming);

        // Fold a swap waiting for the same tick as this one; a swap already
        // due in the running tick is left to dispose its handles on time
        let foldable = self
            .pending_swap
            .filter(|token| self.tick_boundary.map_or(true, |boundary| *token >= boundary));
        let mut retiring = match foldable.and_then(|t| self.scheduler.cancel(t)) {
            Some(ScheduledAction::Swap { retiring, .. }) => retiring,
            _ => Vec::new(),
        };
        retiring.push(outgoing);

        trace!(
            "Swapping in track handle {}, retiring {}",
            incoming_id,
            retiring.len()
        );

        self.pending_swap = Some(self.scheduler.schedule(ScheduledAction::Swap {
            incoming: incoming_id,
            retiring,
        }));
    }

    fn load_handle(&mut self) -> TrackHandle {
        let id = HandleId::new(self.next_handle_id);
        self.next_handle_id += 1;

        let mut handle = match &self.current {
            Some(set) => {
                let track = self.factory.load_track(set);
                TrackHandle::new(id, set.id, track, self.completion_tx.clone())
            }
            None => TrackHandle::new_virtual(
                id,
                self.config.virtual_track_length_ms,
                self.completion_tx.clone(),
            ),
        };

        if self.config.repeat == RepeatMode::Solo {
            handle.set_looping(true);
        }

        handle
    }

    /// Push the current set into the shared binding
    ///
    /// The written version is acknowledged so the change notification it
    /// produces is not treated as an external selection.
    fn sync_selection(&mut self) {
        let current_id = self.current_id();
        if self.selection.value_id() == current_id {
            return;
        }

        match self.selection.set(self.current.clone()) {
            Ok(version) => self.acknowledged_selection = version,
            Err(err) => warn!("Could not sync selection: {}", err),
        }
    }

    fn apply_selection_changes(&mut self) {
        if self.playlist.is_none() {
            return;
        }

        let Some(latest) = self.selection_rx.try_iter().map(|c| c.version).max() else {
            return;
        };

        if latest <= self.acknowledged_selection {
            return;
        }
        self.acknowledged_selection = latest;

        let selected = self.selection.value();
        self.change_set(selected);
    }

    /// Emit `StateChanged` if the current track started or stopped since
    /// the last check
    ///
    /// Covers restarts run by the scheduler, natural ends and handle swaps as
    /// well as explicit play and pause.
    fn sync_running_state(&mut self) {
        let running = self.current_track.is_running();
        if running != self.was_running {
            self.was_running = running;
            self.events.emit(PlaybackEvent::StateChanged { running });
        }
    }

    // ===== Track completion =====

    fn process_completions(&mut self) {
        let completions: Vec<_> = self.completion_rx.try_iter().collect();
        for completed in completions {
            self.on_track_completed(completed);
        }
    }

    fn on_track_completed(&mut self, completed: TrackCompleted) {
        let Some(current_id) = self.current_id() else {
            return;
        };

        if completed.handle != self.current_track.id()
            || self.current_track.set_id() != Some(current_id)
        {
            debug!("Ignoring stale completion from track handle {}", completed.handle);
            return;
        }

        self.events
            .emit(PlaybackEvent::TrackCompleted { set_id: current_id });

        if self.current_track.looping() {
            return;
        }

        self.scheduler.schedule(ScheduledAction::Next {
            wrap: self.config.repeat != RepeatMode::None,
            on_success: None,
        });
    }

    // ===== Settings =====

    /// Get the configuration
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Get the repeat mode
    pub fn repeat(&self) -> RepeatMode {
        self.config.repeat
    }

    /// Set the repeat mode
    ///
    /// `Solo` loops the current track and every track loaded after it.
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.config.repeat = mode;
        self.current_track.set_looping(mode == RepeatMode::Solo);
    }

    // ===== State Queries =====

    /// Get the current set
    pub fn current(&self) -> Option<&Arc<BeatmapSet>> {
        self.current.as_ref()
    }

    /// Get the id of the current set
    pub fn current_id(&self) -> Option<BeatmapSetId> {
        self.current.as_ref().map(|s| s.id)
    }

    /// Get the current track handle
    pub fn current_track(&self) -> &TrackHandle {
        &self.current_track
    }

    /// Get the current track handle mutably
    pub fn current_track_mut(&mut self) -> &mut TrackHandle {
        &mut self.current_track
    }

    /// Check if the current track is playing
    pub fn is_playing(&self) -> bool {
        self.current_track.is_running()
    }

    /// Check if the current track's audio is available
    pub fn track_loaded(&self) -> bool {
        self.current_track.is_loaded()
    }

    /// Get the selection binding
    pub fn selection(&self) -> &SelectionBinding {
        &self.selection
    }

    /// Get the playlist state
    pub fn playlist_state(&self) -> PlaylistState {
        self.playlist_state
    }

    /// Get the direction hint waiting for the next change
    pub fn queued_direction(&self) -> Option<TrackChangeDirection> {
        self.queued_direction
    }

    /// Check if a seek is waiting for the next tick
    pub fn has_pending_seek(&self) -> bool {
        self.pending_seek.is_some()
    }

    /// Check if a track swap is waiting for the next tick
    pub fn has_pending_swap(&self) -> bool {
        self.pending_swap.is_some()
    }

    /// Number of superseded handles waiting to be disposed
    pub fn retiring_count(&self) -> usize {
        match self.pending_swap.and_then(|t| self.scheduler.get(t)) {
            Some(ScheduledAction::Swap { retiring, .. }) => retiring.len(),
            _ => 0,
        }
    }

    /// Number of tasks waiting for the next tick
    pub fn pending_task_count(&self) -> usize {
        self.scheduler.len()
    }

    // ===== Events =====

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.events.drain()
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        self.events.has_pending()
    }

    /// Subscribe to all future events
    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::VirtualTrackFactory;
    use lazer_core::{AudioIdentity, BeatmapInfo, InMemoryLibrary};

    fn set(id: i64, title: &str, audio: &str) -> BeatmapSet {
        BeatmapSet::new(
            BeatmapSetId::new(id),
            title,
            "Artist",
            vec![BeatmapInfo::new("Normal", AudioIdentity::new(audio), 60_000.0)],
        )
        .unwrap()
    }

    fn loaded(sets: Vec<BeatmapSet>) -> MusicController {
        let mut controller = MusicController::new(
            ControllerConfig::default(),
            VirtualTrackFactory,
            SelectionBinding::new(),
        );
        controller.load(&InMemoryLibrary::new(sets)).unwrap();
        controller
    }

    #[test]
    fn playlist_is_unavailable_before_load() {
        let controller = MusicController::new(
            ControllerConfig::default(),
            VirtualTrackFactory,
            SelectionBinding::new(),
        );
        assert!(matches!(
            controller.beatmap_sets(),
            Err(PlaybackError::NotLoaded)
        ));
        assert!(controller.current_track().is_virtual());
    }

    #[test]
    fn load_rejects_invalid_config() {
        let config = ControllerConfig {
            restart_cutoff_ms: f64::INFINITY,
            ..ControllerConfig::default()
        };
        let mut controller =
            MusicController::new(config, VirtualTrackFactory, SelectionBinding::new());

        let result = controller.load(&InMemoryLibrary::default());
        assert!(matches!(result, Err(PlaybackError::InvalidConfig(_))));
    }

    #[test]
    fn direction_inference_uses_playlist_position() {
        let controller = loaded(vec![
            set(1, "A", "a.mp3"),
            set(2, "B", "b.mp3"),
            set(3, "C", "c.mp3"),
        ]);
        let id = BeatmapSetId::new;

        assert_eq!(
            controller.infer_direction(id(1), Some(id(3))),
            TrackChangeDirection::Next
        );
        assert_eq!(
            controller.infer_direction(id(3), Some(id(2))),
            TrackChangeDirection::Previous
        );
        // Unknown target sorts after everything
        assert_eq!(
            controller.infer_direction(id(3), Some(id(42))),
            TrackChangeDirection::Next
        );
        assert_eq!(
            controller.infer_direction(id(1), None),
            TrackChangeDirection::Previous
        );
    }

    #[test]
    fn nothing_selected_next_goes_to_first_previous_to_last() {
        let mut controller = loaded(vec![set(1, "A", "a.mp3"), set(2, "B", "b.mp3")]);
        controller.next_track();
        controller.tick();
        assert_eq!(controller.current_id(), Some(BeatmapSetId::new(1)));

        let mut controller = loaded(vec![set(1, "A", "a.mp3"), set(2, "B", "b.mp3")]);
        controller.previous_track();
        controller.tick();
        assert_eq!(controller.current_id(), Some(BeatmapSetId::new(2)));
    }

    #[test]
    fn seek_token_is_cleared_after_running() {
        let mut controller = loaded(vec![set(1, "A", "a.mp3")]);
        controller.seek_to(10.0);
        assert!(controller.has_pending_seek());

        controller.tick();
        assert!(!controller.has_pending_seek());
        assert_eq!(controller.pending_task_count(), 0);
    }
}
