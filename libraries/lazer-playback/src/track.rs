//! Track handles
//!
//! A [`Track`] is the collaborator's playable audio resource. The controller
//! never holds one directly; it wraps each in a [`TrackHandle`] that adds an
//! identity, a lifecycle, and the end-of-media signal.

use crossbeam_channel::Sender;
use lazer_core::{BeatmapSet, BeatmapSetId};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Platform-agnostic playable track
///
/// Implementors own the actual audio resource (a decoder stream, a mixer
/// channel). Positions and lengths are milliseconds.
pub trait Track: Send {
    /// Start or resume playback
    fn start(&mut self);

    /// Stop playback, keeping the position
    fn stop(&mut self);

    /// Seek to a position
    ///
    /// Returns false if the position was outside the track (it is clamped).
    fn seek(&mut self, position_ms: f64) -> bool;

    /// Current playback position
    fn current_time(&self) -> f64;

    /// Total length
    fn length(&self) -> f64;

    /// Check if the track is playing
    fn is_running(&self) -> bool;

    /// Check if playback reached the end of the media on its own
    fn has_completed(&self) -> bool;

    /// Loop back to the start instead of completing
    fn set_looping(&mut self, looping: bool);

    /// Check if the audio data is available
    fn is_loaded(&self) -> bool {
        true
    }

    /// Advance by `elapsed` wall time
    ///
    /// Tracks driven by an audio device ignore this; clock-driven tracks
    /// use it to move their position.
    fn update(&mut self, elapsed: Duration) {
        let _ = elapsed;
    }

    /// Release the underlying audio resource
    fn dispose(&mut self) {}
}

/// Loads playable tracks for beatmap sets
///
/// Called synchronously on every audio change. Loading failures are the
/// factory's concern: it must always hand back something playable, falling
/// back to a [`VirtualTrack`] if the audio is missing.
pub trait TrackFactory: Send {
    /// Load the track of the set's first beatmap
    fn load_track(&mut self, set: &BeatmapSet) -> Box<dyn Track>;
}

impl<F> TrackFactory for F
where
    F: FnMut(&BeatmapSet) -> Box<dyn Track> + Send,
{
    fn load_track(&mut self, set: &BeatmapSet) -> Box<dyn Track> {
        self(set)
    }
}

/// Factory producing silent tracks as long as each set's first beatmap
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualTrackFactory;

impl TrackFactory for VirtualTrackFactory {
    fn load_track(&mut self, set: &BeatmapSet) -> Box<dyn Track> {
        Box::new(VirtualTrack::new(set.first_beatmap().length_ms))
    }
}

/// Silent track that advances on the supplied clock
///
/// Stands in while nothing is selected, and serves hosts that simulate
/// playback without an audio device.
#[derive(Debug, Clone)]
pub struct VirtualTrack {
    length_ms: f64,
    position_ms: f64,
    running: bool,
    looping: bool,
    completed: bool,
}

impl VirtualTrack {
    /// Create a stopped virtual track of the given length
    pub fn new(length_ms: f64) -> Self {
        Self {
            length_ms: length_ms.max(0.0),
            position_ms: 0.0,
            running: false,
            looping: false,
            completed: false,
        }
    }
}

impl Track for VirtualTrack {
    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn seek(&mut self, position_ms: f64) -> bool {
        let clamped = position_ms.clamp(0.0, self.length_ms);
        self.position_ms = clamped;
        self.completed = false;
        clamped == position_ms
    }

    fn current_time(&self) -> f64 {
        self.position_ms
    }

    fn length(&self) -> f64 {
        self.length_ms
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn has_completed(&self) -> bool {
        self.completed
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn update(&mut self, elapsed: Duration) {
        if !self.running {
            return;
        }

        self.position_ms += elapsed.as_secs_f64() * 1000.0;

        if self.position_ms >= self.length_ms {
            if self.looping && self.length_ms > 0.0 {
                self.position_ms %= self.length_ms;
            } else {
                self.position_ms = self.length_ms;
                self.running = false;
                self.completed = true;
            }
        }
    }
}

/// Identity of one track handle, unique per controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    /// Create a handle id
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a track handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Created and current, waiting for the swap tick
    Pending,

    /// Swap completed, the handle is the settled current track
    Attached,

    /// Resource released; transport calls do nothing
    Disposed,
}

/// End-of-media message sent by a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackCompleted {
    /// Handle that reached its end
    pub handle: HandleId,
}

/// Thread-safe end-of-media signal for one handle
///
/// Cloneable so an audio thread can hold it. Sends at most one message per
/// playthrough; a seek on the handle re-arms it.
#[derive(Debug, Clone)]
pub struct CompletionNotifier {
    handle: HandleId,
    fired: Arc<AtomicBool>,
    tx: Sender<TrackCompleted>,
}

impl CompletionNotifier {
    fn new(handle: HandleId, tx: Sender<TrackCompleted>) -> Self {
        Self {
            handle,
            fired: Arc::new(AtomicBool::new(false)),
            tx,
        }
    }

    /// Signal that the track reached its end
    ///
    /// Returns true if this call delivered the signal.
    pub fn notify(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }

        // Receiver gone means the controller is gone too
        self.tx
            .send(TrackCompleted {
                handle: self.handle,
            })
            .is_ok()
    }

    fn rearm(&self) {
        self.fired.store(false, Ordering::Release);
    }
}

/// Live, disposable wrapper around one playable track
///
/// The controller owns exactly one current handle; superseded handles are
/// kept alive until the next tick and then disposed.
pub struct TrackHandle {
    id: HandleId,
    set_id: Option<BeatmapSetId>,
    track: Box<dyn Track>,
    is_virtual: bool,
    state: HandleState,
    looping: bool,
    notifier: CompletionNotifier,
}

impl TrackHandle {
    /// Wrap a track loaded for a beatmap set
    pub fn new(
        id: HandleId,
        set_id: BeatmapSetId,
        track: Box<dyn Track>,
        completions: Sender<TrackCompleted>,
    ) -> Self {
        Self {
            id,
            set_id: Some(set_id),
            track,
            is_virtual: false,
            state: HandleState::Pending,
            looping: false,
            notifier: CompletionNotifier::new(id, completions),
        }
    }

    /// Create the placeholder handle used when nothing is selected
    pub fn new_virtual(id: HandleId, length_ms: f64, completions: Sender<TrackCompleted>) -> Self {
        Self {
            id,
            set_id: None,
            track: Box::new(VirtualTrack::new(length_ms)),
            is_virtual: true,
            state: HandleState::Pending,
            looping: false,
            notifier: CompletionNotifier::new(id, completions),
        }
    }

    /// Handle identity
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Beatmap set this handle currently plays for
    pub fn set_id(&self) -> Option<BeatmapSetId> {
        self.set_id
    }

    /// Check if this is the placeholder handle
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    /// Lifecycle state
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Check if the resource was released
    pub fn is_disposed(&self) -> bool {
        self.state == HandleState::Disposed
    }

    /// Get a notifier an audio thread can use to signal end-of-media
    pub fn completion_notifier(&self) -> CompletionNotifier {
        self.notifier.clone()
    }

    // ===== Transport =====

    /// Start or resume playback
    pub fn start(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.track.start();
    }

    /// Stop playback, keeping the position
    pub fn stop(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.track.stop();
    }

    /// Seek to a position in milliseconds
    pub fn seek(&mut self, position_ms: f64) -> bool {
        if self.is_disposed() {
            return false;
        }

        let in_range = self.track.seek(position_ms);
        if !self.track.has_completed() {
            self.notifier.rearm();
        }
        in_range
    }

    /// Seek to the start and play
    pub fn restart(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.seek(0.0);
        self.track.start();
    }

    /// Check if the track is playing
    pub fn is_running(&self) -> bool {
        !self.is_disposed() && self.track.is_running()
    }

    /// Check if playback stopped at the end of the media
    pub fn has_completed(&self) -> bool {
        !self.is_disposed() && self.track.has_completed()
    }

    /// Current position in milliseconds
    pub fn current_time(&self) -> f64 {
        self.track.current_time()
    }

    /// Track length in milliseconds
    pub fn length(&self) -> f64 {
        self.track.length()
    }

    /// Check if the audio data is available
    pub fn is_loaded(&self) -> bool {
        !self.is_disposed() && self.track.is_loaded()
    }

    /// Check if the track loops instead of completing
    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Set whether the track loops
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        if !self.is_disposed() {
            self.track.set_looping(looping);
        }
    }

    // ===== Lifecycle =====

    /// Advance the track and raise the completion signal on natural end
    pub fn update(&mut self, elapsed: Duration) {
        if self.is_disposed() {
            return;
        }

        self.track.update(elapsed);

        if self.track.has_completed() && self.notifier.notify() {
            trace!("Track handle {} reached end of media", self.id);
        }
    }

    /// Release the underlying resource
    ///
    /// Idempotent. Other handles are unaffected.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }

        self.track.stop();
        self.track.dispose();
        self.state = HandleState::Disposed;
        trace!("Disposed track handle {}", self.id);
    }

    pub(crate) fn attach(&mut self) {
        if self.state == HandleState::Pending {
            self.state = HandleState::Attached;
        }
    }

    /// Hand this still-valid track over to another set with the same audio
    pub(crate) fn rebind(&mut self, set_id: BeatmapSetId) {
        self.set_id = Some(set_id);
    }
}

impl Drop for TrackHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for TrackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackHandle")
            .field("id", &self.id)
            .field("set_id", &self.set_id)
            .field("is_virtual", &self.is_virtual)
            .field("state", &self.state)
            .field("looping", &self.looping)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{unbounded, Receiver};

    fn handle(length_ms: f64) -> (TrackHandle, Receiver<TrackCompleted>) {
        let (tx, rx) = unbounded();
        let handle = TrackHandle::new(
            HandleId::new(1),
            BeatmapSetId::new(10),
            Box::new(VirtualTrack::new(length_ms)),
            tx,
        );
        (handle, rx)
    }

    #[test]
    fn virtual_track_advances_only_while_running() {
        let mut track = VirtualTrack::new(10_000.0);
        track.update(Duration::from_secs(1));
        assert_eq!(track.current_time(), 0.0);

        track.start();
        track.update(Duration::from_millis(1500));
        assert_eq!(track.current_time(), 1500.0);
        assert!(track.is_running());
    }

    #[test]
    fn virtual_track_completes_at_length() {
        let mut track = VirtualTrack::new(1000.0);
        track.start();
        track.update(Duration::from_millis(1200));

        assert!(track.has_completed());
        assert!(!track.is_running());
        assert_eq!(track.current_time(), 1000.0);
    }

    #[test]
    fn looping_virtual_track_wraps() {
        let mut track = VirtualTrack::new(1000.0);
        track.set_looping(true);
        track.start();
        track.update(Duration::from_millis(1250));

        assert!(!track.has_completed());
        assert!(track.is_running());
        assert_eq!(track.current_time(), 250.0);
    }

    #[test]
    fn seek_is_clamped() {
        let mut track = VirtualTrack::new(1000.0);
        assert!(track.seek(500.0));
        assert!(!track.seek(5000.0));
        assert_eq!(track.current_time(), 1000.0);
        assert!(!track.seek(-3.0));
        assert_eq!(track.current_time(), 0.0);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let (mut handle, rx) = handle(1000.0);
        handle.start();
        handle.update(Duration::from_millis(1000));
        handle.update(Duration::from_millis(16));
        handle.update(Duration::from_millis(16));

        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![TrackCompleted {
                handle: HandleId::new(1)
            }]
        );
    }

    #[test]
    fn manual_stop_and_seek_do_not_complete() {
        let (mut handle, rx) = handle(1000.0);
        handle.start();
        handle.update(Duration::from_millis(400));
        handle.stop();
        handle.seek(900.0);
        handle.update(Duration::from_millis(400));

        assert!(rx.try_recv().is_err());
        assert_eq!(handle.current_time(), 900.0);
    }

    #[test]
    fn restart_rearms_completion() {
        let (mut handle, rx) = handle(500.0);
        handle.start();
        handle.update(Duration::from_millis(600));
        assert_eq!(rx.try_iter().count(), 1);

        handle.restart();
        assert!(handle.is_running());
        assert_eq!(handle.current_time(), 0.0);

        handle.update(Duration::from_millis(600));
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn external_notifier_shares_the_once_flag() {
        let (mut handle, rx) = handle(500.0);
        let notifier = handle.completion_notifier();

        let worker = std::thread::spawn(move || notifier.notify());
        assert!(worker.join().unwrap());

        handle.start();
        handle.update(Duration::from_millis(600));
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn disposed_handle_ignores_transport() {
        let (mut handle, rx) = handle(1000.0);
        handle.start();
        handle.dispose();

        assert!(handle.is_disposed());
        assert!(!handle.is_running());
        assert!(!handle.is_loaded());

        handle.start();
        handle.update(Duration::from_secs(5));
        assert!(!handle.is_running());
        assert!(rx.try_recv().is_err());

        // Idempotent
        handle.dispose();
        assert_eq!(handle.state(), HandleState::Disposed);
    }

    #[test]
    fn virtual_handle_has_no_set() {
        let (tx, _rx) = unbounded();
        let handle = TrackHandle::new_virtual(HandleId::new(0), 1000.0, tx);
        assert!(handle.is_virtual());
        assert_eq!(handle.set_id(), None);
        assert_eq!(handle.length(), 1000.0);
        assert_eq!(handle.state(), HandleState::Pending);
    }
}
