/// Player session
///
/// Owns the controller and turns each command into controller calls, one
/// scheduling tick, and printable output lines.
use crate::commands::Command;
use anyhow::{bail, Result};
use lazer_core::{BeatmapSetId, PlaylistSource};
use lazer_playback::{
    ControllerConfig, MusicController, PlaybackEvent, PreviousTrackResult, SelectionBinding,
    VirtualTrackFactory,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

pub struct Session {
    controller: MusicController,
}

impl Session {
    /// Create a session over a playlist source
    ///
    /// With `select`, that set is current from the start (stopped).
    pub fn new(
        config: ControllerConfig,
        source: &dyn PlaylistSource,
        select: Option<BeatmapSetId>,
    ) -> Result<Self> {
        let selection = match select {
            Some(id) => {
                let Some(set) = source.playable_sets()?.into_iter().find(|s| s.id == id) else {
                    bail!("Beatmap set {} is not in the manifest", id);
                };
                SelectionBinding::with_value(Arc::new(set))
            }
            None => SelectionBinding::new(),
        };

        let mut controller = MusicController::new(config, VirtualTrackFactory, selection);
        controller.load(source)?;
        controller.tick();

        Ok(Self { controller })
    }

    /// Get the controller
    pub fn controller(&self) -> &MusicController {
        &self.controller
    }

    /// Take the startup events
    pub fn drain_output(&mut self) -> Vec<String> {
        self.controller
            .drain_events()
            .iter()
            .map(describe_event)
            .collect()
    }

    /// Run one command, followed by one scheduling tick
    ///
    /// Returns the lines to print. `Quit` is the caller's concern and does
    /// nothing here.
    pub fn execute(&mut self, command: Command) -> Vec<String> {
        debug!("Executing {:?}", command);

        let mut output = Vec::new();
        let previous_outcome = Arc::new(Mutex::new(None));
        let mut elapsed = Duration::ZERO;

        match command {
            Command::Play => {
                self.controller.play(false);
            }
            Command::Restart => {
                self.controller.play(true);
            }
            Command::Pause => self.controller.pause(),
            Command::Toggle => {
                self.controller.toggle_play();
            }
            Command::Stop => {
                self.controller.stop();
            }
            Command::Next => self.controller.next_track(),
            Command::Prev => {
                let slot = previous_outcome.clone();
                self.controller.previous_track_then(move |result| {
                    if let Ok(mut outcome) = slot.lock() {
                        *outcome = Some(result);
                    }
                });
            }
            Command::Seek(position_ms) => self.controller.seek_to(position_ms),
            Command::Advance(ms) => elapsed = Duration::from_millis(ms),
            Command::Select(id) => {
                if !self.controller.select_set(id) {
                    output.push(format!("cannot select beatmap set {}", id));
                }
            }
            Command::Repeat(mode) => {
                self.controller.set_repeat(mode);
                output.push(format!("repeat {:?}", mode).to_lowercase());
            }
            Command::Status => output.push(self.status()),
            Command::List => output.extend(self.list()),
            Command::Quit => {}
        }

        self.controller.update(elapsed);

        if let Ok(mut outcome) = previous_outcome.lock() {
            if outcome.take() == Some(PreviousTrackResult::Restart) {
                output.push("restarted".to_string());
            }
        }

        output.extend(self.drain_output());
        output
    }

    /// One-line description of the playback state
    pub fn status(&self) -> String {
        let track = self.controller.current_track();
        let state = if self.controller.is_playing() {
            "playing"
        } else {
            "paused"
        };

        let current = match self.controller.current() {
            Some(set) => format!("{} {} - {}", set.id, set.artist, set.title),
            None => "nothing selected".to_string(),
        };

        format!(
            "{} {} [{:.0}/{:.0}ms] repeat={:?}",
            state,
            current,
            track.current_time(),
            track.length(),
            self.controller.repeat()
        )
    }

    /// Playlist lines, the current set marked with `>`
    pub fn list(&self) -> Vec<String> {
        let Ok(playlist) = self.controller.beatmap_sets() else {
            return Vec::new();
        };
        let current = self.controller.current_id();

        playlist
            .iter()
            .map(|set| {
                let marker = if Some(set.id) == current { '>' } else { ' ' };
                format!("{} {} {} - {}", marker, set.id, set.artist, set.title)
            })
            .collect()
    }
}

fn describe_event(event: &PlaybackEvent) -> String {
    match event {
        PlaybackEvent::TrackChanged {
            set: Some(set),
            direction,
        } => format!(
            "track changed ({:?}): {} {} - {}",
            direction, set.id, set.artist, set.title
        ),
        PlaybackEvent::TrackChanged { set: None, .. } => {
            "track changed: nothing selected".to_string()
        }
        PlaybackEvent::StateChanged { running: true } => "playing".to_string(),
        PlaybackEvent::StateChanged { running: false } => "paused".to_string(),
        PlaybackEvent::TrackCompleted { set_id } => format!("track completed: {}", set_id),
        PlaybackEvent::PlaylistEnded => "playlist ended".to_string(),
    }
}
