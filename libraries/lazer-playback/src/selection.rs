//! Shared "selected beatmap set" binding
//!
//! Both the controller and the presentation layer read and write the same
//! cell. Writers bump a version and notify subscribers over a channel, so a
//! write never calls back into the writer synchronously.

use crate::error::{PlaybackError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use lazer_core::{BeatmapSet, BeatmapSetId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Change notification for the selection binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChanged {
    /// Binding version after the write
    pub version: u64,
}

#[derive(Debug, Default)]
struct SelectionState {
    value: Option<Arc<BeatmapSet>>,
    version: u64,
    disabled: bool,
    subscribers: Vec<Sender<SelectionChanged>>,
}

/// Shared, observable cell holding the selected beatmap set
///
/// Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct SelectionBinding {
    inner: Arc<Mutex<SelectionState>>,
}

impl SelectionBinding {
    /// Create an empty binding
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a binding with an initial selection
    pub fn with_value(value: Arc<BeatmapSet>) -> Self {
        let binding = Self::new();
        binding.lock().value = Some(value);
        binding
    }

    /// Get the selected set
    pub fn value(&self) -> Option<Arc<BeatmapSet>> {
        self.lock().value.clone()
    }

    /// Get the id of the selected set
    pub fn value_id(&self) -> Option<BeatmapSetId> {
        self.lock().value.as_ref().map(|set| set.id)
    }

    /// Current version; bumped by every write
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Replace the selected set
    ///
    /// Returns the new version.
    ///
    /// # Errors
    /// Returns `PlaybackError::SelectionDisabled` while the binding is disabled
    pub fn set(&self, value: Option<Arc<BeatmapSet>>) -> Result<u64> {
        let mut state = self.lock();
        if state.disabled {
            return Err(PlaybackError::SelectionDisabled);
        }

        state.value = value;
        state.version += 1;

        let change = SelectionChanged {
            version: state.version,
        };
        state.subscribers.retain(|tx| tx.send(change).is_ok());

        Ok(state.version)
    }

    /// Check if the binding is read-only
    pub fn is_disabled(&self) -> bool {
        self.lock().disabled
    }

    /// Lock or unlock the binding
    pub fn set_disabled(&self, disabled: bool) {
        self.lock().disabled = disabled;
    }

    /// Subscribe to changes
    ///
    /// Dropped receivers are pruned on the next write.
    pub fn subscribe(&self) -> Receiver<SelectionChanged> {
        let (tx, rx) = unbounded();
        self.lock().subscribers.push(tx);
        rx
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        // No writer leaves the state half-updated
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazer_core::{AudioIdentity, BeatmapInfo};

    fn set(id: i64) -> Arc<BeatmapSet> {
        Arc::new(
            BeatmapSet::new(
                BeatmapSetId::new(id),
                format!("Song {}", id),
                "Artist",
                vec![BeatmapInfo::new(
                    "Normal",
                    AudioIdentity::new(format!("{}.ogg", id)),
                    1000.0,
                )],
            )
            .unwrap(),
        )
    }

    #[test]
    fn clones_share_the_cell() {
        let binding = SelectionBinding::new();
        let other = binding.clone();

        other.set(Some(set(4))).unwrap();
        assert_eq!(binding.value_id(), Some(BeatmapSetId::new(4)));
        assert_eq!(binding.version(), 1);
    }

    #[test]
    fn subscribers_receive_versions() {
        let binding = SelectionBinding::with_value(set(1));
        let rx = binding.subscribe();

        binding.set(Some(set(2))).unwrap();
        binding.set(None).unwrap();

        let versions: Vec<_> = rx.try_iter().map(|c| c.version).collect();
        assert_eq!(versions, vec![1, 2]);
        assert!(binding.value().is_none());
    }

    #[test]
    fn disabled_binding_rejects_writes() {
        let binding = SelectionBinding::with_value(set(1));
        binding.set_disabled(true);

        assert!(matches!(
            binding.set(Some(set(2))),
            Err(PlaybackError::SelectionDisabled)
        ));
        assert_eq!(binding.value_id(), Some(BeatmapSetId::new(1)));
        assert_eq!(binding.version(), 0);

        binding.set_disabled(false);
        assert!(binding.set(Some(set(2))).is_ok());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let binding = SelectionBinding::new();
        drop(binding.subscribe());
        let live = binding.subscribe();

        binding.set(Some(set(3))).unwrap();
        assert_eq!(binding.lock().subscribers.len(), 1);
        assert_eq!(live.try_recv().unwrap().version, 1);
    }
}
