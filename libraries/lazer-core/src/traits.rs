/// Collaborator traits for Lazer Player
use crate::error::Result;
use crate::types::BeatmapSet;

/// Supplier of the playable beatmap sets
///
/// Queried once when the music controller loads. Implementations may read
/// a database, a manifest file, or a fixed list; order does not matter
/// because the controller sorts the sets by title itself.
pub trait PlaylistSource {
    /// Get every playable beatmap set
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read
    fn playable_sets(&self) -> Result<Vec<BeatmapSet>>;
}
