//! Domain types for Lazer Player

mod beatmap;
mod ids;

pub use beatmap::{AudioIdentity, BeatmapInfo, BeatmapSet};
pub use ids::BeatmapSetId;
