//! Lazer Player Core
//!
//! Domain types and collaborator traits shared by every Lazer Player crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `BeatmapSet`, `BeatmapInfo`, `BeatmapSetId`, `AudioIdentity`
//! - **Core Traits**: `PlaylistSource` (where the playable sets come from)
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use lazer_core::{AudioIdentity, BeatmapInfo, BeatmapSet, BeatmapSetId};
//!
//! let set = BeatmapSet::new(
//!     BeatmapSetId::new(1),
//!     "Blue Zenith",
//!     "xi",
//!     vec![BeatmapInfo::new("Insane", AudioIdentity::new("blue-zenith.mp3"), 312_000.0)],
//! )
//! .unwrap();
//!
//! assert_eq!(set.first_beatmap().version, "Insane");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod library;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use library::InMemoryLibrary;
pub use traits::PlaylistSource;
pub use types::{AudioIdentity, BeatmapInfo, BeatmapSet, BeatmapSetId};
