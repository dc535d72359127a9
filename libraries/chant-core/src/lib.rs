//! Chant Player Core
//!
//! Platform-agnostic domain types and helpers shared by every Chant Player crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`
//! - **Locators**: parsing storage locators (`s3://bucket/key`) into a
//!   container/key pair
//! - **Catalog helpers**: search filtering over the fetched track list
//! - **Share links**: building and parsing `?song=<id>&t=<secs>` links
//! - **Resume state**: persisting the last listened position
//! - **Error Handling**: Unified `ChantError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use chant_core::{Locator, Track};
//!
//! let track = Track::new("1", "Kyrie", "Schola", "s3://chants/kyrie.mp3");
//! let locator = Locator::parse(&track.locator).unwrap();
//!
//! assert_eq!(locator.container(), "chants");
//! assert_eq!(locator.key(), "kyrie.mp3");
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod locator;
pub mod resume;
pub mod share;
pub mod types;

// Re-export commonly used types
pub use error::{ChantError, Result};
pub use locator::{Locator, LocatorError, LocatorResolver, DEFAULT_SCHEME};
pub use resume::{ResumeState, ResumeStore};
pub use share::{parse_song_link, song_link, SongLink};
pub use types::{Track, TrackId};
