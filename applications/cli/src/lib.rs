//! Chant CLI Library
//!
//! Terminal front end for Chant Player: catalog listing, share links, resume
//! state and an interactive player on the default audio device.
//!
//! This library exposes the building blocks for testing purposes.

pub mod commands;
pub mod config;
pub mod error;
pub mod keys;
pub mod session;

pub use config::CliConfig;
pub use error::{CliError, Result};
pub use keys::{parse_key, Key};
