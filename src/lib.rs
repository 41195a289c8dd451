//! TrimX Studio Library
//!
//! Client-side core of the TrimX web trimming workspace: upload a video to
//! the trimming service, mark in/out segments with the mouse or the keyboard,
//! send them for processing and download the concatenated result.
//!
//! The session logic lives in [`app::SessionInteractor`]; the player, the
//! backend and the download target are ports so the same core runs behind a
//! browser shell or the bundled `studio` command line.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod keyboard;
pub mod playback;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{SessionEvent, SessionInteractor};
pub use domain::errors::DomainError;
pub use domain::model::{OutputDescriptor, Phase, Segment, SegmentBounds, VideoDescriptor};
pub use domain::segments::SegmentStore;
pub use error::{StudioError, StudioResult};
