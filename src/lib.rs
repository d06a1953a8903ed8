//! Multi-frame barcode aggregation.
//!
//! A recognizer reports the codes it sees in each camera frame. This crate
//! folds those per-frame reports into one deduplicated result list per scan
//! session, and maps detection geometry onto the display for overlays.

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod handoff;
pub mod overlay;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod source;
pub mod terminal;

pub use aggregator::{AbandonPolicy, Aggregator, FrameOutcome, QUIET_THRESHOLD, SessionMode};
pub use engine::ScanEngine;
pub use error::{ConfigError, SourceError};
pub use overlay::{OverlayRect, project, project_detection};
pub use schema::{Detection, Frame, ScanReport};
