use super::SCHEMA_VERSION;
use super::detection::Detection;
use crate::overlay::OverlayRect;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// The quiet period elapsed (or a single-shot scan found a code).
    Completed,
    /// The stream ended first; partial results were kept.
    Abandoned,
    /// The stream ended first and nothing was reported.
    Incomplete,
}

/// Projected boxes for one frame's live detections.
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, PartialEq)]
pub struct FrameOverlay {
    pub frame: u64,
    pub boxes: Vec<OverlayRect>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, PartialEq)]
pub struct ScanReport {
    pub version: String,
    pub status: SessionStatus,
    pub frames_processed: u64,
    pub failed_frames: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at_frame: Option<u64>,
    pub results: Vec<Detection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overlays: Vec<FrameOverlay>,
}

impl ScanReport {
    pub fn new(status: SessionStatus) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            status,
            frames_processed: 0,
            failed_frames: 0,
            completed_at_frame: None,
            results: Vec::new(),
            overlays: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}
